//! In-memory store: the demo profile and tests.

use async_trait::async_trait;
use folio_core::error::StoreError;
use folio_core::profile::{AboutContent, ContactInfo, Experience, Project, Skill};
use folio_core::store::DataStore;
use std::cmp::Ordering;

use crate::seed::{ProfileData, demo_profile};

/// A read-only store over a [`ProfileData`] snapshot.
///
/// Applies the same filtering and ordering rules as the SQLite store.
pub struct InMemoryStore {
    data: ProfileData,
}

impl InMemoryStore {
    pub fn new(data: ProfileData) -> Self {
        Self { data }
    }

    /// A store pre-loaded with [`demo_profile`].
    pub fn demo() -> Self {
        Self::new(demo_profile())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(ProfileData::default())
    }
}

/// Current roles first, then newest start date, then display order, then id.
pub(crate) fn by_recency(a: &Experience, b: &Experience) -> Ordering {
    b.current
        .cmp(&a.current)
        .then_with(|| b.start_date.cmp(&a.start_date))
        .then_with(|| a.display_order.cmp(&b.display_order))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl DataStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn skills(&self, limit: usize) -> Result<Vec<Skill>, StoreError> {
        let mut skills: Vec<Skill> = self.data.skills.iter().filter(|s| s.active).cloned().collect();
        skills.sort_by_key(|s| (s.display_order, s.id));
        skills.truncate(limit);
        Ok(skills)
    }

    async fn experiences(&self) -> Result<Vec<Experience>, StoreError> {
        let mut experiences: Vec<Experience> = self
            .data
            .experiences
            .iter()
            .filter(|e| e.active)
            .cloned()
            .collect();
        experiences.sort_by(by_recency);
        Ok(experiences)
    }

    async fn projects(&self, limit: usize, featured_only: bool) -> Result<Vec<Project>, StoreError> {
        let mut projects: Vec<Project> = self
            .data
            .projects
            .iter()
            .filter(|p| p.active && (!featured_only || p.featured))
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.display_order, p.id));
        projects.truncate(limit);
        Ok(projects)
    }

    async fn about(&self) -> Result<Option<AboutContent>, StoreError> {
        Ok(self.data.about.clone())
    }

    async fn contact(&self) -> Result<Option<ContactInfo>, StoreError> {
        Ok(self.data.contact.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn skills_exclude_inactive_and_respect_limit() {
        let store = InMemoryStore::demo();
        let all = store.skills(100).await.unwrap();
        assert!(all.iter().all(|s| s.active));
        assert!(!all.iter().any(|s| s.name == "Jenkins"));

        let top = store.skills(3).await.unwrap();
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Kubernetes", "Terraform", "Prometheus"]);
    }

    #[tokio::test]
    async fn experiences_are_recency_sorted() {
        let store = InMemoryStore::demo();
        let exps = store.experiences().await.unwrap();
        assert_eq!(exps.len(), 3);
        assert!(exps[0].current);
        assert!(exps[1].start_date > exps[2].start_date);
    }

    #[tokio::test]
    async fn current_role_beats_newer_past_role() {
        let mut data = demo_profile();
        // A past role that started after the current one still sorts second.
        data.experiences[1].start_date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let exps = InMemoryStore::new(data).experiences().await.unwrap();
        assert_eq!(exps[0].company, "Northwind Cloud");
        assert_eq!(exps[1].company, "Contoso Logistics");
    }

    #[tokio::test]
    async fn display_order_ties_break_on_id() {
        let mut data = demo_profile();
        for s in &mut data.skills {
            s.display_order = 0;
        }
        let ids: Vec<i64> = InMemoryStore::new(data)
            .skills(4)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn featured_filter() {
        let store = InMemoryStore::demo();
        let featured = store.projects(10, true).await.unwrap();
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|p| p.featured && p.active));

        let all = store.projects(10, false).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().any(|p| p.title == "Chaos Experiments"));
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = InMemoryStore::default();
        assert!(store.skills(10).await.unwrap().is_empty());
        assert!(store.about().await.unwrap().is_none());
        assert!(store.contact().await.unwrap().is_none());
    }

    #[test]
    fn backend_name() {
        assert_eq!(InMemoryStore::demo().name(), "memory");
    }
}
