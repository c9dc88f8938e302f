//! Context retrieval: one rendered text block per classified category.

use folio_config::RetrievalConfig;
use folio_core::error::StoreError;
use folio_core::profile::{AboutContent, ContactInfo, Experience, ProfileLink, Project, Skill};
use folio_core::{Category, DataStore};
use futures::future::join_all;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rendered facts for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBlock {
    pub category: Category,
    /// One line per record (about/contact may span a few lines).
    pub text: String,
    /// Records rendered into `text`.
    pub items: usize,
}

/// Queries the store for each requested category, concurrently.
pub struct ContextRetriever {
    store: Arc<dyn DataStore>,
    limits: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(store: Arc<dyn DataStore>, limits: RetrievalConfig) -> Self {
        Self { store, limits }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Blocks for every category that yielded data, in category priority
    /// order. A failing category is logged and left out; it never fails the
    /// whole retrieval.
    pub async fn retrieve(&self, categories: &BTreeSet<Category>) -> Vec<ContextBlock> {
        let results = join_all(categories.iter().map(|&c| async move { (c, self.fetch(c).await) })).await;

        results
            .into_iter()
            .filter_map(|(category, result)| match result {
                Ok(lines) if lines.is_empty() => {
                    debug!(%category, "No active records, block omitted");
                    None
                }
                Ok(lines) => Some(ContextBlock {
                    category,
                    items: lines.len(),
                    text: lines.join("\n"),
                }),
                Err(e) => {
                    warn!(%category, error = %e, "Retrieval failed, block omitted");
                    None
                }
            })
            .collect()
    }

    async fn fetch(&self, category: Category) -> Result<Vec<String>, StoreError> {
        let lines: Vec<String> = match category {
            Category::Skills => self
                .store
                .skills(self.limits.skills_limit)
                .await?
                .iter()
                .map(render_skill)
                .collect(),
            Category::Experience => self
                .store
                .experiences()
                .await?
                .iter()
                .map(render_experience)
                .collect(),
            Category::Projects => self
                .store
                .projects(self.limits.projects_limit, self.limits.featured_projects_only)
                .await?
                .iter()
                .map(render_project)
                .collect(),
            Category::About => self.store.about().await?.map(render_about).into_iter().collect(),
            Category::Contact => self
                .store
                .contact()
                .await?
                .map(render_contact)
                .into_iter()
                .collect(),
        };
        Ok(lines)
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn join_links(links: &[ProfileLink]) -> String {
    links
        .iter()
        .map(|l| format!("{} {}", l.label, l.url))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_skill(skill: &Skill) -> String {
    format!(
        "- {} ({}), proficiency {}/5",
        skill.name, skill.category, skill.proficiency
    )
}

pub fn render_experience(exp: &Experience) -> String {
    let mut line = format!("- {} at {} ({})", exp.title, exp.company, exp.period());
    if !exp.description.is_empty() {
        line.push_str(": ");
        line.push_str(&exp.description);
    }
    if !exp.technologies.is_empty() {
        line.push_str(" Technologies: ");
        line.push_str(&join_set(&exp.technologies));
        line.push('.');
    }
    line
}

pub fn render_project(project: &Project) -> String {
    let mut line = format!("- {}", project.title);
    if !project.project_type.is_empty() {
        line.push_str(&format!(" [{}]", project.project_type));
    }
    if !project.description.is_empty() {
        line.push_str(": ");
        line.push_str(&project.description);
    }
    if !project.technologies.is_empty() {
        line.push_str(" Technologies: ");
        line.push_str(&join_set(&project.technologies));
        line.push('.');
    }
    if !project.links.is_empty() {
        line.push_str(" Links: ");
        line.push_str(&join_links(&project.links));
    }
    line
}

pub fn render_about(about: AboutContent) -> String {
    match about.headline {
        Some(headline) if !headline.trim().is_empty() => format!("{headline}\n{}", about.description),
        _ => about.description,
    }
}

pub fn render_contact(contact: ContactInfo) -> String {
    let mut lines = vec![format!("Email: {}", contact.email)];
    if !contact.location.is_empty() {
        lines.push(format!("Location: {}", contact.location));
    }
    if !contact.availability.is_empty() {
        lines.push(format!("Availability: {}", contact.availability));
    }
    // One line per label
    let mut seen = HashSet::new();
    for link in contact.links.iter().filter(|l| seen.insert(l.label.as_str())) {
        lines.push(format!("{}: {}", link.label, link.url));
    }
    lines.join("\n")
}
