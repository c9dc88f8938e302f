//! DataStore trait: read-only access to profile records.
//!
//! Every method returns only `active` records, already sorted:
//! display order ascending with primary key as tiebreak, except experience,
//! which is most-recent first.
//!
//! Implementations: SQLite, in-memory (demo data and tests).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::profile::{AboutContent, ContactInfo, Experience, Project, Skill};

#[async_trait]
pub trait DataStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "memory").
    fn name(&self) -> &str;

    /// Active skills in display order, at most `limit`.
    async fn skills(&self, limit: usize) -> std::result::Result<Vec<Skill>, StoreError>;

    /// All active experience, current roles first, then by start date descending.
    async fn experiences(&self) -> std::result::Result<Vec<Experience>, StoreError>;

    /// Active projects in display order, at most `limit`.
    async fn projects(
        &self,
        limit: usize,
        featured_only: bool,
    ) -> std::result::Result<Vec<Project>, StoreError>;

    async fn about(&self) -> std::result::Result<Option<AboutContent>, StoreError>;

    async fn contact(&self) -> std::result::Result<Option<ContactInfo>, StoreError>;
}
