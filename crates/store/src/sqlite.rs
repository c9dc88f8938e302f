//! SQLite profile store.
//!
//! Five tables (`skills`, `experiences`, `projects`, `about_content`,
//! `contact_info`) created by the embedded migration in
//! `migrations/001_profile.sql`. Set-valued fields (technologies, links) live
//! in JSON text columns; dates are ISO-8601 text so they sort lexically.

use async_trait::async_trait;
use chrono::NaiveDate;
use folio_core::error::StoreError;
use folio_core::profile::{AboutContent, ContactInfo, Experience, Project, Skill};
use folio_core::store::DataStore;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use crate::seed::ProfileData;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A SQLite-backed [`DataStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // An in-memory database lives only as long as its connection.
        let pool_options = if path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        info!(path, "SQLite profile store initialized");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run the schema migration. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let migration_sql = include_str!("../migrations/001_profile.sql");

        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("Migration failed: {e}")))?;

        debug!("Profile schema migration complete");
        Ok(())
    }

    /// Replace every profile record with `data`, atomically.
    ///
    /// This is a maintenance operation (`folio seed`); the chat path never
    /// writes.
    pub async fn seed(&self, data: &ProfileData) -> Result<(), StoreError> {
        let write_err = |e: sqlx::Error| StoreError::Storage(format!("Seed failed: {e}"));
        let mut tx = self.pool.begin().await.map_err(write_err)?;

        for table in ["skills", "experiences", "projects", "about_content", "contact_info"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
        }

        for s in &data.skills {
            sqlx::query(
                "INSERT INTO skills (id, name, category, proficiency, display_order, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(s.id)
            .bind(&s.name)
            .bind(&s.category)
            .bind(i64::from(s.proficiency))
            .bind(i64::from(s.display_order))
            .bind(s.active)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        for e in &data.experiences {
            sqlx::query(
                "INSERT INTO experiences
                 (id, title, company, start_date, end_date, current, description,
                  technologies, display_order, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(e.id)
            .bind(&e.title)
            .bind(&e.company)
            .bind(e.start_date.format(DATE_FORMAT).to_string())
            .bind(e.end_date.map(|d| d.format(DATE_FORMAT).to_string()))
            .bind(e.current)
            .bind(&e.description)
            .bind(to_json(&e.technologies)?)
            .bind(i64::from(e.display_order))
            .bind(e.active)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        for p in &data.projects {
            sqlx::query(
                "INSERT INTO projects
                 (id, title, description, project_type, links, technologies,
                  featured, active, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(p.id)
            .bind(&p.title)
            .bind(&p.description)
            .bind(&p.project_type)
            .bind(to_json(&p.links)?)
            .bind(to_json(&p.technologies)?)
            .bind(p.featured)
            .bind(p.active)
            .bind(i64::from(p.display_order))
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        if let Some(about) = &data.about {
            sqlx::query("INSERT INTO about_content (headline, description) VALUES (?1, ?2)")
                .bind(&about.headline)
                .bind(&about.description)
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
        }

        if let Some(contact) = &data.contact {
            sqlx::query(
                "INSERT INTO contact_info (email, location, links, availability)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&contact.email)
            .bind(&contact.location)
            .bind(to_json(&contact.links)?)
            .bind(&contact.availability)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        }

        tx.commit().await.map_err(write_err)?;
        info!(
            skills = data.skills.len(),
            experiences = data.experiences.len(),
            projects = data.projects.len(),
            "Profile seeded"
        );
        Ok(())
    }

    fn row_to_skill(row: &SqliteRow) -> Result<Skill, StoreError> {
        let proficiency: i64 = column(row, "proficiency")?;
        Ok(Skill {
            id: column(row, "id")?,
            name: column(row, "name")?,
            category: column(row, "category")?,
            proficiency: u8::try_from(proficiency)
                .map_err(|_| corrupt("skills", format!("proficiency {proficiency}")))?,
            display_order: column(row, "display_order")?,
            active: column(row, "active")?,
        })
    }

    fn row_to_experience(row: &SqliteRow) -> Result<Experience, StoreError> {
        let start: String = column(row, "start_date")?;
        let end: Option<String> = column(row, "end_date")?;
        let technologies: String = column(row, "technologies")?;
        Ok(Experience {
            id: column(row, "id")?,
            title: column(row, "title")?,
            company: column(row, "company")?,
            start_date: parse_date("experiences", &start)?,
            end_date: end.as_deref().map(|d| parse_date("experiences", d)).transpose()?,
            current: column(row, "current")?,
            description: column(row, "description")?,
            technologies: from_json("experiences", &technologies)?,
            display_order: column(row, "display_order")?,
            active: column(row, "active")?,
        })
    }

    fn row_to_project(row: &SqliteRow) -> Result<Project, StoreError> {
        let links: String = column(row, "links")?;
        let technologies: String = column(row, "technologies")?;
        Ok(Project {
            id: column(row, "id")?,
            title: column(row, "title")?,
            description: column(row, "description")?,
            project_type: column(row, "project_type")?,
            links: from_json("projects", &links)?,
            technologies: from_json("projects", &technologies)?,
            featured: column(row, "featured")?,
            active: column(row, "active")?,
            display_order: column(row, "display_order")?,
        })
    }
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
}

fn corrupt(table: &str, reason: String) -> StoreError {
    StoreError::CorruptRecord {
        table: table.into(),
        reason,
    }
}

fn parse_date(table: &str, raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| corrupt(table, format!("date {raw:?}: {e}")))
}

fn from_json<T: DeserializeOwned>(table: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| corrupt(table, format!("JSON column: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Storage(format!("JSON encode: {e}")))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl DataStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn skills(&self, limit: usize) -> Result<Vec<Skill>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM skills WHERE active = 1 ORDER BY display_order, id LIMIT ?1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("skills: {e}")))?;

        rows.iter().map(Self::row_to_skill).collect()
    }

    async fn experiences(&self) -> Result<Vec<Experience>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM experiences WHERE active = 1
             ORDER BY current DESC, start_date DESC, display_order, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("experiences: {e}")))?;

        rows.iter().map(Self::row_to_experience).collect()
    }

    async fn projects(&self, limit: usize, featured_only: bool) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM projects
             WHERE active = 1 AND (?1 = 0 OR featured = 1)
             ORDER BY display_order, id LIMIT ?2",
        )
        .bind(featured_only)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("projects: {e}")))?;

        rows.iter().map(Self::row_to_project).collect()
    }

    async fn about(&self) -> Result<Option<AboutContent>, StoreError> {
        let row = sqlx::query(
            "SELECT headline, description FROM about_content
             WHERE active = 1 ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("about_content: {e}")))?;

        row.map(|r| {
            Ok(AboutContent {
                headline: column(&r, "headline")?,
                description: column(&r, "description")?,
            })
        })
        .transpose()
    }

    async fn contact(&self) -> Result<Option<ContactInfo>, StoreError> {
        let row = sqlx::query(
            "SELECT email, location, links, availability FROM contact_info
             WHERE active = 1 ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("contact_info: {e}")))?;

        row.map(|r| {
            let links: String = column(&r, "links")?;
            Ok(ContactInfo {
                email: column(&r, "email")?,
                location: column(&r, "location")?,
                links: from_json("contact_info", &links)?,
                availability: column(&r, "availability")?,
            })
        })
        .transpose()
    }
}
