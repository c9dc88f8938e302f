//! `folio seed`: create the SQLite profile database and load records.

use folio_store::{ProfileData, SqliteStore, demo_profile};
use std::path::Path;
use tracing::info;

pub async fn run(path: Option<&Path>, from: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path)?;

    let data = match from {
        Some(file) => load_profile(file)?,
        None => demo_profile(),
    };

    let db_path = config.store.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::new(&db_path.to_string_lossy()).await?;
    store.seed(&data).await?;
    let source = from.map_or_else(|| "demo".to_string(), |f| f.display().to_string());
    info!(path = %db_path.display(), %source, "Profile data seeded");

    println!("Seeded {}", db_path.display());
    println!("  Skills:       {}", data.skills.len());
    println!("  Experiences:  {}", data.experiences.len());
    println!("  Projects:     {}", data.projects.len());
    println!("  About:        {}", if data.about.is_some() { "yes" } else { "no" });
    println!("  Contact:      {}", if data.contact.is_some() { "yes" } else { "no" });
    if config.store.backend != "sqlite" {
        println!("\n  Note: store.backend is \"{}\"; set it to \"sqlite\" to serve this data.", config.store.backend);
    }

    Ok(())
}

/// Read profile records from a JSON file.
pub fn load_profile(file: &Path) -> Result<ProfileData, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let data = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid profile JSON in {}: {e}", file.display()))?;
    Ok(data)
}
