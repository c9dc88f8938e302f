//! Profile data stores for Folio.

pub mod in_memory;
pub mod seed;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use seed::{ProfileData, demo_profile};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use folio_config::StoreConfig;
use folio_core::error::StoreError;
use folio_core::store::DataStore;
use std::sync::Arc;

/// Build the store selected by `[store]` configuration.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn DataStore>, StoreError> {
    match config.backend.as_str() {
        "memory" => {
            tracing::info!("Using built-in demo profile (memory store)");
            Ok(Arc::new(InMemoryStore::demo()))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.database_path();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Storage(format!("{}: {e}", parent.display())))?;
            }
            let store = SqliteStore::new(&path.to_string_lossy()).await?;
            Ok(Arc::new(store))
        }
        other => Err(StoreError::Storage(format!("Unknown store backend: {other}"))),
    }
}
