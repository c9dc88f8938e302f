//! Error types for the Folio domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each external seam has
//! its own enum; nothing here is fatal to a chat request, the orchestrator
//! absorbs all of them.

use thiserror::Error;

/// Failure reading profile records for one category.
///
/// Non-fatal: the retriever logs it and omits that category's block.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Corrupt record in {table}: {reason}")]
    CorruptRecord { table: String, reason: String },
}

/// Failure talking to the model inference endpoint.
///
/// Every variant triggers the fallback responder.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Inference endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("Inference timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Inference endpoint returned {status_code}: {message}")]
    BadResponse { status_code: u16, message: String },

    #[error("Inference client not configured: {0}")]
    NotConfigured(String),
}

impl InferenceError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::BadResponse { .. } => "bad_response",
            Self::NotConfigured(_) => "not_configured",
        }
    }
}
