//! Model inference clients for Folio.
//!
//! All clients implement the `folio_core::InferenceClient` trait.
//! `build_from_config` picks the backend and wraps it in the metering layer.

pub mod metered;
pub mod ollama;
pub mod openai_compat;
pub mod router;

pub use metered::MeteredClient;
pub use ollama::OllamaClient;
pub use openai_compat::OpenAiCompatClient;
pub use router::{build_client, build_from_config};
