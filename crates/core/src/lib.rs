//! # Folio Core
//!
//! Domain types, traits, and error definitions for the Folio profile chat
//! backend. This crate has **zero framework dependencies**: it defines the
//! model that the store, provider, agent, and gateway crates implement against.
//!
//! ## Seams
//!
//! The two external collaborators are traits defined here:
//! - [`DataStore`]: read-only access to the profile records
//! - [`InferenceClient`]: a single-shot text generation endpoint
//!
//! The orchestrator only ever holds `Arc<dyn ...>` of these, so tests can
//! swap in doubles and the binary can pick implementations from config.

pub mod chat;
pub mod error;
pub mod inference;
pub mod profile;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use chat::{Category, ChatQuery, ChatResponse, FALLBACK_MODEL};
pub use error::{InferenceError, StoreError};
pub use inference::{GenerationOptions, InferenceClient, InferenceRequest, InferenceResponse};
pub use profile::{AboutContent, ContactInfo, Experience, ProfileLink, Project, Skill};
pub use store::DataStore;
