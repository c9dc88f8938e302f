//! The chat pipeline behind Folio.
//!
//! Every question goes through the same fixed sequence:
//!
//! 1. **Classify** the question into one or more profile categories
//! 2. **Retrieve** the matching records from the store, concurrently
//! 3. **Assemble** a prompt that fits the character budget
//! 4. **Generate** with the model backend, unless the health monitor says
//!    it is degraded
//! 5. **Fall back** to a canned answer for the top category when step 4 is
//!    skipped or fails
//!
//! The pipeline never returns an error to the caller; step 5 is the floor.

pub mod classifier;
pub mod context;
pub mod fallback;
pub mod health;
pub mod orchestrator;
pub mod retriever;

pub use classifier::classify;
pub use context::{AssembledPrompt, AssemblyMetadata, DropInfo, PromptAssembler, SectionStats};
pub use fallback::{Fallback, FallbackResponder};
pub use health::{HealthMonitor, HealthSnapshot, HealthStatus};
pub use orchestrator::ChatOrchestrator;
pub use retriever::{ContextBlock, ContextRetriever};
