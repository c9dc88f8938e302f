//! Prompt assembly: context blocks plus the question, within a size budget.

pub mod assembler;
pub mod token;

pub use assembler::{AssembledPrompt, AssemblyMetadata, DropInfo, PromptAssembler, SectionStats};
