//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod json_file;
pub mod memory;
pub mod ollama;

// Re-exports
pub use json_file::{JsonPersonaRepository, JsonTranscriptRepository};
pub use memory::{InMemoryPersonaRepository, InMemoryTranscriptRepository};
pub use ollama::OllamaClient;
