//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories and the inference endpoint.

mod persona_registry;
mod session_controller;
mod transcript_log;

pub use persona_registry::PersonaRegistry;
pub use session_controller::{SessionController, SessionState, FALLBACK_REPLY};
pub use transcript_log::TranscriptLog;
