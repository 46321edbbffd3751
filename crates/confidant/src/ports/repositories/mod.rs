//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod persona_repository;
mod transcript_repository;

pub use persona_repository::*;
pub use transcript_repository::*;
