//! Transcript Repository Port
//!
//! Abstract interface for per-persona message history persistence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Message, PersonaId};

/// Transcripts keyed by owning persona
pub type TranscriptMap = HashMap<PersonaId, Vec<Message>>;

/// Repository interface for the transcript map
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Load the stored map. Absent record yields an empty map.
    async fn load_all(&self) -> Result<TranscriptMap, DomainError>;

    /// Replace the stored map
    async fn save_all(&self, transcripts: &TranscriptMap) -> Result<(), DomainError>;
}
