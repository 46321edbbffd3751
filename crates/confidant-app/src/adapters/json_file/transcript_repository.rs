//! JSON file implementation of TranscriptRepository

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use confidant::{DomainError, Message, PersonaId, TranscriptMap, TranscriptRepository};

use super::{decode_entry, read_json, write_json_atomic, CONVERSATIONS_FILE};

/// Transcript map stored as a JSON object keyed by persona id
#[derive(Debug, Clone)]
pub struct JsonTranscriptRepository {
    path: PathBuf,
}

impl JsonTranscriptRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository at `<dir>/conversations.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONVERSATIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TranscriptRepository for JsonTranscriptRepository {
    async fn load_all(&self) -> Result<TranscriptMap, DomainError> {
        let stored: HashMap<String, Vec<serde_json::Value>> =
            read_json(&self.path).await?.unwrap_or_default();

        let mut transcripts = TranscriptMap::with_capacity(stored.len());
        for (key, values) in stored {
            let persona_id = match key.parse::<PersonaId>() {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping transcript with invalid persona id {:?}: {}", key, e);
                    continue;
                }
            };
            let messages: Vec<Message> = values
                .into_iter()
                .filter_map(|value| decode_entry(value, "message"))
                .collect();
            transcripts.insert(persona_id, messages);
        }

        tracing::debug!(
            "Loaded transcripts for {} personas from {}",
            transcripts.len(),
            self.path.display()
        );
        Ok(transcripts)
    }

    async fn save_all(&self, transcripts: &TranscriptMap) -> Result<(), DomainError> {
        write_json_atomic(&self.path, transcripts).await
    }
}
