//! JSON file repositories
//!
//! Each collection lives in its own JSON document inside a data directory.
//! Writes go to a sibling `*.json.tmp` file which is then renamed over the
//! target, so a crash never leaves a half-written document behind.
//!
//! Loads decode entry by entry and skip what they cannot read. A document that
//! is not valid JSON at all is moved aside to `*.json.corrupt`.

mod persona_repository;
mod transcript_repository;

pub use persona_repository::JsonPersonaRepository;
pub use transcript_repository::JsonTranscriptRepository;

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use confidant::DomainError;

/// File name of the persona collection
pub const PERSONAS_FILE: &str = "personas.json";
/// File name of the transcript map
pub const CONVERSATIONS_FILE: &str = "conversations.json";

/// Read and decode a JSON document. `None` when the file does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DomainError::persistence(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            quarantine(path).await;
            Err(DomainError::persistence(format!(
                "failed to decode {}: {e}",
                path.display()
            )))
        }
    }
}

/// Move an undecodable document to `*.json.corrupt` so the next save does
/// not overwrite it.
async fn quarantine(path: &Path) {
    let corrupt_path = path.with_extension("json.corrupt");
    match tokio::fs::rename(path, &corrupt_path).await {
        Ok(()) => tracing::warn!(
            "Moved undecodable {} to {}",
            path.display(),
            corrupt_path.display()
        ),
        Err(e) => tracing::warn!("Failed to move aside {}: {}", path.display(), e),
    }
}

/// Decode one stored entry, logging and skipping it on failure
fn decode_entry<T: DeserializeOwned>(value: serde_json::Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("Skipping undecodable stored {}: {}", what, e);
            None
        }
    }
}

/// Encode and atomically write a JSON document (tmp file + rename)
async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DomainError> {
    let io_err = |e: std::io::Error| {
        DomainError::persistence(format!("failed to write {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let content = serde_json::to_vec_pretty(value).map_err(|e| {
        DomainError::persistence(format!("failed to encode {}: {e}", path.display()))
    })?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &content).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;
    Ok(())
}
