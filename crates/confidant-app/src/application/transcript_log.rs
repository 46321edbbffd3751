//! Transcript Log
//!
//! In-memory mirror of per-persona message histories. Every mutation rewrites
//! the whole map through the TranscriptRepository; write failures are logged
//! and the in-memory copy stays authoritative.

use std::sync::Arc;

use tokio::sync::Mutex;

use confidant::{Message, PersonaId, TranscriptMap, TranscriptRepository};

/// Application service for transcript operations
pub struct TranscriptLog {
    repo: Arc<dyn TranscriptRepository>,
    transcripts: Mutex<TranscriptMap>,
}

impl TranscriptLog {
    /// Load the stored map, falling back to empty if it cannot be read
    pub async fn load(repo: Arc<dyn TranscriptRepository>) -> Self {
        let transcripts = match repo.load_all().await {
            Ok(transcripts) => transcripts,
            Err(e) => {
                tracing::warn!("Starting with empty transcripts: {}", e);
                TranscriptMap::new()
            }
        };

        Self {
            repo,
            transcripts: Mutex::new(transcripts),
        }
    }

    /// Add a message to the end of a persona's transcript
    pub async fn append(&self, persona_id: PersonaId, message: Message) {
        let mut transcripts = self.transcripts.lock().await;
        transcripts.entry(persona_id).or_default().push(message);
        self.persist(&transcripts).await;
    }

    /// Messages for a persona in chronological order
    pub async fn read(&self, persona_id: PersonaId) -> Vec<Message> {
        self.transcripts
            .lock()
            .await
            .get(&persona_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Empty a persona's transcript. Ids without an entry are left absent.
    pub async fn clear(&self, persona_id: PersonaId) {
        let mut transcripts = self.transcripts.lock().await;
        let Some(messages) = transcripts.get_mut(&persona_id) else {
            return;
        };
        messages.clear();
        self.persist(&transcripts).await;
        tracing::info!("Cleared transcript for persona {}", persona_id);
    }

    /// Remove a persona's transcript entirely
    pub async fn delete_all(&self, persona_id: PersonaId) {
        let mut transcripts = self.transcripts.lock().await;
        if transcripts.remove(&persona_id).is_some() {
            self.persist(&transcripts).await;
        }
    }

    /// Number of personas with a transcript entry
    pub async fn len(&self) -> usize {
        self.transcripts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transcripts.lock().await.is_empty()
    }

    async fn persist(&self, transcripts: &TranscriptMap) {
        if let Err(e) = self.repo.save_all(transcripts).await {
            tracing::warn!("Failed to persist transcripts: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTranscriptRepository;
    use confidant::MessageRole;
    use uuid::Uuid;

    async fn log_with_repo() -> (TranscriptLog, Arc<InMemoryTranscriptRepository>) {
        let repo = Arc::new(InMemoryTranscriptRepository::new());
        let log = TranscriptLog::load(repo.clone()).await;
        (log, repo)
    }

    #[tokio::test]
    async fn test_read_unknown_is_empty() {
        let (log, _) = log_with_repo().await;
        assert!(log.read(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn test_append_keeps_order_and_persists() {
        let (log, repo) = log_with_repo().await;
        let id = Uuid::new_v4();

        log.append(id, Message::user("one")).await;
        log.append(id, Message::assistant("two")).await;
        log.append(id, Message::user("three")).await;

        let contents: Vec<String> = log.read(id).await.into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(repo.snapshot()[&id].len(), 3);
        assert_eq!(repo.save_count(), 3);
    }

    #[tokio::test]
    async fn test_transcripts_are_isolated_per_persona() {
        let (log, _) = log_with_repo().await;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        log.append(a, Message::user("for a")).await;
        log.append(b, Message::user("for b")).await;

        assert_eq!(log.read(a).await[0].content, "for a");
        assert_eq!(log.read(b).await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_and_delete_all() {
        let (log, repo) = log_with_repo().await;
        let id = Uuid::new_v4();
        log.append(id, Message::user("hi")).await;

        log.clear(id).await;
        assert!(log.read(id).await.is_empty());
        assert!(repo.snapshot().contains_key(&id));

        log.delete_all(id).await;
        assert!(!repo.snapshot().contains_key(&id));
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_unknown_creates_no_entry() {
        let (log, repo) = log_with_repo().await;
        log.clear(Uuid::new_v4()).await;

        assert!(log.is_empty().await);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_all_unknown_does_not_write() {
        let (log, repo) = log_with_repo().await;
        log.delete_all(Uuid::new_v4()).await;
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_loads_existing_transcripts() {
        let id = Uuid::new_v4();
        let mut stored = TranscriptMap::new();
        stored.insert(id, vec![Message::user("earlier")]);
        let repo = Arc::new(InMemoryTranscriptRepository::with_transcripts(stored));

        let log = TranscriptLog::load(repo).await;
        let messages = log.read(id).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_state() {
        let (log, repo) = log_with_repo().await;
        repo.set_fail_saves(true);
        let id = Uuid::new_v4();

        log.append(id, Message::user("kept in memory")).await;

        assert_eq!(log.read(id).await.len(), 1);
        assert!(repo.snapshot().is_empty());
    }
}
