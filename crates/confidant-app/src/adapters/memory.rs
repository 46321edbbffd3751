//! In-memory repositories
//!
//! Volatile implementations of the repository ports. Used for ephemeral
//! sessions and tests; saves can be made to fail to exercise degraded
//! persistence.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use confidant::{DomainError, Persona, PersonaRepository, TranscriptMap, TranscriptRepository};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory implementation of PersonaRepository
#[derive(Debug, Default)]
pub struct InMemoryPersonaRepository {
    personas: Mutex<Vec<Persona>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryPersonaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing collection
    pub fn with_personas(personas: Vec<Persona>) -> Self {
        Self {
            personas: Mutex::new(personas),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with `PersistenceDegraded`
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Currently stored collection
    pub fn snapshot(&self) -> Vec<Persona> {
        lock(&self.personas).clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
    async fn load_all(&self) -> Result<Vec<Persona>, DomainError> {
        Ok(self.snapshot())
    }

    async fn save_all(&self, personas: &[Persona]) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("persona store rejected write"));
        }
        *lock(&self.personas) = personas.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory implementation of TranscriptRepository
#[derive(Debug, Default)]
pub struct InMemoryTranscriptRepository {
    transcripts: Mutex<TranscriptMap>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryTranscriptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing map
    pub fn with_transcripts(transcripts: TranscriptMap) -> Self {
        Self {
            transcripts: Mutex::new(transcripts),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with `PersistenceDegraded`
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Currently stored map
    pub fn snapshot(&self) -> TranscriptMap {
        lock(&self.transcripts).clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptRepository for InMemoryTranscriptRepository {
    async fn load_all(&self) -> Result<TranscriptMap, DomainError> {
        Ok(self.snapshot())
    }

    async fn save_all(&self, transcripts: &TranscriptMap) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("transcript store rejected write"));
        }
        *lock(&self.transcripts) = transcripts.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
