//! Persona Registry (Use Case)
//!
//! In-memory mirror of the persona collection. Owns persona lifetime and
//! cascades deletions into the TranscriptLog.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use uuid::Uuid;

use confidant::{DomainError, NewPersona, Persona, PersonaId, PersonaRepository};

use super::TranscriptLog;

type DeletionHook = Box<dyn Fn(PersonaId) + Send + Sync>;

/// Application service for Persona operations
pub struct PersonaRegistry {
    repo: Arc<dyn PersonaRepository>,
    transcripts: Arc<TranscriptLog>,
    personas: Mutex<Vec<Persona>>,
    deletion_hooks: StdMutex<Vec<DeletionHook>>,
}

impl PersonaRegistry {
    /// Load the stored collection, falling back to empty if it cannot be read
    pub async fn load(repo: Arc<dyn PersonaRepository>, transcripts: Arc<TranscriptLog>) -> Self {
        let personas = match repo.load_all().await {
            Ok(personas) => personas,
            Err(e) => {
                tracing::warn!("Starting with no personas: {}", e);
                Vec::new()
            }
        };

        tracing::info!("Persona registry ready with {} personas", personas.len());

        Self {
            repo,
            transcripts,
            personas: Mutex::new(personas),
            deletion_hooks: StdMutex::new(Vec::new()),
        }
    }

    /// Register a callback run after every `delete`, present or not.
    ///
    /// The SessionController uses this to drop a selection that points at a
    /// deleted persona.
    pub fn on_delete(&self, hook: impl Fn(PersonaId) + Send + Sync + 'static) {
        self.deletion_hooks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(hook));
    }

    /// Create a new Persona.
    ///
    /// Validation failures leave both the registry and the store untouched.
    pub async fn create(&self, input: NewPersona) -> Result<Persona, DomainError> {
        let mut persona = Persona::new(input)?;

        let mut personas = self.personas.lock().await;
        while personas.iter().any(|p| p.id == persona.id) {
            persona.id = Uuid::new_v4();
        }
        personas.push(persona.clone());
        self.persist(&personas).await;

        tracing::info!("Created persona: {} ({})", persona.name, persona.id);

        Ok(persona)
    }

    /// Create a Persona whose model must be one of `available_models`
    pub async fn create_checked(
        &self,
        input: NewPersona,
        available_models: &[String],
    ) -> Result<Persona, DomainError> {
        let model = input.model.trim();
        if !model.is_empty() && !available_models.iter().any(|m| m == model) {
            return Err(DomainError::validation(format!(
                "model '{}' is not offered by the inference endpoint",
                model
            )));
        }
        self.create(input).await
    }

    /// All personas in insertion order
    pub async fn list(&self) -> Vec<Persona> {
        self.personas.lock().await.clone()
    }

    /// Find a Persona by ID
    pub async fn find(&self, id: PersonaId) -> Option<Persona> {
        self.personas
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Delete a Persona and its transcript. Absent ids are a no-op.
    ///
    /// Deletion hooks run afterwards, so an active selection of this persona
    /// is cleared whichever path the delete came through.
    pub async fn delete(&self, id: PersonaId) -> Option<Persona> {
        let removed = {
            let mut personas = self.personas.lock().await;
            let removed = personas
                .iter()
                .position(|p| p.id == id)
                .map(|index| personas.remove(index));
            if removed.is_some() {
                self.persist(&personas).await;
            }
            removed
        };

        self.transcripts.delete_all(id).await;

        for hook in self
            .deletion_hooks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
        {
            hook(id);
        }

        if let Some(persona) = &removed {
            tracing::info!("Deleted persona: {} ({})", persona.name, persona.id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.personas.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.personas.lock().await.is_empty()
    }

    async fn persist(&self, personas: &[Persona]) {
        if let Err(e) = self.repo.save_all(personas).await {
            tracing::warn!("Failed to persist personas: {}", e);
        }
    }
}
