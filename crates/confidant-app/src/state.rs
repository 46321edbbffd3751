//! Application state
//!
//! Composition root: builds the repositories, the inference client and the
//! use-case services, and hands them out as shared handles.

use std::sync::Arc;

use anyhow::{Context, Result};

use confidant::{
    DomainError, InferenceClient, PersonaId, PersonaRepository, TranscriptRepository,
};

use crate::adapters::{JsonPersonaRepository, JsonTranscriptRepository, OllamaClient};
use crate::application::{PersonaRegistry, SessionController, TranscriptLog};
use crate::config::Config;

/// Shared handles to every service
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub inference: Arc<dyn InferenceClient>,
    pub personas: Arc<PersonaRegistry>,
    pub transcripts: Arc<TranscriptLog>,
    pub session: Arc<SessionController>,
}

impl AppState {
    /// Build state backed by JSON files in the configured data directory and
    /// the configured Ollama endpoint.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        tracing::info!("Using data directory {:?}", data_dir);

        let inference =
            OllamaClient::from_config(&config).context("Failed to build inference client")?;
        tracing::info!("Inference endpoint: {}", inference.api_base());

        Ok(Self::with_parts(
            config,
            Arc::new(JsonPersonaRepository::in_dir(&data_dir)),
            Arc::new(JsonTranscriptRepository::in_dir(&data_dir)),
            Arc::new(inference),
        )
        .await)
    }

    /// Build state from explicit adapters
    pub async fn with_parts(
        config: Config,
        persona_repo: Arc<dyn PersonaRepository>,
        transcript_repo: Arc<dyn TranscriptRepository>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        let transcripts = Arc::new(TranscriptLog::load(transcript_repo).await);
        let personas = Arc::new(PersonaRegistry::load(persona_repo, transcripts.clone()).await);
        let session = Arc::new(
            SessionController::new(personas.clone(), transcripts.clone(), inference.clone())
                .with_context_window(config.context_window),
        );

        Self {
            config,
            inference,
            personas,
            transcripts,
            session,
        }
    }

    /// Models offered by the endpoint (or the fallback list)
    pub async fn available_models(&self) -> Vec<String> {
        self.inference.list_models().await
    }

    /// Delete a persona, its transcript and any selection pointing at it
    pub async fn delete_persona(&self, id: PersonaId) -> Result<bool, DomainError> {
        Ok(self.session.delete_persona(id).await?.is_some())
    }
}
