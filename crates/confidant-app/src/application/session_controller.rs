//! Session Controller (Use Case)
//!
//! Drives a conversation with one active persona: builds the prompt, calls the
//! inference endpoint and records both turns in the TranscriptLog.
//!
//! At most one chat request is in flight per controller. Inference failures
//! never escape `send`; they become a fallback assistant message.

use std::sync::{Arc, Mutex, MutexGuard};

use confidant::{
    build_prompt_with_window, DomainError, InferenceClient, Message, Persona, PersonaId,
    CONTEXT_WINDOW,
};

use super::{PersonaRegistry, TranscriptLog};

/// Assistant reply recorded when the inference call fails
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoActiveSession,
    ActiveSession(PersonaId),
    AwaitingResponse(PersonaId),
}

#[derive(Debug, Default)]
struct Inner {
    selected: Option<PersonaId>,
    in_flight: Option<PersonaId>,
}

impl Inner {
    fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn deselect_if(&mut self, persona_id: PersonaId) {
        if self.selected == Some(persona_id) {
            self.selected = None;
        }
    }

    fn state(&self) -> SessionState {
        match self.selected {
            None => SessionState::NoActiveSession,
            Some(id) if self.in_flight == Some(id) => SessionState::AwaitingResponse(id),
            Some(id) => SessionState::ActiveSession(id),
        }
    }
}

/// Clears the in-flight marker when a send settles, including when the
/// send future is dropped before completion.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.inner).in_flight = None;
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Application service for the active conversation
pub struct SessionController {
    registry: Arc<PersonaRegistry>,
    transcripts: Arc<TranscriptLog>,
    inference: Arc<dyn InferenceClient>,
    context_window: usize,
    inner: Arc<Mutex<Inner>>,
}

impl SessionController {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        transcripts: Arc<TranscriptLog>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        let inner = Arc::new(Mutex::new(Inner::default()));

        let selection = Arc::downgrade(&inner);
        registry.on_delete(move |persona_id| {
            if let Some(inner) = selection.upgrade() {
                lock(&inner).deselect_if(persona_id);
            }
        });

        Self {
            registry,
            transcripts,
            inference,
            context_window: CONTEXT_WINDOW,
            inner,
        }
    }

    /// Override how many trailing transcript messages go out with each request
    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state()
    }

    /// Make `persona_id` the active persona.
    ///
    /// Returns `Ok(None)` without changing state when the persona does not exist.
    /// Fails with `SessionBusy` while any request is in flight, including one
    /// whose session was deselected.
    pub async fn select(&self, persona_id: PersonaId) -> Result<Option<Persona>, DomainError> {
        if lock(&self.inner).is_busy() {
            return Err(DomainError::SessionBusy);
        }

        let Some(persona) = self.registry.find(persona_id).await else {
            tracing::debug!("Ignoring selection of unknown persona {}", persona_id);
            return Ok(None);
        };

        let mut inner = lock(&self.inner);
        if inner.is_busy() {
            return Err(DomainError::SessionBusy);
        }
        inner.selected = Some(persona.id);
        tracing::debug!("Selected persona {} ({})", persona.name, persona.id);
        Ok(Some(persona))
    }

    /// Leave the active session. Transcripts are kept.
    pub fn deselect(&self) {
        lock(&self.inner).selected = None;
    }

    /// The active persona, if any
    pub async fn active_persona(&self) -> Option<Persona> {
        let selected = lock(&self.inner).selected?;
        self.registry.find(selected).await
    }

    /// Transcript of the active persona (empty when no session is active)
    pub async fn active_transcript(&self) -> Vec<Message> {
        let selected = lock(&self.inner).selected;
        match selected {
            Some(id) => self.transcripts.read(id).await,
            None => Vec::new(),
        }
    }

    /// Send a user message to the active persona.
    ///
    /// Returns the recorded assistant message, or `Ok(None)` when the text is
    /// blank. Fails with `NoActiveSession` or `SessionBusy` without touching
    /// the transcript.
    ///
    /// Dropping the returned future mid-request releases the session but can
    /// leave the user turn recorded without an assistant reply.
    pub async fn send(&self, text: &str) -> Result<Option<Message>, DomainError> {
        let text = text.trim();

        let (persona_id, _in_flight) = {
            let mut inner = lock(&self.inner);
            let persona_id = match inner.selected {
                None => return Err(DomainError::NoActiveSession),
                Some(id) => id,
            };
            if inner.is_busy() {
                return Err(DomainError::SessionBusy);
            }
            if text.is_empty() {
                return Ok(None);
            }
            inner.in_flight = Some(persona_id);
            (persona_id, InFlight { inner: self.inner.as_ref() })
        };

        let Some(persona) = self.registry.find(persona_id).await else {
            self.deselect_if(persona_id);
            return Err(DomainError::not_found("Persona", persona_id));
        };

        let history = self.transcripts.read(persona_id).await;
        let prompt = build_prompt_with_window(&persona, &history, text, self.context_window);

        self.transcripts
            .append(persona_id, Message::user(text))
            .await;

        let reply = match self.inference.chat(&persona.model, &prompt).await {
            Ok(content) => Message::assistant(content),
            Err(e) => {
                tracing::error!("Error getting response from {}: {}", persona.model, e);
                Message::assistant(FALLBACK_REPLY)
            }
        };

        if self.registry.find(persona_id).await.is_none() {
            tracing::warn!(
                "Persona {} was deleted while awaiting a response; reply dropped",
                persona_id
            );
            return Ok(None);
        }

        self.transcripts.append(persona_id, reply.clone()).await;
        Ok(Some(reply))
    }

    /// Empty the active persona's transcript
    pub async fn clear_active_transcript(&self) -> Result<(), DomainError> {
        let persona_id = match self.state() {
            SessionState::NoActiveSession => return Err(DomainError::NoActiveSession),
            SessionState::AwaitingResponse(_) => return Err(DomainError::SessionBusy),
            SessionState::ActiveSession(id) => id,
        };
        if self.registry.find(persona_id).await.is_none() {
            self.deselect_if(persona_id);
            return Err(DomainError::not_found("Persona", persona_id));
        }
        self.transcripts.clear(persona_id).await;
        Ok(())
    }

    /// Delete a persona through the registry, refusing while its request is
    /// in flight. The registry's deletion hook drops a matching selection.
    pub async fn delete_persona(&self, persona_id: PersonaId) -> Result<Option<Persona>, DomainError> {
        if lock(&self.inner).in_flight == Some(persona_id) {
            return Err(DomainError::SessionBusy);
        }

        Ok(self.registry.delete(persona_id).await)
    }

    fn deselect_if(&self, persona_id: PersonaId) {
        lock(&self.inner).deselect_if(persona_id);
    }
}
