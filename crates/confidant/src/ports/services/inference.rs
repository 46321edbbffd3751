//! Inference Client Port
//!
//! Abstract interface for the model-serving endpoint personas talk through.
//! Implementations can be swapped (local Ollama server, test doubles, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{errors::DomainError, Message, MessageRole};

/// Models offered when discovery fails or the endpoint advertises none
pub const FALLBACK_MODELS: [&str; 3] = ["llama3.2", "phi3", "gemma2"];

/// A message as sent to the inference endpoint (no timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Fallback model list as owned strings
pub fn fallback_models() -> Vec<String> {
    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Inference endpoint interface
///
/// # Example
///
/// ```rust,ignore
/// use confidant::ports::{ChatMessage, InferenceClient};
///
/// let models = client.list_models().await;
/// let reply = client.chat(&models[0], &[ChatMessage::user("hi")]).await?;
/// ```
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Discover the models the endpoint can serve.
    ///
    /// Never fails and never returns an empty list: any error or empty
    /// result degrades to [`FALLBACK_MODELS`].
    async fn list_models(&self) -> Vec<String>;

    /// Run one non-streaming chat completion and return the assistant text.
    ///
    /// Exactly one attempt per call.
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, DomainError>;
}
