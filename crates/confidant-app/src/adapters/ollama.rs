//! Ollama Inference Client
//!
//! Talks to a locally hosted Ollama-compatible server using reqwest.
//! Model discovery degrades to a fixed list; chat is a single bounded attempt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use confidant::{fallback_models, ChatMessage, DomainError, InferenceClient};

use crate::config::Config;

/// Default endpoint base
pub const DEFAULT_API_BASE: &str = "http://localhost:11434/api";

/// HTTP implementation of InferenceClient
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    api_base: String,
    chat_timeout: Duration,
    discovery_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Option<Vec<ModelTag>>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a client with default timeouts (120s chat, 10s discovery)
    pub fn new(api_base: &str) -> Result<Self, DomainError> {
        Self::with_timeouts(api_base, Duration::from_secs(120), Duration::from_secs(10))
    }

    pub fn with_timeouts(
        api_base: &str,
        chat_timeout: Duration,
        discovery_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(concat!("confidant/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::inference(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            chat_timeout,
            discovery_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        Self::with_timeouts(
            &config.api_base,
            config.chat_timeout(),
            config.discovery_timeout(),
        )
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Raw discovery call; errors are handled by `list_models`
    async fn fetch_models(&self) -> Result<Vec<String>, DomainError> {
        let url = format!("{}/tags", self.api_base);
        let response = self
            .client
            .get(&url)
            .timeout(self.discovery_timeout)
            .send()
            .await
            .map_err(|e| DomainError::inference(format!("Model discovery failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::inference(format!(
                "Model discovery returned {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| DomainError::inference(format!("Malformed tags response: {e}")))?;

        Ok(tags
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn list_models(&self) -> Vec<String> {
        match self.fetch_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                tracing::warn!("Endpoint advertised no models, using fallback list");
                fallback_models()
            }
            Err(e) => {
                tracing::warn!("Error loading models: {}", e);
                fallback_models()
            }
        }
    }

    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, DomainError> {
        let url = format!("{}/chat", self.api_base);
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        tracing::debug!(model, messages = messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .timeout(self.chat_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::inference(format!("Chat request timed out: {e}"))
                } else {
                    DomainError::inference(format!("Chat request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::inference(format!(
                "HTTP error! status: {status} {body}"
            )));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::inference(format!("Malformed chat response: {e}")))?;

        data.message
            .and_then(|m| m.content)
            .ok_or_else(|| DomainError::inference("Chat response has no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    async fn unused_base() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api", addr)
    }

    #[tokio::test]
    async fn test_list_models_returns_advertised_names() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                Json(json!({ "models": [{ "name": "llama3.2:latest" }, { "name": "mistral" }] }))
            }),
        );
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        assert_eq!(client.list_models().await, vec!["llama3.2:latest", "mistral"]);
    }

    #[tokio::test]
    async fn test_list_models_empty_falls_back() {
        let router = Router::new().route("/api/tags", get(|| async { Json(json!({ "models": [] })) }));
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        assert_eq!(client.list_models().await, vec!["llama3.2", "phi3", "gemma2"]);
    }

    #[tokio::test]
    async fn test_list_models_missing_field_falls_back() {
        let router = Router::new().route("/api/tags", get(|| async { Json(json!({})) }));
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        assert_eq!(client.list_models().await, fallback_models());
    }

    #[tokio::test]
    async fn test_list_models_unreachable_falls_back() {
        let client = OllamaClient::new(&unused_base().await).unwrap();
        assert_eq!(client.list_models().await, fallback_models());
    }

    #[tokio::test]
    async fn test_list_models_malformed_falls_back() {
        let router = Router::new().route("/api/tags", get(|| async { "not json" }));
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        assert_eq!(client.list_models().await, fallback_models());
    }

    #[tokio::test]
    async fn test_chat_sends_model_messages_and_no_stream() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let summary = format!(
                    "{}|{}|{}|{}",
                    body["model"].as_str().unwrap_or_default(),
                    body["messages"].as_array().map(|m| m.len()).unwrap_or_default(),
                    body["messages"][0]["role"].as_str().unwrap_or_default(),
                    body["stream"],
                );
                Json(json!({ "message": { "role": "assistant", "content": summary } }))
            }),
        );
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        let messages = vec![ChatMessage::system("be nice"), ChatMessage::user("hi")];
        let reply = client.chat("llama3.2", &messages).await.unwrap();

        assert_eq!(reply, "llama3.2|2|system|false");
    }

    #[tokio::test]
    async fn test_chat_non_success_status_is_error() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
        );
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        let result = client.chat("missing", &[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(DomainError::Inference(_))));
    }

    #[tokio::test]
    async fn test_chat_missing_content_is_error() {
        let router = Router::new().route("/api/chat", post(|| async { Json(json!({ "done": true })) }));
        let client = OllamaClient::new(&spawn_stub(router).await).unwrap();

        let result = client.chat("llama3.2", &[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(DomainError::Inference(_))));
    }

    #[tokio::test]
    async fn test_chat_times_out() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "message": { "content": "too late" } }))
            }),
        );
        let client = OllamaClient::with_timeouts(
            &spawn_stub(router).await,
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .unwrap();

        let result = client.chat("llama3.2", &[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(DomainError::Inference(_))));
    }

    #[tokio::test]
    async fn test_chat_unreachable_is_error() {
        let client = OllamaClient::new(&unused_base().await).unwrap();
        let result = client.chat("llama3.2", &[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(DomainError::Inference(_))));
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/api/").unwrap();
        assert_eq!(client.api_base(), DEFAULT_API_BASE);
    }
}
