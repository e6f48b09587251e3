//! Single-turn chat client for the language model that scores and summarizes documents.
//!
//! Every call is stateless: one user message in, the assistant's text out. The Ollama-backed
//! client talks to `/api/chat` directly over HTTP with streaming disabled.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a chat completion attempt.
#[derive(Debug, Error)]
pub enum ChatClientError {
    /// Runtime was unreachable or the call timed out.
    #[error("Chat provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Runtime answered with a non-success status.
    #[error("Chat request failed: {0}")]
    GenerationFailed(String),
    /// Runtime answered but the body did not carry a message.
    #[error("Malformed chat response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by language model backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the reply text.
    async fn chat(&self, prompt: &str) -> Result<String, ChatClientError>;
}

/// Chat client backed by a local Ollama runtime.
pub struct OllamaChatClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaChatClient {
    /// Build a client for `model` at `base_url`, bounding each call by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatClientError> {
        let http = Client::builder()
            .user_agent("docsearch/chat")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ChatClientError::ProviderUnavailable(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Build a client from runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self, ChatClientError> {
        Self::new(
            config.ollama_url.clone(),
            config.chat_model.clone(),
            config.model_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatClient for OllamaChatClient {
    async fn chat(&self, prompt: &str) -> Result<String, ChatClientError> {
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                ChatClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChatClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaChatResponse = response.json().await.map_err(|error| {
            ChatClientError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        body.message
            .and_then(|message| message.content)
            .ok_or_else(|| ChatClientError::InvalidResponse("response carried no message".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OllamaChatClient {
        OllamaChatClient::new(server.base_url(), "gemma2:2b", Duration::from_secs(5))
            .expect("client")
    }

    #[tokio::test]
    async fn returns_assistant_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .json_body_partial(r#"{"model":"gemma2:2b","stream":false}"#)
                    .body_contains("Rate how relevant");
                then.status(200).json_body(json!({
                    "model": "gemma2:2b",
                    "message": { "role": "assistant", "content": " 72\n" },
                    "done": true
                }));
            })
            .await;

        let reply = client_for(&server)
            .chat("Rate how relevant this is")
            .await
            .expect("reply");

        mock.assert_async().await;
        assert_eq!(reply, " 72\n");
    }

    #[tokio::test]
    async fn missing_message_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200).json_body(json!({ "done": true }));
            })
            .await;

        let error = client_for(&server).chat("hi").await.expect_err("no message");
        assert!(matches!(error, ChatClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn error_status_is_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500).body("model not loaded");
            })
            .await;

        let error = client_for(&server).chat("hi").await.expect_err("500");
        assert!(
            matches!(&error, ChatClientError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn slow_runtime_hits_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({ "message": { "content": "late" } }));
            })
            .await;

        let client = OllamaChatClient::new(
            server.base_url(),
            "gemma2:2b",
            Duration::from_millis(200),
        )
        .expect("client");

        let error = client.chat("hi").await.expect_err("timeout");
        assert!(matches!(error, ChatClientError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_runtime_is_provider_unavailable() {
        let client = OllamaChatClient::new(
            "http://127.0.0.1:1",
            "gemma2:2b",
            Duration::from_millis(500),
        )
        .expect("client");

        let error = client.chat("hi").await.expect_err("unreachable");
        assert!(matches!(error, ChatClientError::ProviderUnavailable(_)));
    }
}
