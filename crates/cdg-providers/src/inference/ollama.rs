//! Ollama inference provider
//!
//! Implements the `InferenceProvider` port against Ollama's local
//! completion API (`POST /api/generate`). The provider makes exactly one
//! request per call; retry and escalation policy belong to the run
//! coordinator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use cdg_domain::error::{Error, Result};
use cdg_domain::ports::InferenceProvider;

/// Completion payload returned by Ollama
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama completion provider
///
/// Receives the HTTP client via constructor injection so callers control
/// pooling and TLS setup.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    timeout: Duration,
    num_ctx: u32,
    http_client: Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Arguments
    /// * `base_url` - Ollama server URL (e.g., "http://localhost:11434")
    /// * `model` - Model name (e.g., "codestral")
    /// * `timeout` - Per-request deadline
    /// * `num_ctx` - Context window requested from the model
    /// * `http_client` - Reqwest HTTP client
    pub fn new(
        base_url: String,
        model: String,
        timeout: Duration,
        num_ctx: u32,
        http_client: Client,
    ) -> Self {
        Self {
            base_url,
            model,
            timeout,
            num_ctx,
            http_client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    async fn infer(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "num_ctx": self.num_ctx },
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::network(format!("request timed out after {:?}", self.timeout))
                } else if e.is_connect() {
                    Error::unreachable(format!("{}: {}", self.base_url, e))
                } else {
                    Error::network(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::network(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let completion: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::network(format!("malformed completion payload: {e}")))?;

        debug!(
            model = %self.model,
            chars = completion.response.len(),
            "completion received"
        );
        Ok(completion.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: String) -> OllamaProvider {
        OllamaProvider::new(
            base_url,
            "codestral".to_string(),
            Duration::from_secs(5),
            8192,
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_infer_returns_completion_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Adds two numbers."}"#)
            .create_async()
            .await;

        let completion = provider(server.url()).infer("document this").await.unwrap();
        assert_eq!(completion, "Adds two numbers.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model not loaded")
            .create_async()
            .await;

        let err = provider(server.url()).infer("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Port 1 is never listening
        let err = provider("http://127.0.0.1:1".to_string())
            .infer("prompt")
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
