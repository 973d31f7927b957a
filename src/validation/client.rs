//! Language-model client for leak validation
//!
//! The validator talks to an OpenAI-compatible chat completions endpoint.
//! The trait seam keeps the validator testable without a network and lets
//! deployments swap in other backends.

use crate::config::{SecretString, ValidationConfig};
use crate::domain::{Result, SigiloError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// A chat-completion model the validator can query.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run one completion and return the raw assistant text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Model identifier for logs and warnings.
    fn model_name(&self) -> &str;
}

/// HTTP implementation over an OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct HttpCompletionModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl HttpCompletionModel {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SigiloError::Validation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Build from the `[validation]` config section.
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` when validation is enabled without an endpoint.
    pub fn from_config(config: &ValidationConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| SigiloError::ModelUnavailable {
                component: "validator".to_string(),
                reason: "no endpoint configured".to_string(),
            })?;
        Self::new(
            endpoint,
            config.model.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompletionModel for HttpCompletionModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": 0,
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SigiloError::Validation(format!("model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SigiloError::Validation(format!(
                "model endpoint returned {status} for {}",
                self.model
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SigiloError::Validation(format!("malformed model response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                SigiloError::Validation(format!("empty completion from {}", self.model))
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_body(content: &str) -> String {
        serde_json::to_string(&json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_happy_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("[]"))
            .create_async()
            .await;

        let model =
            HttpCompletionModel::new(server.url(), "test-model", None, Duration::from_secs(5))
                .unwrap();
        let out = model.complete("system", "user").await.unwrap();
        assert_eq!(out, "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let model =
            HttpCompletionModel::new(server.url(), "test-model", None, Duration::from_secs(5))
                .unwrap();
        let err = model.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, SigiloError::Validation(_)));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let model =
            HttpCompletionModel::new(server.url(), "test-model", None, Duration::from_secs(5))
                .unwrap();
        let err = model.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, SigiloError::Validation(_)));
    }

    #[test]
    fn test_from_config_without_endpoint() {
        let config = ValidationConfig::default();
        let err = HttpCompletionModel::from_config(&config).unwrap_err();
        assert!(matches!(err, SigiloError::ModelUnavailable { .. }));
    }
}
