use async_trait::async_trait;
use serde_json::json;

use crate::Completion;
use deepq_types::{DeepqError, Result};

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
        }
    }

    pub fn from_env() -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY").map_err(|_| DeepqError::Auth {
            provider: "openai".into(),
        })?;
        Ok(Self::new(key))
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeepqError::Provider {
                provider: "openai".into(),
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeepqError::Provider {
                provider: "openai".into(),
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|e| DeepqError::Provider {
                provider: "openai".into(),
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| DeepqError::Parse {
                expected: "chat completion".into(),
                message: "response has no message content".into(),
            })?;

        tracing::debug!(model = %self.model, chars = text.len(), "Completion received");
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides() {
        let client = OpenAiClient::new("sk-test".into())
            .with_base_url("http://localhost:9999".into())
            .with_model("gpt-4o-mini".into())
            .with_temperature(0.0);
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.temperature, 0.0);
        assert_eq!(client.name(), "openai");
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_provider_error() {
        // Port 9 is discard; connection should be refused immediately.
        let client =
            OpenAiClient::new("sk-test".into()).with_base_url("http://127.0.0.1:9".into());
        let err = client.complete("sys", "user").await.unwrap_err();
        match err {
            DeepqError::Provider { provider, status, .. } => {
                assert_eq!(provider, "openai");
                assert_eq!(status, 0);
            }
            other => panic!("Expected Provider error, got: {other:?}"),
        }
    }
}
