use crate::config::Config;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;

/// Request to send to LLM
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct LlmClient {
    config: Config,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: Config) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.has_api_key()
    }

    fn api_key(&self) -> Result<String, ProviderError> {
        self.config
            .get_api_key()
            .ok_or_else(|| ProviderError::MissingApiKey(self.config.api_key_env.clone()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Send a non-streaming completion and return the assistant text
    pub async fn complete(&self, request: LlmRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let url = self.endpoint("chat/completions");

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": request.messages,
            "stream": false,
            "temperature": request.temperature.unwrap_or(0.2),
            "max_tokens": request.max_tokens.unwrap_or(1024)
        });

        debug!(%url, model = %self.config.model, "sending completion request");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        extract_content(&body)
    }

    /// Cheap authenticated request used to confirm the backend is reachable
    pub async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(self.endpoint("models"))
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Pull `choices[0].message.content` out of a completion response
fn extract_content(body: &serde_json::Value) -> Result<String, ProviderError> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ProviderError::Malformed("completion has no message content".to_string()))
}

impl LlmRequest {
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Bonjour  " } }]
        });
        assert_eq!(extract_content(&body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_extract_content_rejects_empty() {
        let body = serde_json::json!({ "choices": [] });
        assert!(matches!(extract_content(&body), Err(ProviderError::Malformed(_))));

        let blank = serde_json::json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(extract_content(&blank).is_err());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = Config {
            api_base_url: "http://localhost:8080/v1/".to_string(),
            ..Config::default()
        };
        let client = LlmClient::new(config).unwrap();
        assert_eq!(client.endpoint("models"), "http://localhost:8080/v1/models");
    }

    #[tokio::test]
    async fn test_complete_without_key_fails_before_network() {
        let config = Config {
            api_key: None,
            api_key_env: "PARLO_TEST_UNSET_KEY".to_string(),
            ..Config::default()
        };
        let client = LlmClient::new(config).unwrap();
        let result = client
            .complete(LlmRequest::new(vec![LlmMessage::user("hi")]))
            .await;
        assert!(matches!(result, Err(ProviderError::MissingApiKey(_))));
    }
}
