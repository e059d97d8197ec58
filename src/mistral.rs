//! Mistral chat-completion client.

use crate::config::AppConfig;
use crate::error::ExtractError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for the chat-completion endpoint.
///
/// Holds the credential and sampling settings loaded at startup; the
/// underlying `reqwest::Client` enforces the configured request timeout so a
/// hung upstream cannot pin a request forever.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl MistralClient {
    pub fn new(config: &AppConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Send a chat completion request and return the raw response.
    pub async fn complete(
        &self,
        messages: Vec<Message>,
    ) -> Result<ChatCompletionResponse, ExtractError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
        };

        debug!(model = %request.model, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::Upstream(format!(
                "HTTP {}: {}",
                status,
                truncate(&error_text, 300)
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ExtractError::Upstream(format!("undecodable response body: {}", e)))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Content of the first choice's message.
    ///
    /// A reply with no choices or no content is an upstream defect, not a
    /// parse failure: the endpoint broke its own contract.
    pub fn first_content(&self) -> Result<&str, ExtractError> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| ExtractError::Upstream("response carried no choices".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

// ============================================================================
// Message types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}
