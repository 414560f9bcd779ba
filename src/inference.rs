//! Chat-completion client for the hosted inference API.
//!
//! The service talks to an OpenAI-compatible `/chat/completions` endpoint
//! (Groq by default). [`CompletionClient`] is the seam the analyzer depends
//! on, so tests can swap the HTTP client for a canned one.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Inference failures. The display string is what ends up in a review's
/// `{"error": ...}` entry.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
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

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn into_first_content(self) -> Result<String, InferenceError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::Parse("completion returned no choices".to_string()))?;
        choice
            .message
            .content
            .ok_or_else(|| InferenceError::Parse("completion choice has no content".to_string()))
    }
}

/// Sends one chat completion and returns the first choice's text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError>;
}

/// reqwest-backed client for an OpenAI-compatible completion API.
#[derive(Clone)]
pub struct GroqClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, InferenceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InferenceError::Config("API key is empty".to_string()));
        }
        Ok(Self {
            http_client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another OpenAI-compatible deployment.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("Failed to decode completion: {}", e)))?;

        let content = completion.into_first_content()?;
        debug!(model = %request.model, content = %content, "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization_omits_missing_stop() {
        let request = ChatRequest {
            model: "llama3-8b-8192".to_string(),
            messages: vec![Message::system("be terse"), Message::user("great product")],
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 1.0,
            stream: false,
            stop: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "be terse"}));
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["stream"], false);
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"sentiment\": {}}"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(response.into_first_content().unwrap(), "{\"sentiment\": {}}");
    }

    #[test]
    fn test_missing_choices_is_parse_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = response.into_first_content().unwrap_err();
        assert_eq!(err.to_string(), "Parse error: completion returned no choices");
    }

    #[test]
    fn test_null_content_is_parse_error() {
        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(matches!(response.into_first_content(), Err(InferenceError::Parse(_))));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(GroqClient::new("  "), Err(InferenceError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GroqClient::new("key").unwrap().with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_api_error_display() {
        let err = InferenceError::Api {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): invalid api key");
    }
}
