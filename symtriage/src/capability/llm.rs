//! Chat-completions language-model capability.
//!
//! Speaks the OpenAI-compatible `/chat/completions` API. The default
//! endpoint and model target Groq's hosted `llama-3.1-8b-instant`.

use super::{Capability, CapabilityInput};
use crate::errors::CapabilityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// A message in chat format.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// A response choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Assistant message within a choice.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// A language-model-backed capability.
///
/// The stage instruction becomes the system message; the query and any
/// dependency outputs become the user message.
#[derive(Debug, Clone)]
pub struct ChatCompletionsCapability {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl ChatCompletionsCapability {
    /// Creates a capability against the default Groq endpoint and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the completion token cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Capability for ChatCompletionsCapability {
    async fn invoke(&self, input: &CapabilityInput<'_>) -> Result<String, CapabilityError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: input.instruction.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: input.user_text(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Request(format!(
                "status {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::Request(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .map(|content| content.trim().to_string())
            .ok_or(CapabilityError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let capability = ChatCompletionsCapability::new("key")
            .with_base_url("http://localhost:9999/v1")
            .with_model("test-model")
            .with_max_tokens(64);

        assert_eq!(capability.base_url, "http://localhost:9999/v1");
        assert_eq!(capability.model, "test-model");
        assert_eq!(capability.max_tokens, 64);
    }

    #[test]
    fn test_response_parsing_extracts_first_choice() {
        let raw = r#"{"choices": [{"message": {"content": "fever, cough"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content;
        assert_eq!(content.as_deref(), Some("fever, cough"));
    }

    #[test]
    fn test_response_parsing_tolerates_null_content() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_request_error() {
        let capability = ChatCompletionsCapability::new("key")
            .with_base_url("http://127.0.0.1:1/v1");
        let input = CapabilityInput {
            instruction: "classify",
            query: "I feel ill",
            context: &[],
        };

        let err = capability.invoke(&input).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Request(_)));
    }
}
