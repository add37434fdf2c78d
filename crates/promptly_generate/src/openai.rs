//! OpenAI-compatible chat-completions backend for copy generation.

use crate::CopyGenerator;
use async_trait::async_trait;
use promptly_core::{Brief, CopySource, GeneratedCopy};
use promptly_error::{GenerateError, GenerateErrorKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the chat-completions backend.
#[derive(Debug, Clone, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct OpenAiConfig {
    /// API key for authentication
    api_key: String,
    /// Model identifier
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    model: String,
    /// Full URL of the chat-completions endpoint
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
}

impl OpenAiConfig {
    /// Returns a builder for constructing an OpenAiConfig.
    pub fn builder() -> OpenAiConfigBuilder {
        OpenAiConfigBuilder::default()
    }

    /// Read configuration from the environment.
    ///
    /// Returns `None` when `OPENAI_API_KEY` is not set, which is the signal
    /// for callers to fall back to the template backend. `OPENAI_MODEL` and
    /// `OPENAI_BASE_URL` override the defaults.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Some(
            OpenAiConfigBuilder::default()
                .api_key(api_key)
                .model(model)
                .base_url(base_url)
                .build()
                .expect("valid OpenAiConfig"),
        )
    }
}

/// A message in the chat-completions format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A choice in the chat-completions response.
#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions response body.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Copy generator backed by an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiCopywriter {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiCopywriter {
    /// Creates a new chat-completions copywriter.
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn prompt(brief: &Brief) -> String {
        let mut lines = vec![
            "Write a short marketing email. Reply with a line starting with \
             'Subject: ' followed by a blank line and the plain-text body."
                .to_string(),
        ];
        let mut field = |label: &str, value: &Option<String>| {
            if let Some(value) = value {
                lines.push(format!("{label}: {value}"));
            }
        };
        field("Business", brief.business());
        field("Audience", brief.audience());
        field("Goal", brief.goal());
        field("Product", brief.product());
        field("Tone", brief.tone());
        field("Call to action", brief.cta());
        field("Length", brief.length());
        lines.join("\n")
    }

    /// Split a completion into subject and body.
    ///
    /// The model is asked for a `Subject: ` first line; when it ignores the
    /// instruction the whole completion becomes the body and the subject
    /// falls back to the brief's business name.
    fn split_completion(brief: &Brief, completion: &str) -> (String, String) {
        let trimmed = completion.trim();
        if let Some(rest) = trimmed.strip_prefix("Subject:") {
            if let Some((subject, body)) = rest.split_once('\n') {
                return (subject.trim().to_string(), body.trim().to_string());
            }
        }
        let fallback = brief
            .business()
            .clone()
            .unwrap_or_else(|| "Your update".to_string());
        (fallback, trimmed.to_string())
    }
}

#[async_trait]
impl CopyGenerator for OpenAiCopywriter {
    #[instrument(skip(self, brief), fields(model = %self.config.model()))]
    async fn generate(&self, brief: &Brief) -> Result<GeneratedCopy, GenerateError> {
        let request = ChatRequest {
            model: self.config.model().clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::prompt(brief),
            }],
            temperature: Some(0.7),
        };

        debug!(model = %self.config.model(), "Sending generation request");

        let response = self
            .client
            .post(self.config.base_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Generation request failed");
                GenerateError::new(GenerateErrorKind::Http(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, message = %message, "Generation API error");
            return Err(GenerateError::new(GenerateErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse generation response");
            GenerateError::new(GenerateErrorKind::ResponseParsing(e.to_string()))
        })?;

        let completion = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerateError::new(GenerateErrorKind::EmptyCompletion))?;

        let (subject, body) = Self::split_completion(brief, &completion);
        Ok(GeneratedCopy::new(subject, body, CopySource::Openai))
    }
}
