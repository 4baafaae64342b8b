//! OpenAI-compatible chat completion provider
//!
//! Translations are requested from a `/chat/completions` endpoint. Any
//! service speaking the OpenAI protocol can be used by pointing `base_url`
//! at it.
//!
//! Single texts are sent with a short "translate this" instruction; batches
//! are sent as a JSON array and the model is asked for a JSON object of the
//! form `{"translations": [...]}`, which is decoded strictly.
//!
//! # Example
//!
//! ```ignore
//! use locale_sync_mt::{MachineTranslator, OpenAiProvider};
//!
//! let provider = OpenAiProvider::new("sk-...".to_string())?;
//! let result = provider.translate("Hello, world!", "français").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BATCH_MODEL: &str = "gpt-3.5-turbo-0125";

const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 1024;
const STOP_SEQUENCE: &str = "STOP";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// The only shape accepted for a batch reply
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchTranslations {
    translations: Vec<String>,
}

/// Chat completion client bound to one API key
#[derive(Clone)]
pub struct OpenAiProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    batch_model: String,
}

impl OpenAiProvider {
    /// Create a provider for the default OpenAI endpoint and models
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if the key is blank, `BackendError` if the HTTP
    /// client cannot be built.
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigurationError(
                "API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MtError::BackendError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            batch_model: DEFAULT_BATCH_MODEL.to_string(),
        })
    }

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use one model for both single and batch requests
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self.batch_model = model.to_string();
        self
    }

    /// Bound each HTTP request; the pool applies its own timeout as well
    pub fn with_timeout(mut self, timeout: Duration) -> MtResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MtError::BackendError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    fn single_prompt(text: &str, target_language: &str) -> String {
        format!(
            "Translate \"{}\" to {}. Give the result directly. Don't explain. Don't quote output.",
            text, target_language
        )
    }

    fn batch_prompt(texts: &[String], target_language: &str) -> MtResult<String> {
        let phrases = serde_json::to_string(texts)
            .map_err(|e| MtError::BackendError(format!("Failed to encode phrases: {}", e)))?;
        Ok(format!(
            "Translate the following phrases into {}, and return the translations as a JSON array \
             (JSON object must be of type {{translations: ['a','a'...]}}) : {}",
            target_language, phrases
        ))
    }

    /// Decode the content of a batch reply into exactly `expected` strings
    fn parse_batch_reply(content: &str, expected: usize) -> MtResult<Vec<String>> {
        let parsed: BatchTranslations = serde_json::from_str(content).map_err(|e| {
            MtError::BackendError(format!("Failed to parse translations from response: {}", e))
        })?;

        if parsed.translations.len() != expected {
            return Err(MtError::BackendError(format!(
                "Expected {} translations, received {}",
                expected,
                parsed.translations.len()
            )));
        }
        Ok(parsed.translations)
    }

    /// Send one chat completion and return the first choice's content
    async fn complete(&self, request: &ChatRequest<'_>) -> MtResult<Option<String>> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.as_u16() == 429 {
                MtError::RateLimited(format!("API returned {}: {}", status, error_text))
            } else {
                MtError::BackendError(format!("API returned {}: {}", status, error_text))
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| MtError::BackendError(format!("Failed to parse API response: {}", e)))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("batch_model", &self.batch_model)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for OpenAiProvider {
    async fn translate(&self, text: &str, target_language: &str) -> MtResult<String> {
        let prompt = Self::single_prompt(text, target_language);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stop: Some(vec![STOP_SEQUENCE]),
            response_format: None,
        };

        let content = self.complete(&request).await?;
        Ok(content.unwrap_or_default().trim().to_string())
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> MtResult<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = Self::batch_prompt(texts, target_language)?;
        let request = ChatRequest {
            model: &self.batch_model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stop: None,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let content = self
            .complete(&request)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or_else(|| MtError::BackendError("No translation response received".to_string()))?;

        Self::parse_batch_reply(&content, texts.len())
    }

    fn provider_name(&self) -> &str {
        "OpenAI Chat Completions"
    }
}
