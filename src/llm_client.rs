//! The answer judge's model client.
//!
//! The judge talks to Gemini's `generateContent` endpoint in JSON mode. The
//! evaluator only depends on [`CompletionBackend`], so tests and other
//! backends plug in there.

use crate::gemini::GeminiClient;
use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing::{debug, error, info, instrument};

/// Judge model settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a judge configuration.
    #[instrument(skip(api_key), fields(model = %model))]
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating judge config");
        Self {
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gemini API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Model name, e.g. `gemini-2.5-flash`.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Output token cap for one verdict.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Request body asking for a JSON-only reply.
    pub fn request_body(&self, system_prompt: &str, user_message: &str) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_message }] }],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens,
                "responseMimeType": "application/json"
            }
        })
    }
}

/// Anything that turns a system prompt and a user message into text.
///
/// [`LlmClient`] is the production implementation; the evaluator only sees
/// this trait.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generates a completion.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}

/// Judge client over Gemini.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    gemini: GeminiClient,
}

impl LlmClient {
    /// Creates a client for the public Gemini endpoint.
    #[instrument(skip(config), fields(model = %config.model()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating judge client");
        let gemini = GeminiClient::new(config.api_key.clone());
        Self { config, gemini }
    }

    /// Creates a client that sends requests through `gemini` instead.
    pub fn with_gemini(config: LlmConfig, gemini: GeminiClient) -> Self {
        Self { config, gemini }
    }

    /// The client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Asks the judge model and returns its raw text reply.
    #[instrument(skip(self, system_prompt, user_message), fields(model = %self.config.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let body = self.config.request_body(system_prompt, user_message);
        let response = self.gemini.generate_content(&self.config.model, &body).await?;
        let content = reply_text(&response)?;
        info!(content_length = content.len(), "Judge replied");
        Ok(content)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        self.generate(system_prompt, user_message).await
    }
}

/// Joins the text parts of the first candidate, skipping thought summaries.
pub fn reply_text(response: &serde_json::Value) -> Result<String, LlmError> {
    let content = GeminiClient::parts(response)
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect::<String>();
    if content.trim().is_empty() {
        let reason = response["candidates"][0]["finishReason"]
            .as_str()
            .unwrap_or("none");
        error!(finish_reason = reason, "No text in judge reply");
        return Err(LlmError::new(format!(
            "No text in judge reply (finish reason: {})",
            reason
        )));
    }
    Ok(content)
}

/// Judge or Gemini transport error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
