//! Minimal Gemini REST client shared by the judge, speech and illustration.

use crate::llm_client::LlmError;
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Thin wrapper over the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Creates a client for the public endpoint.
    #[instrument(skip(api_key))]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client for another endpoint (proxies, local mocks).
    #[instrument(skip(api_key))]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Posts `body` to `models/{model}:generateContent` and returns the JSON
    /// response.
    #[instrument(skip(self, body), fields(model = %model))]
    pub async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!(url = %url, "Sending request to Gemini");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                LlmError::new(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Gemini API error");
            return Err(LlmError::new(format!(
                "Gemini API error {}: {}",
                status, response_text
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, "Failed to parse Gemini response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })
    }

    /// Content parts of the first candidate, empty if absent.
    pub fn parts(response: &serde_json::Value) -> &[serde_json::Value] {
        response["candidates"][0]["content"]["parts"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_of_first_candidate() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }]
        });
        assert_eq!(GeminiClient::parts(&response).len(), 2);
    }

    #[test]
    fn test_parts_missing() {
        assert!(GeminiClient::parts(&serde_json::json!({})).is_empty());
    }
}
