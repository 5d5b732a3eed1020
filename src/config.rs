//! Application configuration.

use crate::gemini::GeminiClient;
use crate::llm_client::{LlmClient, LlmConfig};
use derive_getters::Getters;
use derive_more::{Display, Error};
use little_learners_board::Pacing;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Turn pacing in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Die tumbling time.
    #[serde(default = "default_roll_ms")]
    roll_ms: u64,
    /// Pause with the result shown before moving.
    #[serde(default = "default_settle_ms")]
    settle_ms: u64,
    /// Time per tile.
    #[serde(default = "default_step_ms")]
    step_ms: u64,
    /// Pause on the final tile before it resolves.
    #[serde(default = "default_land_ms")]
    land_ms: u64,
}

fn default_roll_ms() -> u64 {
    1200
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_step_ms() -> u64 {
    400
}

fn default_land_ms() -> u64 {
    600
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            roll_ms: default_roll_ms(),
            settle_ms: default_settle_ms(),
            step_ms: default_step_ms(),
            land_ms: default_land_ms(),
        }
    }
}

impl From<PacingConfig> for Pacing {
    fn from(config: PacingConfig) -> Self {
        Pacing::from_millis(config.roll_ms, config.settle_ms, config.step_ms, config.land_ms)
    }
}

/// Configuration for the whole application.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Turn pacing.
    #[serde(default)]
    pacing: PacingConfig,

    /// Gemini model for the answer judge.
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for judge responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Gemini text-to-speech model.
    #[serde(default = "default_speech_model")]
    speech_model: String,

    /// Prebuilt voice name.
    #[serde(default = "default_speech_voice")]
    speech_voice: String,

    /// Gemini image model for tile illustrations.
    #[serde(default = "default_image_model")]
    image_model: String,

    /// Pause between illustration requests, milliseconds.
    #[serde(default = "default_illustration_delay_ms")]
    illustration_delay_ms: u64,

    /// SQLite file for the illustration cache.
    #[serde(default = "default_database_path")]
    database_path: String,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_speech_voice() -> String {
    "Kore".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_illustration_delay_ms() -> u64 {
    1000
}

fn default_database_path() -> String {
    "little_learners.db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            speech_model: default_speech_model(),
            speech_voice: default_speech_voice(),
            image_model: default_image_model(),
            illustration_delay_ms: default_illustration_delay_ms(),
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text. Missing fields take defaults.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(model = %config.llm_model, "Config loaded");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the database path.
    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Engine pacing.
    pub fn engine_pacing(&self) -> Pacing {
        self.pacing.into()
    }

    /// Pause between illustration requests.
    pub fn illustration_delay(&self) -> Duration {
        Duration::from_millis(self.illustration_delay_ms)
    }

    /// Creates the judge configuration from `GEMINI_API_KEY` (or `API_KEY`).
    #[instrument(skip(self), fields(model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let api_key = gemini_api_key().ok_or_else(|| {
            ConfigError::new("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        Ok(LlmConfig::new(api_key, self.llm_model.clone(), self.llm_max_tokens))
    }

    /// The judge client, or `None` with a warning when no key is available.
    #[instrument(skip(self))]
    pub fn llm_client(&self) -> Option<LlmClient> {
        match self.create_llm_config() {
            Ok(config) => Some(LlmClient::new(config)),
            Err(e) => {
                warn!(error = %e, "AI judge disabled");
                None
            }
        }
    }

    /// Gemini client for speech and illustrations, or `None` with a warning.
    #[instrument(skip(self))]
    pub fn gemini_client(&self) -> Option<GeminiClient> {
        match gemini_api_key() {
            Some(key) => Some(GeminiClient::new(key)),
            None => {
                warn!("GEMINI_API_KEY is missing, speech and illustrations disabled");
                None
            }
        }
    }
}

fn gemini_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.llm_model(), "gemini-2.5-flash");
        assert_eq!(config.speech_voice(), "Kore");
        assert_eq!(config.engine_pacing(), Pacing::default());
        assert_eq!(config.illustration_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_pacing_override() {
        let config = AppConfig::from_toml(
            r#"
            llm_model = "gemini-2.5-pro"

            [pacing]
            settle_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.llm_model(), "gemini-2.5-pro");
        assert_eq!(*config.pacing().settle_ms(), 500);
        assert_eq!(*config.pacing().roll_ms(), 1200);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let err = AppConfig::from_toml("llm_max_tokens = \"many\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_or_default("/definitely/not/here.toml").unwrap();
        assert_eq!(config.database_path(), "little_learners.db");
    }
}
