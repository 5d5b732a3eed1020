//! Little Learners library - the application around the board game engine
//!
//! The pure game rules live in [`little_learners_board`] (re-exported as
//! [`board`]). This crate adds everything with I/O attached.
//!
//! # Architecture
//!
//! - **Driver**: owns the turn engine and runs its timers on tokio
//! - **Evaluation**: fail-open AI judging of task answers
//! - **Review**: the answer, judge and teacher flow while a task is open
//! - **Speech / Illustration**: Gemini text-to-speech and tile artwork
//! - **Cache**: SQLite store of illustrations with JSON backup
//! - **TUI**: ratatui frontend
//!
//! # Example
//!
//! ```no_run
//! use little_learners::{GameDriver, LogSink};
//! use little_learners::board::{Pacing, RandomDice, RosterBuilder, TileCatalog, TurnEngine};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = TurnEngine::new(TileCatalog::standard(), Pacing::default(), RandomDice::new());
//! let (handle, _task) = GameDriver::spawn(engine, Arc::new(LogSink));
//!
//! handle.start(RosterBuilder::new(2)?.build());
//! handle.roll();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod audio;
mod backup;
mod config;
mod db;
mod driver;
mod evaluation;
mod gemini;
mod illustration;
mod llm_client;
mod review;
mod speech;
mod tui;

/// The pure game rules crate.
pub use little_learners_board as board;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, PacingConfig};

// Crate-level exports - LLM client
pub use gemini::GeminiClient;
pub use llm_client::{CompletionBackend, LlmClient, LlmConfig, LlmError, reply_text};

// Crate-level exports - Task evaluation and review
pub use evaluation::{
    DEFAULT_TASK_PROMPT, EvaluationRequest, FALLBACK_FEEDBACK, TaskEvaluator, UNAVAILABLE_FEEDBACK,
    Verdict,
};
pub use review::{NoVoiceInput, ReviewId, ReviewStatus, TaskReview, VoiceInput, VoiceUnavailable};

// Crate-level exports - Speech and illustrations
pub use illustration::{GeminiImageGenerator, ImageGenerator, illustrate_missing};
pub use speech::{PcmAudio, SPEECH_SAMPLE_RATE, SpeechSynthesizer};

// Crate-level exports - Image cache and backups
pub use backup::{BACKUP_VERSION, Backup, BackupError, BackupImage, export_backup, import_backup};
pub use db::{CacheStage, DbError, ImageCache, TileImage};

// Crate-level exports - Game driver and effects
pub use audio::{ChannelSink, LogSink, SilentSink, SoundSink};
pub use driver::{Command, DriverHandle, GameDriver};

// Crate-level exports - Terminal UI
pub use tui::run_tui;
