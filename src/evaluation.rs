//! Task evaluation gateway: asks the AI judge whether an answer satisfies a
//! tile's task.
//!
//! The gateway fails open. With no backend, or when the backend errors or
//! replies with something unparseable, the answer counts as correct with a
//! neutral message, so a flaky network never blocks the game.

use crate::llm_client::CompletionBackend;
use derive_getters::Getters;
use little_learners_board::{TaskCategory, TileData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Feedback when no judge is configured.
pub const UNAVAILABLE_FEEDBACK: &str = "AI unavailable. Good job!";

/// Feedback when the judge could not be reached or understood.
pub const FALLBACK_FEEDBACK: &str =
    "I couldn't check that properly, but let's assume you did great!";

/// Instruction used for tiles that carry none.
pub const DEFAULT_TASK_PROMPT: &str = "Check if the answer is correct.";

const SYSTEM_PROMPT: &str = "You are a friendly English teacher for children. \
Reply with a JSON object only.";

/// What the judge is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Tile category.
    task_category: TaskCategory,
    /// Tile description.
    task_description: String,
    /// Judge instruction, if the tile has one.
    task_prompt: Option<String>,
    /// The player's answer.
    answer_text: String,
}

impl EvaluationRequest {
    /// Builds a request for `task` and `answer`.
    pub fn new(task: &TileData, answer: impl Into<String>) -> Self {
        Self {
            task_category: *task.category(),
            task_description: task.description().clone(),
            task_prompt: task.prompt().clone(),
            answer_text: answer.into(),
        }
    }

    /// The user message sent to the judge.
    pub fn to_prompt(&self) -> String {
        format!(
            "Task Category: {}\n\
             Task Description: {}\n\
             Specific Instructions: {}\n\n\
             The student answered: \"{}\"\n\n\
             Please evaluate the answer.\n\
             Return a JSON object with:\n\
             - \"isCorrect\": boolean (true if the answer satisfies the task, false otherwise)\n\
             - \"feedback\": string (A short, encouraging sentence explaining why it's correct or how to improve. Keep it simple for kids.)",
            self.task_category,
            self.task_description,
            self.task_prompt.as_deref().unwrap_or(DEFAULT_TASK_PROMPT),
            self.answer_text,
        )
    }
}

/// The judge's answer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the answer satisfies the task.
    is_correct: bool,
    /// Short feedback for the child.
    feedback: String,
}

impl Verdict {
    /// Creates a verdict.
    pub fn new(is_correct: bool, feedback: impl Into<String>) -> Self {
        Self {
            is_correct,
            feedback: feedback.into(),
        }
    }

    /// Permissive verdict used when the judge is unavailable.
    pub fn permissive(feedback: &str) -> Self {
        Self::new(true, feedback)
    }

    /// Parses a judge reply, tolerating code fences and text around the
    /// JSON object.
    #[instrument(skip(reply), fields(len = reply.len()))]
    pub fn parse(reply: &str) -> Option<Self> {
        let start = reply.find('{')?;
        let end = reply.rfind('}')?;
        if end < start {
            return None;
        }
        match serde_json::from_str::<Verdict>(&reply[start..=end]) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                debug!(error = %e, "Judge reply is not a verdict");
                None
            }
        }
    }
}

/// The gateway. Cheap to clone; share it with background tasks.
#[derive(Clone, Default)]
pub struct TaskEvaluator {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl std::fmt::Debug for TaskEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEvaluator")
            .field("available", &self.backend.is_some())
            .finish()
    }
}

impl TaskEvaluator {
    /// Creates a gateway over `backend`.
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A gateway with no judge; every answer passes.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Creates a gateway from an optional backend.
    pub fn from_option(backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self { backend }
    }

    /// True if a judge is configured.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Judges `answer` for `task`. Never fails.
    #[instrument(skip(self, task, answer), fields(tile_id = task.id(), answer_len = answer.len()))]
    pub async fn evaluate(&self, task: &TileData, answer: &str) -> Verdict {
        self.evaluate_request(&EvaluationRequest::new(task, answer)).await
    }

    /// Judges a prepared request. Never fails.
    #[instrument(skip(self, request), fields(category = %request.task_category))]
    pub async fn evaluate_request(&self, request: &EvaluationRequest) -> Verdict {
        let Some(backend) = &self.backend else {
            debug!("No judge configured");
            return Verdict::permissive(UNAVAILABLE_FEEDBACK);
        };

        let reply = match backend.complete(SYSTEM_PROMPT, &request.to_prompt()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Judge unreachable, passing answer");
                return Verdict::permissive(FALLBACK_FEEDBACK);
            }
        };

        match Verdict::parse(&reply) {
            Some(verdict) => {
                info!(is_correct = verdict.is_correct, "Answer judged");
                verdict
            }
            None => {
                warn!(reply = %reply, "Unparseable judge reply, passing answer");
                Verdict::permissive(FALLBACK_FEEDBACK)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use little_learners_board::TileCatalog;

    #[test]
    fn test_parse_plain_json() {
        let verdict = Verdict::parse(r#"{"isCorrect": false, "feedback": "Try again!"}"#).unwrap();
        assert_eq!(verdict, Verdict::new(false, "Try again!"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"isCorrect\": true, \"feedback\": \"Great!\"}\n```";
        assert_eq!(Verdict::parse(reply), Some(Verdict::new(true, "Great!")));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Verdict::parse("no idea"), None);
        assert_eq!(Verdict::parse("} {"), None);
        assert_eq!(Verdict::parse(r#"{"correct": true}"#), None);
    }

    #[test]
    fn test_prompt_uses_default_instruction() {
        let tile = TileData::new(
            7,
            "Plain",
            "Say hello.",
            little_learners_board::TileType::Task,
            TaskCategory::Speaking,
        );
        let prompt = EvaluationRequest::new(&tile, "hello").to_prompt();
        assert!(prompt.contains(DEFAULT_TASK_PROMPT));
        assert!(prompt.contains("The student answered: \"hello\""));
    }

    #[test]
    fn test_prompt_uses_tile_instruction() {
        let catalog = TileCatalog::standard();
        let tile = catalog.get(9).unwrap();
        let prompt = EvaluationRequest::new(tile, "France").to_prompt();
        assert!(prompt.contains("Task Category: vocabulary"));
        assert!(prompt.contains("at least 5 valid countries"));
    }

    #[tokio::test]
    async fn test_unavailable_judge_passes() {
        let tile = TileCatalog::standard().get(2).cloned().unwrap();
        let verdict = TaskEvaluator::unavailable().evaluate(&tile, "I am Sam").await;
        assert_eq!(verdict, Verdict::new(true, UNAVAILABLE_FEEDBACK));
    }
}
