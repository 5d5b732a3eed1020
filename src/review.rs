//! The task-resolution flow shown while a task gate is open.
//!
//! A review collects the player's answer, optionally asks the AI judge for
//! feedback, and ends with the teacher's verdict. Only an approved review
//! lets the game move on; the engine never learns which path approved it.

use crate::evaluation::{EvaluationRequest, Verdict};
use async_trait::async_trait;
use derive_more::{Display, Error};
use little_learners_board::{Generation, SoundCue, TileData};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

static NEXT_REVIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one review. Never reused within a process, so a late reply
/// cannot reach a later review of the same tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("review-{}", _0)]
pub struct ReviewId(u64);

impl ReviewId {
    fn next() -> Self {
        Self(NEXT_REVIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a review stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
    /// Waiting for an answer.
    Idle,
    /// Judge is thinking.
    Checking,
    /// Judge has replied.
    Reviewed,
    /// Teacher approved. Final.
    Correct,
    /// Teacher asked for another try.
    Incorrect,
}

/// Review of one task gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReview {
    id: ReviewId,
    generation: Generation,
    tile: TileData,
    answer: String,
    status: ReviewStatus,
    verdict: Option<Verdict>,
}

impl TaskReview {
    /// Starts a review of `tile` for the game generation it was opened in.
    #[instrument(skip(tile), fields(tile_id = tile.id()))]
    pub fn new(generation: Generation, tile: TileData) -> Self {
        let id = ReviewId::next();
        debug!(%id, "Review opened");
        Self {
            id,
            generation,
            tile,
            answer: String::new(),
            status: ReviewStatus::Idle,
            verdict: None,
        }
    }

    /// This review's identity.
    pub fn id(&self) -> ReviewId {
        self.id
    }

    /// The tile under review.
    pub fn tile(&self) -> &TileData {
        &self.tile
    }

    /// Game generation the review belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current answer text.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Current status.
    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    /// Latest judge verdict, if any.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// The answer can be edited.
    pub fn is_editable(&self) -> bool {
        !matches!(self.status, ReviewStatus::Checking | ReviewStatus::Correct)
    }

    /// The answer can be sent to the judge.
    pub fn can_submit(&self) -> bool {
        self.is_editable() && !self.answer.trim().is_empty()
    }

    /// The teacher approved; the turn may pass.
    pub fn is_approved(&self) -> bool {
        self.status == ReviewStatus::Correct
    }

    /// Replaces the answer. Returns false when editing is locked.
    pub fn set_answer(&mut self, text: impl Into<String>) -> bool {
        if !self.is_editable() {
            return false;
        }
        self.answer = text.into();
        true
    }

    /// Appends typed characters.
    pub fn push_str(&mut self, text: &str) -> bool {
        if !self.is_editable() {
            return false;
        }
        self.answer.push_str(text);
        true
    }

    /// Removes the last character.
    pub fn backspace(&mut self) -> bool {
        if !self.is_editable() {
            return false;
        }
        self.answer.pop().is_some()
    }

    /// Appends a speech transcript, separated from existing text by a single
    /// space.
    #[instrument(skip(self, transcript), fields(len = transcript.len()))]
    pub fn append_transcript(&mut self, transcript: &str) -> bool {
        let transcript = transcript.trim();
        if transcript.is_empty() || !self.is_editable() {
            return false;
        }
        if !self.answer.is_empty() && !self.answer.ends_with(' ') {
            self.answer.push(' ');
        }
        self.answer.push_str(transcript);
        true
    }

    /// Sends the answer for judging. Returns the request to evaluate, or
    /// `None` if the answer is blank or locked.
    #[instrument(skip(self), fields(tile_id = self.tile.id(), status = %self.status))]
    pub fn submit(&mut self) -> Option<EvaluationRequest> {
        if !self.can_submit() {
            debug!("Nothing to submit");
            return None;
        }
        self.status = ReviewStatus::Checking;
        info!("Answer sent to judge");
        Some(EvaluationRequest::new(&self.tile, self.answer.trim()))
    }

    /// Applies a judge verdict. Ignored unless it was requested by this
    /// review and the review is still checking.
    #[instrument(skip(self, verdict), fields(id = %self.id, status = %self.status))]
    pub fn receive_verdict(&mut self, review_id: ReviewId, verdict: Verdict) -> bool {
        if review_id != self.id {
            warn!(%review_id, "Verdict for an abandoned task dropped");
            return false;
        }
        if self.status != ReviewStatus::Checking {
            debug!("Verdict arrived outside checking, dropped");
            return false;
        }
        info!(is_correct = verdict.is_correct(), "Judge replied");
        self.verdict = Some(verdict);
        self.status = ReviewStatus::Reviewed;
        true
    }

    /// The teacher's decision. Authoritative over the judge, allowed in any
    /// status except after approval. Returns the cue to play.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn teacher_verdict(&mut self, approved: bool) -> Option<SoundCue> {
        if self.status == ReviewStatus::Correct {
            return None;
        }
        if approved {
            self.status = ReviewStatus::Correct;
            info!("Teacher approved");
            Some(SoundCue::Correct)
        } else {
            self.status = ReviewStatus::Incorrect;
            info!("Teacher asked for another try");
            Some(SoundCue::Incorrect)
        }
    }

    /// Text to pre-synthesize for pronunciation tiles.
    pub fn pronunciation_text(&self) -> Option<String> {
        self.tile
            .is_pronunciation()
            .then(|| self.tile.content().join(". "))
    }
}

/// Voice capture is not possible here.
#[derive(Debug, Clone, Display, Error)]
#[display("Voice input is not available: {}", reason)]
pub struct VoiceUnavailable {
    /// Why.
    pub reason: String,
}

/// Speech capture that yields transcribed text for the answer field.
#[async_trait]
pub trait VoiceInput: Send + Sync {
    /// Listens once and returns the transcript.
    async fn listen(&self) -> Result<String, VoiceUnavailable>;
}

/// The capture backend for environments with no microphone support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVoiceInput;

#[async_trait]
impl VoiceInput for NoVoiceInput {
    async fn listen(&self) -> Result<String, VoiceUnavailable> {
        Err(VoiceUnavailable {
            reason: "this terminal has no speech recognition".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use little_learners_board::TileCatalog;

    fn review(id: u32) -> TaskReview {
        TaskReview::new(Generation::default(), TileCatalog::standard().get(id).cloned().unwrap())
    }

    #[test]
    fn test_blank_answer_cannot_submit() {
        let mut r = review(2);
        assert!(r.submit().is_none());
        r.set_answer("   ");
        assert!(r.submit().is_none());
        assert_eq!(r.status(), ReviewStatus::Idle);
    }

    #[test]
    fn test_checking_locks_editing() {
        let mut r = review(2);
        r.set_answer("I am Sam, 8, Algiers");
        assert!(r.submit().is_some());
        assert_eq!(r.status(), ReviewStatus::Checking);
        assert!(!r.set_answer("changed"));
        assert!(!r.push_str("x"));
        assert_eq!(r.answer(), "I am Sam, 8, Algiers");
    }

    #[test]
    fn test_verdict_moves_to_reviewed() {
        let mut r = review(2);
        r.set_answer("hello");
        r.submit();
        assert!(r.receive_verdict(r.id(), Verdict::new(false, "Add your age.")));
        assert_eq!(r.status(), ReviewStatus::Reviewed);
        assert_eq!(r.verdict().map(|v| *v.is_correct()), Some(false));
        assert!(r.set_answer("hello, I am 8"));
    }

    #[test]
    fn test_stale_verdicts_dropped() {
        let other = review(3);
        let mut r = review(2);
        r.set_answer("hello");
        r.submit();
        assert!(!r.receive_verdict(other.id(), Verdict::new(true, "ok")));
        assert_eq!(r.status(), ReviewStatus::Checking);
        assert!(r.verdict().is_none());
    }

    #[test]
    fn test_late_verdict_skips_next_review_of_same_tile() {
        // Ana answers, the teacher approves before the judge replies
        let mut first = review(2);
        first.set_answer("I am Ana");
        first.submit();
        first.teacher_verdict(true);

        // Later in the same game Ben lands on the same tile
        let mut second = review(2);
        assert_eq!(second.generation(), first.generation());
        assert_ne!(second.id(), first.id());
        second.set_answer("I am Ben");
        second.submit();

        let applied = second.receive_verdict(first.id(), Verdict::new(true, "Great intro, Ana!"));
        assert!(!applied);
        assert_eq!(second.status(), ReviewStatus::Checking);
        assert!(second.verdict().is_none());

        assert!(second.receive_verdict(second.id(), Verdict::new(true, "Great intro, Ben!")));
        assert_eq!(second.verdict().map(|v| v.feedback().as_str()), Some("Great intro, Ben!"));
    }

    #[test]
    fn test_teacher_overrides_judge() {
        let mut r = review(8);
        r.set_answer("my sister is a docter");
        r.submit();
        r.receive_verdict(r.id(), Verdict::new(false, "Check spelling."));
        assert_eq!(r.teacher_verdict(true), Some(SoundCue::Correct));
        assert!(r.is_approved());
        assert_eq!(r.teacher_verdict(false), None);
        assert!(!r.set_answer("anything"));
    }

    #[test]
    fn test_teacher_rejection_allows_retry() {
        let mut r = review(9);
        r.set_answer("France");
        assert_eq!(r.teacher_verdict(false), Some(SoundCue::Incorrect));
        assert_eq!(r.status(), ReviewStatus::Incorrect);
        assert!(r.push_str(", Spain"));
        assert!(r.submit().is_some());
    }

    #[test]
    fn test_transcript_appends_with_single_space() {
        let mut r = review(3);
        r.append_transcript("one two");
        r.append_transcript(" three ");
        assert_eq!(r.answer(), "one two three");
        r.set_answer("four ");
        r.append_transcript("five");
        assert_eq!(r.answer(), "four five");
    }

    #[test]
    fn test_pronunciation_text() {
        assert_eq!(review(18).pronunciation_text().as_deref(), Some("The. Mother. Brother. There"));
        assert_eq!(review(2).pronunciation_text(), None);
    }

    #[tokio::test]
    async fn test_no_voice_input_reports_unavailable() {
        let err = NoVoiceInput.listen().await.unwrap_err();
        assert!(err.to_string().contains("not available"));
    }
}
