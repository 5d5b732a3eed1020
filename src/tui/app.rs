//! Application state for the terminal frontend.

use super::input::{Action, Screen};
use crate::driver::DriverHandle;
use crate::evaluation::{TaskEvaluator, Verdict};
use crate::review::{ReviewId, TaskReview, VoiceInput, VoiceUnavailable};
use crate::speech::{PcmAudio, SpeechSynthesizer};
use little_learners_board::{
    BoardLayout, Effect, GameState, GameStatus, Player, SoundCue, TileCatalog,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Results of background work, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The judge replied.
    Verdict {
        /// Review that asked.
        review_id: ReviewId,
        /// The reply.
        verdict: Verdict,
    },
    /// Voice capture finished.
    Transcript {
        /// Review the capture was started for.
        review_id: ReviewId,
        /// Transcript or why there is none.
        result: Result<String, VoiceUnavailable>,
    },
    /// Pronunciation audio prefetch finished.
    Speech {
        /// Tile the words belong to.
        tile_id: u32,
        /// The audio, if synthesis worked.
        audio: Option<PcmAudio>,
    },
    /// A background illustration batch finished.
    Illustrations(BTreeMap<u32, String>),
}

/// Whether the loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Leave.
    Quit,
}

/// Main application state.
pub struct App {
    handle: DriverHandle,
    catalog: TileCatalog,
    layout: BoardLayout,
    roster: Vec<Player>,
    state: GameState,
    review: Option<TaskReview>,
    illustrations: BTreeMap<u32, String>,
    pronunciation: Option<(u32, PcmAudio)>,
    evaluator: TaskEvaluator,
    speech: SpeechSynthesizer,
    voice: Arc<dyn VoiceInput>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    effects_rx: mpsc::UnboundedReceiver<Effect>,
    status_message: String,
    last_cue: Option<SoundCue>,
}

impl App {
    /// Creates the app for a prepared roster.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        handle: DriverHandle,
        catalog: TileCatalog,
        roster: Vec<Player>,
        illustrations: BTreeMap<u32, String>,
        evaluator: TaskEvaluator,
        speech: SpeechSynthesizer,
        voice: Arc<dyn VoiceInput>,
        effects_rx: mpsc::UnboundedReceiver<Effect>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = handle.snapshot();
        let status_message = if evaluator.is_available() {
            "Press Enter to start.".to_string()
        } else {
            "Press Enter to start. (AI judge unavailable; the teacher decides.)".to_string()
        };
        Self {
            handle,
            catalog,
            layout: BoardLayout::standard(),
            roster,
            state,
            review: None,
            illustrations,
            pronunciation: None,
            evaluator,
            speech,
            voice,
            events_tx,
            events_rx,
            effects_rx,
            status_message,
            last_cue: None,
        }
    }

    /// Sender for background work started outside the app.
    pub fn events(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.events_tx.clone()
    }

    /// Latest game snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The board.
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Grid placement.
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Roster used for the next start.
    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    /// The open review, if a task gate is open.
    pub fn review(&self) -> Option<&TaskReview> {
        self.review.as_ref()
    }

    /// True if tile `id` has a cached illustration.
    pub fn is_illustrated(&self, id: u32) -> bool {
        self.illustrations.contains_key(&id)
    }

    /// Pronunciation audio ready for the open tile.
    pub fn pronunciation_audio(&self) -> Option<&PcmAudio> {
        match (&self.pronunciation, &self.review) {
            (Some((id, audio)), Some(review)) if id == review.tile().id() => Some(audio),
            _ => None,
        }
    }

    /// Status line.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Most recent sound cue, shown as a note in the header.
    pub fn last_cue(&self) -> Option<SoundCue> {
        self.last_cue
    }

    /// Screen for key bindings.
    pub fn screen(&self) -> Screen {
        match self.state.status() {
            GameStatus::Setup => Screen::Setup,
            GameStatus::Finished => Screen::Finished,
            GameStatus::Playing if self.review.is_some() => Screen::Task,
            GameStatus::Playing => Screen::Board,
        }
    }

    /// Pulls the latest snapshot and finished background work.
    #[instrument(skip(self))]
    pub fn pump(&mut self) {
        while let Ok(effect) = self.effects_rx.try_recv() {
            match effect {
                Effect::Sound(cue) => self.last_cue = Some(cue),
                Effect::Celebrate { player_id } => {
                    if let Some(p) = self.state.players().iter().find(|p| *p.id() == player_id) {
                        self.status_message = format!("🎉 {} wins! Press n for a new game.", p.name());
                    }
                }
            }
        }

        let previous_status = self.state.status();
        self.state = self.handle.snapshot();
        self.sync_review();
        if previous_status != GameStatus::Finished && self.state.status() == GameStatus::Finished {
            if let Some(winner) = self.state.winner() {
                self.status_message = format!("🎉 {} wins! Press n for a new game.", winner.name());
            }
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn sync_review(&mut self) {
        let generation = self.state.generation();
        let Some(tile) = self.state.current_task().cloned() else {
            if self.review.take().is_some() {
                debug!("Task gate closed");
            }
            return;
        };
        let stale = self
            .review
            .as_ref()
            .map(|r| r.generation() != generation || r.tile().id() != tile.id())
            .unwrap_or(true);
        if !stale {
            return;
        }

        info!(tile_id = *tile.id(), "Task opened");
        let review = TaskReview::new(generation, tile);
        if let Some(text) = review.pronunciation_text() {
            self.prefetch_speech(*review.tile().id(), text);
        }
        self.status_message = match self.state.current_player() {
            Some(p) => format!("{}: {}", p.name(), review.tile().title()),
            None => review.tile().title().clone(),
        };
        self.review = Some(review);
    }

    fn prefetch_speech(&self, tile_id: u32, text: String) {
        if !self.speech.is_available() {
            return;
        }
        let speech = self.speech.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let audio = speech.synthesize(&text).await;
            let _ = tx.send(AppEvent::Speech { tile_id, audio });
        });
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Verdict { review_id, verdict } => {
                let Some(review) = self.review.as_mut() else {
                    debug!(%review_id, "Verdict arrived with no task open");
                    return;
                };
                if review.receive_verdict(review_id, verdict) {
                    self.status_message = "The AI has replied. Teacher: F2 approve, F3 try again.".to_string();
                }
            }
            AppEvent::Transcript { review_id, result } => {
                let Some(review) = self.review.as_mut() else {
                    return;
                };
                if review.id() != review_id {
                    debug!(%review_id, "Transcript for an abandoned task dropped");
                    return;
                }
                match result {
                    Ok(text) => {
                        review.append_transcript(&text);
                    }
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            AppEvent::Speech { tile_id, audio } => match audio {
                Some(audio) => {
                    self.status_message = format!(
                        "Pronunciation audio ready ({:.1}s).",
                        audio.duration().as_secs_f32()
                    );
                    self.pronunciation = Some((tile_id, audio));
                }
                None => debug!(tile_id, "No pronunciation audio"),
            },
            AppEvent::Illustrations(images) => {
                info!(count = images.len(), "Illustrations ready");
                self.illustrations.extend(images);
            }
        }
    }

    /// Applies a key action.
    #[instrument(skip(self))]
    pub fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::NewGame => {
                self.handle.reset();
                self.pronunciation = None;
                self.status_message = "New game. Press Enter to start.".to_string();
            }
            Action::Start => {
                self.handle.start(self.roster.clone());
                self.status_message = "Roll the die! (r)".to_string();
            }
            Action::Roll => {
                self.handle.roll();
            }
            Action::Type(c) => {
                if let Some(review) = self.review.as_mut() {
                    review.push_str(c.encode_utf8(&mut [0; 4]));
                }
            }
            Action::Backspace => {
                if let Some(review) = self.review.as_mut() {
                    review.backspace();
                }
            }
            Action::Submit => self.submit(),
            Action::Listen => self.listen(),
            Action::Approve | Action::Reject => {
                if let Some(review) = self.review.as_mut() {
                    if let Some(cue) = review.teacher_verdict(action == Action::Approve) {
                        self.last_cue = Some(cue);
                        self.status_message = if review.is_approved() {
                            "Great job! Press F5 to continue.".to_string()
                        } else {
                            "Not quite. Try again!".to_string()
                        };
                    }
                }
            }
            Action::Continue => {
                if self.review.as_ref().is_some_and(TaskReview::is_approved) {
                    self.handle.complete_task();
                    self.status_message = "Next player! Roll the die. (r)".to_string();
                }
            }
            Action::None => {}
        }
        Flow::Continue
    }

    fn submit(&mut self) {
        let Some(review) = self.review.as_mut() else {
            return;
        };
        let Some(request) = review.submit() else {
            self.status_message = "Type an answer first.".to_string();
            return;
        };
        let review_id = review.id();
        let evaluator = self.evaluator.clone();
        let tx = self.events_tx.clone();
        self.status_message = "The AI is checking...".to_string();
        tokio::spawn(async move {
            let verdict = evaluator.evaluate_request(&request).await;
            let _ = tx.send(AppEvent::Verdict { review_id, verdict });
        });
    }

    fn listen(&mut self) {
        let Some(review) = self.review.as_ref() else {
            return;
        };
        if !review.is_editable() {
            return;
        }
        self.last_cue = Some(SoundCue::UiHover);
        let review_id = review.id();
        let voice = Arc::clone(&self.voice);
        let tx = self.events_tx.clone();
        self.status_message = "Listening...".to_string();
        tokio::spawn(async move {
            let result = voice.listen().await;
            let _ = tx.send(AppEvent::Transcript { review_id, result });
        });
    }
}
