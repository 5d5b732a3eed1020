//! What an engine operation produced: side effects to fire and at most one
//! timed continuation to schedule.

use crate::phases::{Generation, PhaseKind};
use crate::sound::SoundCue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one scheduled continuation. Only the most recently issued
/// ticket of the current generation is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    /// Generation the continuation was scheduled against.
    pub generation: Generation,
    /// Issue order within the engine.
    pub sequence: u64,
}

/// The work a continuation performs when its timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Draw and commit the roll.
    CommitRoll,
    /// Settle pause over; start moving.
    BeginMove,
    /// Advance the token one tile.
    Advance,
    /// Landing pause over; resolve the tile.
    Land,
}

/// A timed continuation the caller must schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    /// Pass back to [`crate::TurnEngine::fire`] on expiry.
    pub ticket: Ticket,
    /// Delay before firing.
    pub delay: Duration,
    /// What will happen.
    pub step: Step,
}

/// Fire-and-forget side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Play a sound cue.
    Sound(SoundCue),
    /// Celebrate a winner (confetti).
    Celebrate {
        /// Winning player's id.
        player_id: u32,
    },
}

/// Why a request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Ignored {
    /// Game is not in the playing state.
    #[display("game is not being played")]
    NotPlaying,
    /// A roster was already supplied.
    #[display("game already started")]
    AlreadyStarted,
    /// Another phase is in progress.
    #[display("busy: {}", _0)]
    Busy(PhaseKind),
    /// No task gate is open.
    #[display("no task is open")]
    NoTaskOpen,
    /// The ticket is not the outstanding one.
    #[display("stale continuation")]
    StaleTicket,
}

/// Result of one engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Side effects in emission order.
    pub effects: Vec<Effect>,
    /// Continuation to schedule, if any.
    pub scheduled: Option<Continuation>,
    /// Set when the request was a no-op.
    pub ignored: Option<Ignored>,
}

impl Transition {
    pub(crate) fn ignored(reason: Ignored) -> Self {
        Self {
            ignored: Some(reason),
            ..Self::default()
        }
    }

    pub(crate) fn sound(mut self, cue: SoundCue) -> Self {
        self.effects.push(Effect::Sound(cue));
        self
    }

    pub(crate) fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub(crate) fn then(mut self, continuation: Continuation) -> Self {
        self.scheduled = Some(continuation);
        self
    }

    /// True if the request changed state.
    pub fn applied(&self) -> bool {
        self.ignored.is_none()
    }

    /// Sound cues among the effects.
    pub fn sounds(&self) -> impl Iterator<Item = SoundCue> + '_ {
        self.effects.iter().filter_map(|e| match e {
            Effect::Sound(cue) => Some(*cue),
            _ => None,
        })
    }
}
