//! Lifecycle and per-turn phase values.
//!
//! A single tagged value replaces the rolling/moving/modal flags, so at most
//! one of them can ever be observed as set.

use crate::dice::DieFace;
use crate::types::TileData;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Reset counter. Continuations and evaluation results scheduled against an
/// older generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Numeric value.
    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Coarse game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Waiting for a roster.
    Setup,
    /// Turns in progress.
    Playing,
    /// Someone won.
    Finished,
}

/// Where the current turn stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    /// Waiting for a roll.
    Idle,
    /// Die tumbling; result not yet committed.
    Rolling,
    /// Result shown; movement starts after the settle pause.
    Rolled {
        /// Committed face.
        value: DieFace,
    },
    /// Token advancing one tile per step.
    Moving {
        /// Clamped destination.
        target: usize,
    },
    /// Token arrived; short pause before the landing resolves.
    Landed {
        /// Final position.
        position: usize,
    },
    /// Task gate open until the task is completed.
    TaskPending {
        /// The tile landed on.
        tile: TileData,
    },
}

impl TurnPhase {
    /// Fieldless kind, for logs and rejection reasons.
    pub fn kind(&self) -> PhaseKind {
        match self {
            TurnPhase::Idle => PhaseKind::Idle,
            TurnPhase::Rolling => PhaseKind::Rolling,
            TurnPhase::Rolled { .. } => PhaseKind::Rolled,
            TurnPhase::Moving { .. } => PhaseKind::Moving,
            TurnPhase::Landed { .. } => PhaseKind::Landed,
            TurnPhase::TaskPending { .. } => PhaseKind::TaskPending,
        }
    }
}

/// Fieldless mirror of [`TurnPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PhaseKind {
    /// See [`TurnPhase::Idle`].
    Idle,
    /// See [`TurnPhase::Rolling`].
    Rolling,
    /// See [`TurnPhase::Rolled`].
    Rolled,
    /// See [`TurnPhase::Moving`].
    Moving,
    /// See [`TurnPhase::Landed`].
    Landed,
    /// See [`TurnPhase::TaskPending`].
    TaskPending,
}

/// Game lifecycle; the turn phase only exists while playing and the winner
/// only once finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Lifecycle {
    /// No roster yet.
    Setup,
    /// Turns in progress.
    Playing {
        /// Index of the player whose turn it is.
        current: usize,
        /// Progress of that turn.
        turn: TurnPhase,
    },
    /// Terminal until reset.
    Finished {
        /// Index of the winning player.
        winner: usize,
    },
}

impl Lifecycle {
    /// Coarse status.
    pub fn status(&self) -> GameStatus {
        match self {
            Lifecycle::Setup => GameStatus::Setup,
            Lifecycle::Playing { .. } => GameStatus::Playing,
            Lifecycle::Finished { .. } => GameStatus::Finished,
        }
    }
}
