//! The authoritative game state aggregate.

use crate::dice::DieFace;
use crate::phases::{GameStatus, Generation, Lifecycle, TurnPhase};
use crate::types::{Player, TileData};
use serde::{Deserialize, Serialize};

/// Complete game state. Presentation reads snapshots of this; only the
/// engine writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) generation: Generation,
    pub(crate) last_position: usize,
    pub(crate) players: Vec<Player>,
    pub(crate) dice_value: Option<DieFace>,
    pub(crate) lifecycle: Lifecycle,
}

impl GameState {
    pub(crate) fn fresh(generation: Generation, last_position: usize) -> Self {
        Self {
            generation,
            last_position,
            players: Vec::new(),
            dice_value: None,
            lifecycle: Lifecycle::Setup,
        }
    }

    /// Reset counter this state belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Index of the final tile.
    pub fn last_position(&self) -> usize {
        self.last_position
    }

    /// Roster in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Last committed roll.
    pub fn dice_value(&self) -> Option<DieFace> {
        self.dice_value
    }

    /// Lifecycle value.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Coarse status.
    pub fn status(&self) -> GameStatus {
        self.lifecycle.status()
    }

    /// Index of the player to move, while playing.
    pub fn current_player_index(&self) -> Option<usize> {
        match self.lifecycle {
            Lifecycle::Playing { current, .. } => Some(current),
            _ => None,
        }
    }

    /// The player to move, while playing.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index().and_then(|i| self.players.get(i))
    }

    /// Turn phase, while playing.
    pub fn turn(&self) -> Option<&TurnPhase> {
        match &self.lifecycle {
            Lifecycle::Playing { turn, .. } => Some(turn),
            _ => None,
        }
    }

    /// The winner, once finished.
    pub fn winner(&self) -> Option<&Player> {
        match self.lifecycle {
            Lifecycle::Finished { winner } => self.players.get(winner),
            _ => None,
        }
    }

    /// Die is tumbling.
    pub fn is_rolling(&self) -> bool {
        matches!(self.turn(), Some(TurnPhase::Rolling))
    }

    /// Token is moving or settling on its final tile.
    pub fn is_moving(&self) -> bool {
        matches!(
            self.turn(),
            Some(TurnPhase::Moving { .. } | TurnPhase::Landed { .. })
        )
    }

    /// Task gate is open.
    pub fn show_task_modal(&self) -> bool {
        self.current_task().is_some()
    }

    /// The open task, if any.
    pub fn current_task(&self) -> Option<&TileData> {
        match self.turn() {
            Some(TurnPhase::TaskPending { tile }) => Some(tile),
            _ => None,
        }
    }

    /// A roll would be accepted right now.
    pub fn can_roll(&self) -> bool {
        matches!(self.turn(), Some(TurnPhase::Idle))
    }

    /// Players standing on a position.
    pub fn players_at(&self, position: usize) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(move |p| *p.position() == position)
    }

    pub(crate) fn set_turn(&mut self, phase: TurnPhase) {
        if let Lifecycle::Playing { turn, .. } = &mut self.lifecycle {
            *turn = phase;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::fresh(Generation::default(), crate::BOARD_SIZE - 1)
    }
}
