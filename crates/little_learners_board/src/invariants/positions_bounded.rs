//! Board bounds invariant.

use super::Invariant;
use crate::GameState;

/// Invariant: every token sits on the board.
pub struct PositionsBoundedInvariant;

impl Invariant<GameState> for PositionsBoundedInvariant {
    fn holds(state: &GameState) -> bool {
        state
            .players()
            .iter()
            .all(|p| *p.position() <= state.last_position())
    }

    fn description() -> &'static str {
        "All positions are within the board"
    }
}
