//! Current player index invariant.

use super::Invariant;
use crate::GameState;

/// Invariant: while playing, the current index points into the roster.
pub struct CurrentIndexInvariant;

impl Invariant<GameState> for CurrentIndexInvariant {
    fn holds(state: &GameState) -> bool {
        match state.current_player_index() {
            Some(index) => index < state.players().len(),
            None => true,
        }
    }

    fn description() -> &'static str {
        "Current player index is valid while playing"
    }
}
