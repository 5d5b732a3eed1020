//! Winner invariant: a winner exists exactly when the game is finished.

use super::Invariant;
use crate::GameState;
use crate::phases::Lifecycle;

/// Invariant: the winner is present iff finished, stands on the final tile and
/// is the only player flagged as finished.
pub struct WinnerConsistentInvariant;

impl Invariant<GameState> for WinnerConsistentInvariant {
    fn holds(state: &GameState) -> bool {
        match state.lifecycle() {
            Lifecycle::Finished { winner } => {
                let Some(player) = state.players().get(*winner) else {
                    return false;
                };
                let flagged = state.players().iter().filter(|p| *p.is_finished()).count();
                *player.is_finished() && *player.position() == state.last_position() && flagged == 1
            }
            _ => state.winner().is_none() && state.players().iter().all(|p| !p.is_finished()),
        }
    }

    fn description() -> &'static str {
        "Winner is set exactly when the game is finished"
    }
}
