//! Turn phase consistency invariant.

use super::Invariant;
use crate::GameState;
use crate::phases::TurnPhase;

/// Invariant: the turn phase agrees with the rest of the state.
///
/// - at most one of rolling / moving / task modal is observable
/// - every phase after the roll has a committed die value
/// - a move target lies ahead of the mover and on the board
/// - landing and task phases refer to the mover's own tile
pub struct PhaseConsistentInvariant;

impl Invariant<GameState> for PhaseConsistentInvariant {
    fn holds(state: &GameState) -> bool {
        let flags = [state.is_rolling(), state.is_moving(), state.show_task_modal()];
        if flags.iter().filter(|f| **f).count() > 1 {
            return false;
        }

        let (Some(turn), Some(mover)) = (state.turn(), state.current_player()) else {
            return true;
        };
        let position = *mover.position();

        match turn {
            TurnPhase::Idle | TurnPhase::Rolling => true,
            TurnPhase::Rolled { value } => state.dice_value() == Some(*value),
            TurnPhase::Moving { target } => {
                state.dice_value().is_some() && position <= *target && *target <= state.last_position()
            }
            TurnPhase::Landed { position: landed } => {
                state.dice_value().is_some() && *landed == position
            }
            TurnPhase::TaskPending { tile } => tile.is_task() && tile.position() == position,
        }
    }

    fn description() -> &'static str {
        "Turn phase is consistent with die value and mover position"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::Lifecycle;
    use crate::{DieFace, Player, PlayerColor, TileCatalog};

    fn state_with(turn: TurnPhase, position: usize, dice: Option<u8>) -> GameState {
        let mut state = GameState::default();
        state.players = vec![Player::new(0, "Ana", PlayerColor::Red, "user").placed_at(position)];
        state.dice_value = dice.and_then(DieFace::new);
        state.lifecycle = Lifecycle::Playing { current: 0, turn };
        state
    }

    #[test]
    fn test_moving_with_roll_holds() {
        let state = state_with(TurnPhase::Moving { target: 6 }, 2, Some(4));
        assert!(PhaseConsistentInvariant::holds(&state));
    }

    #[test]
    fn test_moving_without_roll_violates() {
        let state = state_with(TurnPhase::Moving { target: 6 }, 2, None);
        assert!(!PhaseConsistentInvariant::holds(&state));
    }

    #[test]
    fn test_target_behind_mover_violates() {
        let state = state_with(TurnPhase::Moving { target: 1 }, 2, Some(4));
        assert!(!PhaseConsistentInvariant::holds(&state));
    }

    #[test]
    fn test_task_on_other_tile_violates() {
        let tile = TileCatalog::standard().get(5).cloned().unwrap();
        assert!(PhaseConsistentInvariant::holds(&state_with(
            TurnPhase::TaskPending { tile: tile.clone() },
            4,
            Some(4)
        )));
        assert!(!PhaseConsistentInvariant::holds(&state_with(
            TurnPhase::TaskPending { tile },
            3,
            Some(3)
        )));
    }
}
