//! Contract-based validation for engine operations.
//!
//! Preconditions decide whether a request is accepted; a failed precondition
//! is an ordinary no-op reported as [`Ignored`]. Postconditions check that
//! the transition kept every invariant; they run in debug builds only.

use crate::invariants::{GameInvariants, InvariantSet, InvariantViolation};
use crate::phases::{Lifecycle, TurnPhase};
use crate::state::GameState;
use crate::transition::{Ignored, Ticket};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), Ignored>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), ContractViolation>;
}

/// A failed postcondition.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Postcondition failed: {}", _0)]
pub struct ContractViolation(pub String);

impl std::error::Error for ContractViolation {}

impl From<Vec<InvariantViolation>> for ContractViolation {
    fn from(violations: Vec<InvariantViolation>) -> Self {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self(descriptions)
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: turns are being played.
pub struct IsPlaying;

impl IsPlaying {
    /// Returns the current turn phase if playing.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<&TurnPhase, Ignored> {
        match state.lifecycle() {
            Lifecycle::Playing { turn, .. } => Ok(turn),
            Lifecycle::Setup => Err(Ignored::NotPlaying),
            Lifecycle::Finished { .. } => Err(Ignored::NotPlaying),
        }
    }
}

/// Precondition: nothing is rolling, moving or waiting on a task.
pub struct TurnIsIdle;

impl TurnIsIdle {
    /// Validates the turn is idle.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), Ignored> {
        match IsPlaying::check(state)? {
            TurnPhase::Idle => Ok(()),
            other => Err(Ignored::Busy(other.kind())),
        }
    }
}

/// Precondition: a task gate is open.
pub struct TaskIsOpen;

impl TaskIsOpen {
    /// Validates a task is pending.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), Ignored> {
        match IsPlaying::check(state)? {
            TurnPhase::TaskPending { .. } => Ok(()),
            _ => Err(Ignored::NoTaskOpen),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Postconditions
// ─────────────────────────────────────────────────────────────

/// Postcondition: within a generation, no token moves backwards and nobody
/// joins or leaves the roster mid-game.
pub struct MonotonicPositions;

impl MonotonicPositions {
    /// Checks positions between two states.
    #[instrument(skip(before, after))]
    pub fn holds(before: &GameState, after: &GameState) -> bool {
        if before.generation() != after.generation() || before.players().is_empty() {
            return true;
        }
        if before.players().len() != after.players().len() {
            warn!(
                before = before.players().len(),
                after = after.players().len(),
                "Roster changed mid-game"
            );
            return false;
        }
        let valid = before
            .players()
            .iter()
            .zip(after.players())
            .all(|(b, a)| a.position() >= b.position());
        if !valid {
            warn!("Token moved backwards");
        }
        valid
    }
}

fn post_common(before: &GameState, after: &GameState) -> Result<(), ContractViolation> {
    GameInvariants::check_all(after)?;
    if !MonotonicPositions::holds(before, after) {
        return Err(ContractViolation(
            "Positions are non-decreasing within a game".to_string(),
        ));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
//  Operation Contracts
// ─────────────────────────────────────────────────────────────

/// A roll request.
#[derive(Debug, Clone, Copy)]
pub struct RollRequest;

/// A request to close the task gate.
#[derive(Debug, Clone, Copy)]
pub struct CompleteTaskRequest;

/// Contract for rolling.
///
/// Preconditions:
/// - game is playing
/// - turn is idle (no roll, move or task in progress)
///
/// Postconditions:
/// - all invariants hold, positions unchanged or ahead
pub struct RollContract;

impl Contract<GameState, RollRequest> for RollContract {
    fn pre(state: &GameState, _action: &RollRequest) -> Result<(), Ignored> {
        TurnIsIdle::check(state)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), ContractViolation> {
        post_common(before, after)?;
        if !after.is_rolling() {
            return Err(ContractViolation("Roll did not start rolling".to_string()));
        }
        Ok(())
    }
}

/// Contract for completing a task.
///
/// Preconditions:
/// - game is playing with a task gate open
///
/// Postconditions:
/// - gate closed, turn idle
/// - current index advanced by exactly one modulo roster size
pub struct CompleteTaskContract;

impl Contract<GameState, CompleteTaskRequest> for CompleteTaskContract {
    fn pre(state: &GameState, _action: &CompleteTaskRequest) -> Result<(), Ignored> {
        TaskIsOpen::check(state)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), ContractViolation> {
        post_common(before, after)?;
        if after.show_task_modal() || !after.can_roll() {
            return Err(ContractViolation("Task gate still open".to_string()));
        }
        let count = after.players().len();
        let expected = before.current_player_index().map(|i| (i + 1) % count);
        if after.current_player_index() != expected {
            return Err(ContractViolation(format!(
                "Turn passed to {:?}, expected {:?}",
                after.current_player_index(),
                expected
            )));
        }
        Ok(())
    }
}

/// Contract for timer continuations. The ticket check lives in the engine;
/// only postconditions apply here.
pub struct StepContract;

impl Contract<GameState, Ticket> for StepContract {
    fn pre(_state: &GameState, _action: &Ticket) -> Result<(), Ignored> {
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), ContractViolation> {
        post_common(before, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::PhaseKind;
    use crate::{Player, PlayerColor, TileCatalog};

    fn playing(turn: TurnPhase) -> GameState {
        let mut state = GameState::default();
        state.players = vec![
            Player::new(0, "Ana", PlayerColor::Red, "user").placed_at(1),
            Player::new(1, "Ben", PlayerColor::Blue, "bot"),
        ];
        state.lifecycle = Lifecycle::Playing { current: 0, turn };
        state
    }

    #[test]
    fn test_roll_requires_playing() {
        assert_eq!(
            RollContract::pre(&GameState::default(), &RollRequest),
            Err(Ignored::NotPlaying)
        );
    }

    #[test]
    fn test_roll_requires_idle() {
        assert!(RollContract::pre(&playing(TurnPhase::Idle), &RollRequest).is_ok());
        assert_eq!(
            RollContract::pre(&playing(TurnPhase::Rolling), &RollRequest),
            Err(Ignored::Busy(PhaseKind::Rolling))
        );
    }

    #[test]
    fn test_complete_requires_open_task() {
        let tile = TileCatalog::standard().get(2).cloned().unwrap();
        assert!(CompleteTaskContract::pre(&playing(TurnPhase::TaskPending { tile }), &CompleteTaskRequest).is_ok());
        assert_eq!(
            CompleteTaskContract::pre(&playing(TurnPhase::Idle), &CompleteTaskRequest),
            Err(Ignored::NoTaskOpen)
        );
    }

    #[test]
    fn test_backwards_move_fails_post() {
        let before = playing(TurnPhase::Idle);
        let mut after = before.clone();
        after.players[0].step_to(0);
        assert!(!MonotonicPositions::holds(&before, &after));
        assert!(StepContract::post(&before, &after).is_err());
    }

    #[test]
    fn test_reset_is_exempt_from_monotonic_check() {
        let before = playing(TurnPhase::Idle);
        let mut after = before.clone();
        after.generation = after.generation.next();
        after.players[0].step_to(0);
        assert!(MonotonicPositions::holds(&before, &after));
    }

    #[test]
    fn test_complete_post_checks_rotation() {
        let tile = TileCatalog::standard().get(2).cloned().unwrap();
        let before = playing(TurnPhase::TaskPending { tile });
        let mut after = before.clone();
        after.lifecycle = Lifecycle::Playing {
            current: 0,
            turn: TurnPhase::Idle,
        };
        assert!(CompleteTaskContract::post(&before, &after).is_err());
        after.lifecycle = Lifecycle::Playing {
            current: 1,
            turn: TurnPhase::Idle,
        };
        assert!(CompleteTaskContract::post(&before, &after).is_ok());
    }
}
