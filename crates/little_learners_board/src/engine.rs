//! The turn engine: dice, movement, landing, task gate and turn rotation.
//!
//! The engine never sleeps. Every timed phase returns a [`Continuation`] the
//! caller schedules; when the timer expires the caller hands the ticket back
//! to [`TurnEngine::fire`]. Only the single outstanding ticket is honored, so
//! a reset (or anything else that supersedes the chain) turns every older
//! timer into a no-op.

use crate::catalog::TileCatalog;
use crate::contracts::{CompleteTaskContract, CompleteTaskRequest, Contract, RollContract, RollRequest, StepContract};
use crate::dice::Dice;
use crate::phases::{Generation, Lifecycle, TurnPhase};
use crate::sound::SoundCue;
use crate::state::GameState;
use crate::transition::{Continuation, Effect, Ignored, Step, Ticket, Transition};
use crate::types::Player;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Delays between the timed phases of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Pacing {
    /// Die tumbling before the result is committed.
    roll: Duration,
    /// Result on screen before the token starts moving.
    settle: Duration,
    /// Time per single-tile step.
    step: Duration,
    /// Pause on the final tile before the landing resolves.
    land: Duration,
}

impl Pacing {
    /// Creates a pacing table.
    pub fn new(roll: Duration, settle: Duration, step: Duration, land: Duration) -> Self {
        Self {
            roll,
            settle,
            step,
            land,
        }
    }

    /// Same as [`Self::new`], in milliseconds.
    pub fn from_millis(roll: u64, settle: u64, step: u64, land: u64) -> Self {
        Self::new(
            Duration::from_millis(roll),
            Duration::from_millis(settle),
            Duration::from_millis(step),
            Duration::from_millis(land),
        )
    }

    /// All delays zero. Continuations are still issued in order.
    pub fn instant() -> Self {
        Self::from_millis(0, 0, 0, 0)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_millis(1200, 2000, 400, 600)
    }
}

/// Roster rejected by [`TurnEngine::start`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StartError {
    /// No players.
    #[display("Cannot start a game without players")]
    EmptyRoster,

    /// A token placed past the final tile.
    #[display("Player {} is at position {}, past the final tile {}", player_id, position, last)]
    OffBoard {
        /// Offending player.
        player_id: u32,
        /// Its position.
        position: usize,
        /// Final tile index.
        last: usize,
    },

    /// A player already flagged as finished.
    #[display("Player {} is already finished", _0)]
    AlreadyFinished(u32),
}

impl std::error::Error for StartError {}

/// Owns the game state and is its only writer.
#[derive(Debug)]
pub struct TurnEngine<D: Dice> {
    catalog: TileCatalog,
    pacing: Pacing,
    dice: D,
    state: GameState,
    pending: Option<Ticket>,
    sequence: u64,
}

impl<D: Dice> TurnEngine<D> {
    /// Creates an engine in setup with an empty roster.
    #[instrument(skip(catalog, dice), fields(tiles = catalog.len()))]
    pub fn new(catalog: TileCatalog, pacing: Pacing, dice: D) -> Self {
        let state = GameState::fresh(Generation::default(), catalog.last_position());
        Self {
            catalog,
            pacing,
            dice,
            state,
            pending: None,
            sequence: 0,
        }
    }

    /// Latest committed state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The board.
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Phase delays.
    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// The single continuation currently awaited, if any.
    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    /// Supplies the roster and starts play.
    ///
    /// Ignored unless the game is in setup. Names and icons are taken as
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] for an empty roster or a token that cannot be
    /// on the board.
    #[instrument(skip(self, roster), fields(players = roster.len(), generation = %self.state.generation))]
    pub fn start(&mut self, roster: Vec<Player>) -> Result<Transition, StartError> {
        if self.state.lifecycle != Lifecycle::Setup {
            debug!("Start ignored, game already started");
            return Ok(Transition::ignored(Ignored::AlreadyStarted));
        }
        if roster.is_empty() {
            return Err(StartError::EmptyRoster);
        }
        let last = self.state.last_position;
        if let Some(p) = roster.iter().find(|p| *p.position() > last) {
            return Err(StartError::OffBoard {
                player_id: *p.id(),
                position: *p.position(),
                last,
            });
        }
        if let Some(p) = roster.iter().find(|p| *p.is_finished()) {
            return Err(StartError::AlreadyFinished(*p.id()));
        }

        self.state.players = roster;
        self.state.dice_value = None;
        self.state.lifecycle = Lifecycle::Playing {
            current: 0,
            turn: TurnPhase::Idle,
        };
        info!(players = self.state.players.len(), "Game started");
        Ok(Transition::default().sound(SoundCue::GameStart))
    }

    /// Starts a roll. No-op unless playing and idle.
    #[instrument(skip(self), fields(generation = %self.state.generation))]
    pub fn roll(&mut self) -> Transition {
        if let Err(reason) = RollContract::pre(&self.state, &RollRequest) {
            debug!(%reason, "Roll ignored");
            return Transition::ignored(reason);
        }
        let before = self.snapshot();

        self.state.set_turn(TurnPhase::Rolling);
        let continuation = self.schedule(Step::CommitRoll, self.pacing.roll);
        debug!(ticket = continuation.ticket.sequence, "Die tumbling");

        self.verify::<RollContract, RollRequest>(before);
        Transition::default()
            .sound(SoundCue::DiceRoll)
            .then(continuation)
    }

    /// Closes the open task gate and passes the turn on.
    ///
    /// The engine does not judge the answer; calling this is the approval.
    #[instrument(skip(self), fields(generation = %self.state.generation))]
    pub fn complete_task(&mut self) -> Transition {
        if let Err(reason) = CompleteTaskContract::pre(&self.state, &CompleteTaskRequest) {
            debug!(%reason, "Task completion ignored");
            return Transition::ignored(reason);
        }
        let before = self.snapshot();

        let tile_id = self.state.current_task().map(|t| *t.id());
        self.advance_turn();
        info!(?tile_id, next = ?self.state.current_player_index(), "Task completed");

        self.verify::<CompleteTaskContract, CompleteTaskRequest>(before);
        Transition::default()
    }

    /// Discards everything and returns to setup. Always accepted.
    ///
    /// Bumps the generation, so every outstanding continuation becomes stale.
    #[instrument(skip(self), fields(generation = %self.state.generation))]
    pub fn reset(&mut self) -> Transition {
        let generation = self.state.generation.next();
        if let Some(ticket) = self.pending.take() {
            debug!(sequence = ticket.sequence, "Dropping in-flight continuation");
        }
        self.state = GameState::fresh(generation, self.catalog.last_position());
        info!(%generation, "Game reset");
        Transition::default()
    }

    /// Timer expiry for a previously issued continuation.
    #[instrument(skip(self), fields(sequence = ticket.sequence, ticket_generation = %ticket.generation))]
    pub fn fire(&mut self, ticket: Ticket) -> Transition {
        if self.pending != Some(ticket) {
            debug!(outstanding = ?self.pending, "Stale continuation ignored");
            return Transition::ignored(Ignored::StaleTicket);
        }
        self.pending = None;
        let before = self.snapshot();

        let Some(turn) = self.state.turn().cloned() else {
            warn!("Continuation outstanding outside play");
            return Transition::ignored(Ignored::NotPlaying);
        };

        let transition = match turn {
            TurnPhase::Rolling => self.commit_roll(),
            TurnPhase::Rolled { value } => self.begin_move(value.steps()),
            TurnPhase::Moving { target } => self.advance(target),
            TurnPhase::Landed { position } => self.resolve_landing(position),
            TurnPhase::Idle | TurnPhase::TaskPending { .. } => {
                warn!(phase = %turn.kind(), "Continuation does not match phase");
                return Transition::ignored(Ignored::Busy(turn.kind()));
            }
        };

        self.verify::<StepContract, Ticket>(before);
        transition
    }

    fn commit_roll(&mut self) -> Transition {
        let value = self.dice.roll();
        self.state.dice_value = Some(value);
        self.state.set_turn(TurnPhase::Rolled { value });
        info!(value = value.value(), "Roll committed");
        Transition::default().then(self.schedule(Step::BeginMove, self.pacing.settle))
    }

    fn begin_move(&mut self, steps: usize) -> Transition {
        let Some(from) = self.state.current_player().map(|p| *p.position()) else {
            return Transition::ignored(Ignored::NotPlaying);
        };
        let target = (from + steps).min(self.state.last_position);
        debug!(from, steps, target, "Movement planned");

        if target == from {
            debug!("No net movement, landing immediately");
            self.state.set_turn(TurnPhase::Landed { position: from });
            return self.resolve_landing(from);
        }

        self.state.set_turn(TurnPhase::Moving { target });
        Transition::default().then(self.schedule(Step::Advance, self.pacing.step))
    }

    fn advance(&mut self, target: usize) -> Transition {
        let Some(current) = self.state.current_player_index() else {
            return Transition::ignored(Ignored::NotPlaying);
        };
        let Some(player) = self.state.players.get_mut(current) else {
            error!(current, "Current index outside roster");
            return Transition::ignored(Ignored::NotPlaying);
        };
        let next = (*player.position() + 1).min(target);
        player.step_to(next);
        debug!(player = %player.name(), position = next, target, "Step");

        let transition = Transition::default().sound(SoundCue::Step);
        if next >= target {
            self.state.set_turn(TurnPhase::Landed { position: next });
            transition.then(self.schedule(Step::Land, self.pacing.land))
        } else {
            transition.then(self.schedule(Step::Advance, self.pacing.step))
        }
    }

    fn resolve_landing(&mut self, position: usize) -> Transition {
        let Some(current) = self.state.current_player_index() else {
            return Transition::ignored(Ignored::NotPlaying);
        };

        if position == self.state.last_position {
            let Some(winner) = self.state.players.get_mut(current) else {
                error!(current, "Current index outside roster");
                return Transition::ignored(Ignored::NotPlaying);
            };
            winner.mark_finished();
            let player_id = *winner.id();
            info!(winner = %winner.name(), player_id, "Winner");
            self.state.lifecycle = Lifecycle::Finished { winner: current };
            return Transition::default()
                .sound(SoundCue::Win)
                .effect(Effect::Celebrate { player_id });
        }

        match self.catalog.at_position(position) {
            Some(tile) if tile.is_task() => {
                info!(tile_id = tile.id(), title = %tile.title(), "Task gate opened");
                self.state.set_turn(TurnPhase::TaskPending { tile: tile.clone() });
            }
            Some(tile) => {
                debug!(tile_id = tile.id(), "No task on tile");
                self.advance_turn();
            }
            None => {
                warn!(position, "No tile at landing position");
                self.advance_turn();
            }
        }
        Transition::default()
    }

    fn advance_turn(&mut self) {
        let count = self.state.players.len();
        if let Lifecycle::Playing { current, turn } = &mut self.state.lifecycle {
            *current = (*current + 1) % count.max(1);
            *turn = TurnPhase::Idle;
            debug!(next = *current, "Turn passed");
        }
    }

    fn schedule(&mut self, step: Step, delay: Duration) -> Continuation {
        self.sequence += 1;
        let ticket = Ticket {
            generation: self.state.generation,
            sequence: self.sequence,
        };
        self.pending = Some(ticket);
        Continuation {
            ticket,
            delay,
            step,
        }
    }

    fn snapshot(&self) -> Option<GameState> {
        cfg!(debug_assertions).then(|| self.state.clone())
    }

    fn verify<C: Contract<GameState, A>, A>(&self, before: Option<GameState>) {
        let Some(before) = before else {
            return;
        };
        if let Err(violation) = C::post(&before, &self.state) {
            error!(%violation, "Postcondition violated");
            debug_assert!(false, "{}", violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameStatus, LoadedDice, RosterBuilder};

    fn engine(faces: &[u8], players: usize) -> TurnEngine<LoadedDice> {
        let mut engine = TurnEngine::new(
            TileCatalog::standard(),
            Pacing::instant(),
            LoadedDice::new(faces.iter().copied()),
        );
        engine
            .start(RosterBuilder::new(players).unwrap().build())
            .unwrap();
        engine
    }

    /// Fires continuations until the chain ends, returning every transition.
    fn drain(engine: &mut TurnEngine<LoadedDice>, first: Transition) -> Vec<Transition> {
        let mut next = first.scheduled;
        let mut seen = vec![first];
        while let Some(continuation) = next {
            let t = engine.fire(continuation.ticket);
            next = t.scheduled;
            seen.push(t);
        }
        seen
    }

    #[test]
    fn test_roll_schedules_commit_with_roll_delay() {
        let mut engine = TurnEngine::new(TileCatalog::standard(), Pacing::default(), LoadedDice::new([3]));
        engine.start(RosterBuilder::new(1).unwrap().build()).unwrap();
        let t = engine.roll();
        assert!(engine.state().is_rolling());
        assert_eq!(t.sounds().collect::<Vec<_>>(), [SoundCue::DiceRoll]);
        let c = t.scheduled.unwrap();
        assert_eq!(c.step, Step::CommitRoll);
        assert_eq!(c.delay, Duration::from_millis(1200));
    }

    #[test]
    fn test_result_visible_before_moving() {
        let mut engine = engine(&[4], 2);
        let t = engine.roll();
        let t = engine.fire(t.scheduled.unwrap().ticket);
        assert_eq!(engine.state().dice_value().map(|d| d.value()), Some(4));
        assert!(!engine.state().is_rolling());
        assert!(!engine.state().is_moving());
        assert_eq!(*engine.state().players()[0].position(), 0);
        assert_eq!(t.scheduled.unwrap().step, Step::BeginMove);
    }

    #[test]
    fn test_one_step_sound_per_tile() {
        let mut engine = engine(&[4], 2);
        let first = engine.roll();
        let all = drain(&mut engine, first);
        let steps = all
            .iter()
            .flat_map(|t| t.sounds())
            .filter(|c| *c == SoundCue::Step)
            .count();
        assert_eq!(steps, 4);
        assert_eq!(*engine.state().players()[0].position(), 4);
    }

    #[test]
    fn test_roll_while_busy_is_noop() {
        let mut engine = engine(&[2], 2);
        let first = engine.roll();
        let again = engine.roll();
        assert_eq!(again.ignored, Some(Ignored::Busy(crate::PhaseKind::Rolling)));
        assert_eq!(engine.pending(), first.scheduled.map(|c| c.ticket));
    }

    #[test]
    fn test_roll_with_task_open_is_noop() {
        let mut engine = engine(&[1], 2);
        let first = engine.roll();
        drain(&mut engine, first);
        assert!(engine.state().show_task_modal());
        let t = engine.roll();
        assert_eq!(t.ignored, Some(Ignored::Busy(crate::PhaseKind::TaskPending)));
    }

    #[test]
    fn test_complete_without_task_is_noop() {
        let mut engine = engine(&[1], 2);
        assert_eq!(engine.complete_task().ignored, Some(Ignored::NoTaskOpen));
        assert_eq!(engine.state().current_player_index(), Some(0));
    }

    #[test]
    fn test_start_rejects_empty_and_off_board() {
        let mut engine = TurnEngine::new(TileCatalog::standard(), Pacing::instant(), LoadedDice::new([1]));
        assert_eq!(engine.start(Vec::new()), Err(StartError::EmptyRoster));
        let roster = vec![Player::new(0, "Ana", crate::PlayerColor::Red, "user").placed_at(25)];
        assert!(matches!(engine.start(roster), Err(StartError::OffBoard { position: 25, .. })));
        assert_eq!(engine.state().status(), GameStatus::Setup);
    }

    #[test]
    fn test_second_start_ignored() {
        let mut engine = engine(&[1], 2);
        let t = engine.start(RosterBuilder::new(3).unwrap().build()).unwrap();
        assert_eq!(t.ignored, Some(Ignored::AlreadyStarted));
        assert_eq!(engine.state().players().len(), 2);
    }

    #[test]
    fn test_finished_game_halts() {
        let mut engine = TurnEngine::new(TileCatalog::standard(), Pacing::instant(), LoadedDice::new([6]));
        let roster = vec![Player::new(0, "Ana", crate::PlayerColor::Red, "user").placed_at(15)];
        engine.start(roster).unwrap();
        let first = engine.roll();
        let all = drain(&mut engine, first);
        assert_eq!(engine.state().status(), GameStatus::Finished);
        assert!(all.iter().any(|t| t.effects.contains(&Effect::Celebrate { player_id: 0 })));
        assert_eq!(engine.roll().ignored, Some(Ignored::NotPlaying));
        assert_eq!(engine.complete_task().ignored, Some(Ignored::NotPlaying));
    }

    #[test]
    fn test_reset_returns_to_setup_with_new_generation() {
        let mut engine = engine(&[3], 2);
        let old = engine.state().generation();
        engine.roll();
        engine.reset();
        assert_eq!(engine.state().status(), GameStatus::Setup);
        assert!(engine.state().players().is_empty());
        assert!(engine.pending().is_none());
        assert!(engine.state().generation() > old);
    }

    #[test]
    fn test_zero_step_move_resolves_without_animation() {
        let mut engine = TurnEngine::new(TileCatalog::standard(), Pacing::instant(), LoadedDice::new([2]));
        let roster = vec![Player::new(0, "Ana", crate::PlayerColor::Red, "user").placed_at(19)];
        engine.start(roster).unwrap();
        let first = engine.roll();
        let all = drain(&mut engine, first);
        assert!(all.iter().flat_map(|t| t.sounds()).all(|c| c != SoundCue::Step));
        assert_eq!(engine.state().winner().map(|p| *p.id()), Some(0));
    }
}
