//! Little Learners board - pure turn logic for the dice-and-tiles game.
//!
//! No I/O lives here. The [`TurnEngine`] owns the [`GameState`] and returns
//! a [`Transition`] from every operation: sound cues and other side effects
//! to fire, plus at most one timed [`Continuation`] for the caller to
//! schedule. Timers, audio and rendering belong to the application.
//!
//! # Example
//!
//! ```
//! use little_learners_board::{LoadedDice, Pacing, RosterBuilder, TileCatalog, TurnEngine};
//!
//! let mut engine = TurnEngine::new(TileCatalog::standard(), Pacing::instant(), LoadedDice::new([1]));
//! engine.start(RosterBuilder::new(2).unwrap().build()).unwrap();
//!
//! let mut next = engine.roll().scheduled;
//! while let Some(continuation) = next {
//!     next = engine.fire(continuation.ticket).scheduled;
//! }
//! assert_eq!(engine.state().current_task().map(|t| *t.id()), Some(2));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
pub mod contracts;
mod dice;
mod engine;
pub mod invariants;
mod layout;
mod phases;
mod roster;
mod sound;
mod state;
mod transition;
mod types;

pub use catalog::{BOARD_SIZE, CatalogError, TileCatalog};
pub use dice::{Dice, DieFace, LoadedDice, RandomDice};
pub use engine::{Pacing, StartError, TurnEngine};
pub use layout::{BoardLayout, Cell};
pub use phases::{GameStatus, Generation, Lifecycle, PhaseKind, TurnPhase};
pub use roster::{ICON_KEYS, MAX_PLAYERS, MIN_PLAYERS, RosterBuilder, RosterError, icon_or_default};
pub use sound::{SoundCue, Tone, Waveform};
pub use state::GameState;
pub use transition::{Continuation, Effect, Ignored, Step, Ticket, Transition};
pub use types::{Player, PlayerColor, TaskCategory, TileData, TileType};
