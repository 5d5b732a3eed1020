//! Async driver that owns the turn engine and runs its timers.
//!
//! The driver is the engine's single writer. Frontends send [`Command`]s and
//! read snapshots from a `watch` channel. At most one timer is pending at a
//! time; when it expires its ticket goes back to the engine, which drops it
//! if a reset has happened since.

use crate::audio::SoundSink;
use little_learners_board::{Dice, GameState, Player, Ticket, Transition, TurnEngine};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

/// Requests a frontend can make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Supply the roster and start playing.
    Start(Vec<Player>),
    /// Roll the die for the current player.
    Roll,
    /// The open task was approved.
    CompleteTask,
    /// Abandon the game and return to setup.
    Reset,
}

/// Frontend side of a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<GameState>,
}

impl DriverHandle {
    /// Sends a command. Returns false if the driver has stopped.
    #[instrument(skip(self))]
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Starts a game with `roster`.
    pub fn start(&self, roster: Vec<Player>) -> bool {
        self.send(Command::Start(roster))
    }

    /// Requests a roll.
    pub fn roll(&self) -> bool {
        self.send(Command::Roll)
    }

    /// Approves the open task.
    pub fn complete_task(&self) -> bool {
        self.send(Command::CompleteTask)
    }

    /// Resets the game.
    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }

    /// Latest committed state.
    pub fn snapshot(&self) -> GameState {
        self.state.borrow().clone()
    }

    /// A receiver that wakes on every committed state.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.clone()
    }
}

/// Owns the engine; see the module docs.
pub struct GameDriver<D: Dice> {
    engine: TurnEngine<D>,
    commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<GameState>,
    sink: Arc<dyn SoundSink>,
    timer: Option<(Instant, Ticket)>,
}

impl<D: Dice + 'static> GameDriver<D> {
    /// Creates a driver and its handle without starting it.
    pub fn new(engine: TurnEngine<D>, sink: Arc<dyn SoundSink>) -> (Self, DriverHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(engine.state().clone());
        let driver = Self {
            engine,
            commands,
            state_tx,
            sink,
            timer: None,
        };
        let handle = DriverHandle {
            commands: commands_tx,
            state,
        };
        (driver, handle)
    }

    /// Spawns the driver on the current runtime.
    pub fn spawn(engine: TurnEngine<D>, sink: Arc<dyn SoundSink>) -> (DriverHandle, JoinHandle<()>) {
        let (driver, handle) = Self::new(engine, sink);
        let task = tokio::spawn(driver.run());
        (handle, task)
    }

    /// Runs until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Game driver running");
        loop {
            let deadline = self.timer.map(|(at, _)| at);
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = sleep_or_never(deadline) => {
                    if let Some((_, ticket)) = self.timer.take() {
                        let transition = self.engine.fire(ticket);
                        self.apply(transition);
                    }
                }
            }
        }
        info!("Game driver stopped");
    }

    fn handle(&mut self, command: Command) {
        debug!(?command, "Command received");
        let transition = match command {
            Command::Start(roster) => match self.engine.start(roster) {
                Ok(transition) => transition,
                Err(e) => {
                    warn!(error = %e, "Roster rejected");
                    return;
                }
            },
            Command::Roll => self.engine.roll(),
            Command::CompleteTask => self.engine.complete_task(),
            Command::Reset => {
                self.timer = None;
                self.engine.reset()
            }
        };
        self.apply(transition);
    }

    fn apply(&mut self, transition: Transition) {
        if let Some(reason) = transition.ignored {
            debug!(%reason, "Request ignored");
            return;
        }
        for effect in &transition.effects {
            self.sink.dispatch(effect);
        }
        if let Some(continuation) = transition.scheduled {
            debug!(step = ?continuation.step, delay_ms = continuation.delay.as_millis() as u64, "Timer armed");
            self.timer = Some((Instant::now() + continuation.delay, continuation.ticket));
        }
        self.state_tx.send_replace(self.engine.state().clone());
    }
}

async fn sleep_or_never(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
