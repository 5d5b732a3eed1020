//! Key bindings per screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which screen has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Roster shown, waiting to start.
    Setup,
    /// Board, no task open.
    Board,
    /// Task gate open; typing goes to the answer.
    Task,
    /// Someone won.
    Finished,
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the program.
    Quit,
    /// Reset to setup.
    NewGame,
    /// Start with the prepared roster.
    Start,
    /// Roll the die.
    Roll,
    /// Type into the answer.
    Type(char),
    /// Delete the last answer character.
    Backspace,
    /// Ask the AI judge.
    Submit,
    /// Capture speech into the answer.
    Listen,
    /// Teacher approves.
    Approve,
    /// Teacher asks for another try.
    Reject,
    /// Close the approved task.
    Continue,
    /// Nothing bound.
    None,
}

/// Maps a key press to an action for `screen`.
pub fn action_for(key: KeyEvent, screen: Screen) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('n') => Action::NewGame,
            _ => Action::None,
        };
    }

    match (screen, key.code) {
        (Screen::Task, KeyCode::Char(c)) => Action::Type(c),
        (Screen::Task, KeyCode::Backspace) => Action::Backspace,
        (Screen::Task, KeyCode::Enter) => Action::Submit,
        (Screen::Task, KeyCode::F(1)) => Action::Listen,
        (Screen::Task, KeyCode::F(2)) => Action::Approve,
        (Screen::Task, KeyCode::F(3)) => Action::Reject,
        (Screen::Task, KeyCode::F(5)) => Action::Continue,

        (_, KeyCode::Char('q')) => Action::Quit,
        (_, KeyCode::Char('n')) => Action::NewGame,
        (Screen::Setup, KeyCode::Enter | KeyCode::Char('s')) => Action::Start,
        (Screen::Board, KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter) => Action::Roll,
        _ => Action::None,
    }
}
