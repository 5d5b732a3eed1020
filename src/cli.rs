//! Command-line interface for little_learners.

use clap::{Parser, Subcommand};
use little_learners_board::{MAX_PLAYERS, Player, RosterBuilder, RosterError};
use std::path::PathBuf;

/// Little Learners - a dice board game for young English learners
#[derive(Parser, Debug)]
#[command(name = "little_learners")]
#[command(about = "Dice board game with speaking and vocabulary tasks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML). Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "little_learners.toml")]
    pub config: PathBuf,

    /// Override the illustration cache database path
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Players as NAME or NAME:ICON, in seat order (1 to 4)
        #[arg(value_name = "PLAYER")]
        players: Vec<String>,

        /// Seed the die for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the board in its display order
    Board,

    /// Generate missing tile illustrations into the cache
    Illustrate,

    /// Judge one answer from the command line
    Evaluate {
        /// Tile id (1-20)
        #[arg(long)]
        tile: u32,

        /// The answer to judge
        #[arg(long)]
        answer: String,
    },

    /// Export or import the illustration cache
    Backup {
        /// Backup action
        #[command(subcommand)]
        action: BackupAction,
    },
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Write the cache as JSON
    Export {
        /// Output file; stdout if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace cached entries from a JSON backup
    Import {
        /// Backup file
        file: PathBuf,
    },
}

/// Builds a roster from `NAME[:ICON]` arguments. No arguments gives two
/// default players.
pub fn parse_roster(specs: &[String]) -> Result<Vec<Player>, RosterError> {
    if specs.is_empty() {
        return Ok(RosterBuilder::new(2)?.build());
    }
    if specs.len() > MAX_PLAYERS {
        return Err(RosterError::BadCount(specs.len()));
    }

    let mut builder = RosterBuilder::new(specs.len())?;
    for (seat, spec) in specs.iter().enumerate() {
        let (name, icon) = match spec.split_once(':') {
            Some((name, icon)) => (name.trim(), Some(icon.trim())),
            None => (spec.trim(), None),
        };
        if !name.is_empty() {
            builder = builder.name(seat, name)?;
        }
        if let Some(icon) = icon.filter(|i| !i.is_empty()) {
            builder = builder.icon(seat, icon)?;
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use little_learners_board::PlayerColor;

    fn specs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_roster_has_two_players() {
        let roster = parse_roster(&[]).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].name(), "Player 2");
    }

    #[test]
    fn test_names_and_icons() {
        let roster = parse_roster(&specs(&["Ana:rocket", "Ben"])).unwrap();
        assert_eq!(roster[0].name(), "Ana");
        assert_eq!(roster[0].icon(), "rocket");
        assert_eq!(*roster[0].color(), PlayerColor::Red);
        assert_eq!(roster[1].name(), "Ben");
        assert_eq!(*roster[1].color(), PlayerColor::Blue);
    }

    #[test]
    fn test_blank_name_keeps_default() {
        let roster = parse_roster(&specs(&[":star"])).unwrap();
        assert_eq!(roster[0].name(), "Player 1");
        assert_eq!(roster[0].icon(), "star");
    }

    #[test]
    fn test_too_many_players() {
        let err = parse_roster(&specs(&["a", "b", "c", "d", "e"])).unwrap_err();
        assert_eq!(err, RosterError::BadCount(5));
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from(["little_learners", "play", "Ana", "Ben", "--seed", "7"]).unwrap();
        match cli.command {
            Command::Play { players, seed } => {
                assert_eq!(players, vec!["Ana", "Ben"]);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_backup_import() {
        let cli = Cli::try_parse_from(["little_learners", "backup", "import", "saved.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Backup { action: BackupAction::Import { .. } }
        ));
    }
}
