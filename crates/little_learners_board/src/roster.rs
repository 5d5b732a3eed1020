//! Builds the starting roster from setup choices.

use crate::types::{Player, PlayerColor};
use tracing::{debug, info, instrument};

/// Icon keys offered at setup, in the order defaults are handed out.
pub const ICON_KEYS: [&str; 10] = [
    "user", "smile", "bot", "ghost", "crown", "rocket", "star", "zap", "gamepad", "heart",
];

/// Smallest roster.
pub const MIN_PLAYERS: usize = 1;

/// Largest roster (one per token color).
pub const MAX_PLAYERS: usize = 4;

/// Returns `icon` if it is a known key, otherwise the first key.
pub fn icon_or_default(icon: &str) -> &str {
    if ICON_KEYS.contains(&icon) {
        icon
    } else {
        ICON_KEYS[0]
    }
}

/// Roster setup rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RosterError {
    /// Player count outside `MIN_PLAYERS..=MAX_PLAYERS`.
    #[display("Player count {} is not between {} and {}", _0, MIN_PLAYERS, MAX_PLAYERS)]
    BadCount(usize),

    /// A seat index beyond the chosen count.
    #[display("No seat {} in a roster of {}", seat, count)]
    NoSuchSeat {
        /// Requested seat.
        seat: usize,
        /// Roster size.
        count: usize,
    },
}

impl std::error::Error for RosterError {}

/// Collects per-seat names and icons, then produces players.
///
/// Seats default to `"Player N"` with icons handed out in [`ICON_KEYS`] order.
#[derive(Debug, Clone)]
pub struct RosterBuilder {
    names: Vec<String>,
    icons: Vec<String>,
}

impl RosterBuilder {
    /// Starts a roster of `count` seats.
    #[instrument]
    pub fn new(count: usize) -> Result<Self, RosterError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(RosterError::BadCount(count));
        }
        let names = (0..count).map(|i| format!("Player {}", i + 1)).collect();
        let icons = (0..count)
            .map(|i| ICON_KEYS[i % ICON_KEYS.len()].to_string())
            .collect();
        debug!(count, "Roster started");
        Ok(Self { names, icons })
    }

    /// Number of seats.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Sets the name for a seat.
    #[instrument(skip(self, name))]
    pub fn name(mut self, seat: usize, name: impl Into<String>) -> Result<Self, RosterError> {
        let count = self.count();
        let slot = self
            .names
            .get_mut(seat)
            .ok_or(RosterError::NoSuchSeat { seat, count })?;
        *slot = name.into();
        Ok(self)
    }

    /// Sets the icon for a seat. The key is stored as given.
    #[instrument(skip(self, icon))]
    pub fn icon(mut self, seat: usize, icon: impl Into<String>) -> Result<Self, RosterError> {
        let count = self.count();
        let slot = self
            .icons
            .get_mut(seat)
            .ok_or(RosterError::NoSuchSeat { seat, count })?;
        *slot = icon.into();
        Ok(self)
    }

    /// Produces the roster: ids and colors follow seat order, everyone at the
    /// start tile.
    #[instrument(skip(self), fields(count = self.count()))]
    pub fn build(self) -> Vec<Player> {
        let players: Vec<Player> = self
            .names
            .into_iter()
            .zip(self.icons)
            .zip(PlayerColor::SEATS)
            .enumerate()
            .map(|(seat, ((name, icon), color))| Player::new(seat as u32, name, color, icon))
            .collect();
        info!(count = players.len(), "Roster built");
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let players = RosterBuilder::new(3).unwrap().build();
        let names: Vec<&str> = players.iter().map(|p| p.name().as_str()).collect();
        let icons: Vec<&str> = players.iter().map(|p| p.icon().as_str()).collect();
        assert_eq!(names, ["Player 1", "Player 2", "Player 3"]);
        assert_eq!(icons, ["user", "smile", "bot"]);
        assert!(players.iter().all(|p| *p.position() == 0 && !p.is_finished()));
    }

    #[test]
    fn test_colors_follow_seat_order() {
        let players = RosterBuilder::new(4).unwrap().build();
        let colors: Vec<PlayerColor> = players.iter().map(|p| *p.color()).collect();
        assert_eq!(colors, PlayerColor::SEATS);
        let ids: Vec<u32> = players.iter().map(|p| *p.id()).collect();
        assert_eq!(ids, [0, 1, 2, 3]);
    }

    #[test]
    fn test_custom_names_and_icons() {
        let players = RosterBuilder::new(2)
            .and_then(|b| b.name(0, "Amina"))
            .and_then(|b| b.icon(1, "rocket"))
            .unwrap()
            .build();
        assert_eq!(players[0].name(), "Amina");
        assert_eq!(players[1].icon(), "rocket");
    }

    #[test]
    fn test_rejects_bad_counts() {
        assert_eq!(RosterBuilder::new(0).unwrap_err(), RosterError::BadCount(0));
        assert_eq!(RosterBuilder::new(5).unwrap_err(), RosterError::BadCount(5));
    }

    #[test]
    fn test_rejects_unknown_seat() {
        let err = RosterBuilder::new(1).unwrap().name(2, "Zed").unwrap_err();
        assert_eq!(err, RosterError::NoSuchSeat { seat: 2, count: 1 });
    }

    #[test]
    fn test_icon_fallback() {
        assert_eq!(icon_or_default("crown"), "crown");
        assert_eq!(icon_or_default("dragon"), "user");
    }
}
