//! Core domain types: players and tiles.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::instrument;

/// Token color, assigned by seat order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    /// First seat.
    Red,
    /// Second seat.
    Blue,
    /// Third seat.
    Green,
    /// Fourth seat.
    Yellow,
}

impl PlayerColor {
    /// Seat order used when building a roster.
    pub const SEATS: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];

    /// Returns the color for a zero-based seat, if the seat exists.
    #[instrument]
    pub fn for_seat(seat: usize) -> Option<Self> {
        Self::SEATS.get(seat).copied()
    }
}

/// A player token on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Seat id, unique within a roster.
    id: u32,
    /// Display name.
    name: String,
    /// Token color.
    color: PlayerColor,
    /// Icon key (see [`crate::ICON_KEYS`]).
    icon: String,
    /// Zero-based board position.
    position: usize,
    /// Set once the player reaches the final tile.
    is_finished: bool,
}

impl Player {
    /// Creates a player at the start tile.
    #[instrument(skip(name, icon), fields(name = %name.as_ref()))]
    pub fn new(id: u32, name: impl AsRef<str>, color: PlayerColor, icon: impl Into<String>) -> Self {
        Self {
            id,
            name: name.as_ref().to_string(),
            color,
            icon: icon.into(),
            position: 0,
            is_finished: false,
        }
    }

    /// Returns the same player placed at `position`.
    ///
    /// Useful for resuming a demo or staging a scenario; the engine rejects
    /// positions past the final tile when the roster is supplied.
    pub fn placed_at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn step_to(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn mark_finished(&mut self) {
        self.is_finished = true;
    }
}

/// Kind of tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TileType {
    /// First tile, no activity.
    Start,
    /// A learning activity that gates the turn.
    Task,
    /// Final tile; reaching it wins.
    Finish,
}

/// Learning category of a tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskCategory {
    /// Say something out loud (counting, pronunciation).
    Speaking,
    /// Name words from a topic.
    Vocabulary,
    /// Explain a grammar point.
    Grammar,
    /// Write or complete a sentence.
    Writing,
    /// Hold a short conversation.
    Roleplay,
    /// Start/finish and other non-activities.
    General,
}

/// One cell of the board path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct TileData {
    /// 1-based id; position on the board is `id - 1`.
    id: u32,
    /// Short heading.
    title: String,
    /// What the player is asked to do.
    description: String,
    /// Tile kind.
    #[serde(rename = "type")]
    tile_type: TileType,
    /// Learning category.
    category: TaskCategory,
    /// Word list for pronunciation tiles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<String>,
    /// Adjudication instruction for the judge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl TileData {
    /// Creates a tile.
    pub fn new(
        id: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        tile_type: TileType,
        category: TaskCategory,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            tile_type,
            category,
            content: Vec::new(),
            prompt: None,
        }
    }

    /// Attaches a word list.
    pub fn with_content<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = words.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches a judge instruction.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Zero-based board position of this tile.
    pub fn position(&self) -> usize {
        self.id.saturating_sub(1) as usize
    }

    /// True for task tiles.
    pub fn is_task(&self) -> bool {
        self.tile_type == TileType::Task
    }

    /// True for speaking tiles that carry a word list to pronounce.
    pub fn is_pronunciation(&self) -> bool {
        self.category == TaskCategory::Speaking && !self.content.is_empty()
    }

    /// Content fingerprint used to invalidate cached illustrations.
    ///
    /// Changes whenever the id, title, description or category changes.
    #[instrument(skip(self), fields(tile_id = self.id))]
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.id, self.title, self.description, self.category
        )
    }
}
