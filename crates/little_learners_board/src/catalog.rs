//! Static tile catalog for the standard 20-tile board.

use crate::types::{TaskCategory, TileData, TileType};
use tracing::{debug, instrument};

/// Number of tiles on the standard board.
pub const BOARD_SIZE: usize = 20;

/// Reasons a tile list cannot serve as a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CatalogError {
    /// No tiles supplied.
    #[display("Catalog is empty")]
    Empty,

    /// Ids are not `1..=len` in order.
    #[display("Tile at index {} has id {}, expected {}", index, found, index + 1)]
    OutOfOrder {
        /// Index in the supplied list.
        index: usize,
        /// Id found there.
        found: u32,
    },

    /// First tile is not a start tile or last tile is not a finish tile.
    #[display("Board must begin with a start tile and end with a finish tile")]
    BadEnds,
}

impl std::error::Error for CatalogError {}

/// Ordered, immutable list of tiles. Tile `id` sits at position `id - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCatalog {
    tiles: Vec<TileData>,
}

impl TileCatalog {
    /// Builds a catalog after checking ids and end tiles.
    #[instrument(skip(tiles), fields(count = tiles.len()))]
    pub fn new(tiles: Vec<TileData>) -> Result<Self, CatalogError> {
        if tiles.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, tile) in tiles.iter().enumerate() {
            if *tile.id() as usize != index + 1 {
                return Err(CatalogError::OutOfOrder {
                    index,
                    found: *tile.id(),
                });
            }
        }
        let starts = tiles.first().map(|t| *t.tile_type()) == Some(TileType::Start);
        let finishes = tiles.last().map(|t| *t.tile_type()) == Some(TileType::Finish);
        if !starts || !finishes {
            return Err(CatalogError::BadEnds);
        }
        debug!("Catalog validated");
        Ok(Self { tiles })
    }

    /// The standard English-practice board.
    #[instrument]
    pub fn standard() -> Self {
        Self {
            tiles: standard_tiles(),
        }
    }

    /// All tiles in id order.
    pub fn tiles(&self) -> &[TileData] {
        &self.tiles
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Index of the final tile.
    pub fn last_position(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }

    /// Looks up a tile by 1-based id.
    pub fn get(&self, id: u32) -> Option<&TileData> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.tiles.get(index))
    }

    /// Looks up the tile at a zero-based board position.
    pub fn at_position(&self, position: usize) -> Option<&TileData> {
        self.tiles.get(position)
    }

    /// Task tiles only, in id order.
    pub fn task_tiles(&self) -> impl Iterator<Item = &TileData> {
        self.tiles.iter().filter(|t| t.is_task())
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn task(id: u32, title: &str, description: &str, category: TaskCategory, prompt: &str) -> TileData {
    TileData::new(id, title, description, TileType::Task, category).with_prompt(prompt)
}

fn pronunciation(id: u32, words: &[&str], prompt: &str) -> TileData {
    task(
        id,
        "Pronunciation",
        "Pronounce these words correctly:",
        TaskCategory::Speaking,
        prompt,
    )
    .with_content(words.iter().copied())
}

fn standard_tiles() -> Vec<TileData> {
    use TaskCategory::*;

    vec![
        TileData::new(1, "Start", "Start here!", TileType::Start, General),
        task(
            2,
            "Introduce Myself",
            "Tell us your Name, Age, and where you live.",
            Roleplay,
            "The user is introducing themselves. Verify if they included a name, an age, and a location. Be encouraging.",
        ),
        task(
            3,
            "Count to 30",
            "Can you count from 1 to 30?",
            Speaking,
            "The user will try to count to 30. If they type it out or say they did it, congratulate them. You can also ask them to count by 5s for extra credit.",
        ),
        task(
            4,
            "Family Intro",
            "Introduce your family members.",
            Roleplay,
            "The user is talking about their family. Ask a follow-up question like 'Do you have any brothers or sisters?' or compliment their description.",
        ),
        pronunciation(
            5,
            &["Is", "He", "Sister", "Fin", "Policeman", "Niece", "Sit"],
            "Read these words out loud for the user using TTS.",
        ),
        task(
            6,
            "He vs She",
            "Point to He - She. Explain the difference.",
            Grammar,
            "The user is explaining 'He' vs 'She'. Verify they understand 'He' is for boys/men and 'She' is for girls/women.",
        ),
        task(
            7,
            "Family Chat",
            "Ask and reply about family members (Name, Age, Live in).",
            Roleplay,
            "Act as a conversation partner. Ask the user about their family member's name, age, or where they live.",
        ),
        task(
            8,
            "Cursive Writing",
            "Write this sentence: 'My sister is a doctor.'",
            Writing,
            "Check if the user typed the sentence correctly: 'My sister is a doctor.' Case sensitive checks are not needed, but spelling is.",
        ),
        task(
            9,
            "Countries",
            "Name 5 Countries.",
            Vocabulary,
            "The user lists countries. Verify there are at least 5 valid countries.",
        ),
        task(
            10,
            "Nationalities",
            "Name 6 Nationalities.",
            Vocabulary,
            "The user lists nationalities (e.g., American, Algerian). Verify there are at least 6.",
        ),
        task(
            11,
            "Languages",
            "Name 4 Languages.",
            Vocabulary,
            "The user lists languages. Verify there are at least 4 valid languages.",
        ),
        pronunciation(12, &["Shark", "Fish", "Chips", "Cheese", "Chat"], "Use TTS to read these words."),
        task(
            13,
            "Complete It",
            "Fill in: 'Hello! My name is... I am ... years old. I am Algerian.'",
            Writing,
            "Verify the user filled in the blanks sensibly for the sentence: 'Hello! My name is [Name]. I am [Age] years old. I am Algerian.'",
        ),
        task(
            14,
            "Friend Chat",
            "Ask and reply about a friend (Name, Age, Nationality, Language, Lives in).",
            Roleplay,
            "Roleplay as the user's friend. Let them ask you questions about your name, age, etc., or ask them questions.",
        ),
        task(
            15,
            "School Facilities",
            "Name 4 School Facilities (e.g., Classroom, Gym).",
            Vocabulary,
            "Verify the user lists at least 4 school facilities.",
        ),
        pronunciation(16, &["Classroom", "Look", "Pool", "Food", "Foot", "Spoon"], "Use TTS."),
        task(
            17,
            "School Chat",
            "Ask and reply about: My friend's school.",
            Roleplay,
            "Ask the user 3 questions about their friend's school.",
        ),
        pronunciation(18, &["The", "Mother", "Brother", "There"], "Use TTS."),
        task(
            19,
            "Locate",
            "Describe where school facilities are (e.g., 'The library is next to the lab').",
            Vocabulary,
            "Verify the user uses prepositions of place correctly (next to, behind, in front of, etc.).",
        ),
        TileData::new(
            20,
            "Game Over",
            "You finished the game! Congratulations!",
            TileType::Finish,
            General,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = TileCatalog::standard();
        assert_eq!(catalog.len(), BOARD_SIZE);
        assert_eq!(*catalog.get(1).unwrap().tile_type(), TileType::Start);
        assert_eq!(*catalog.get(20).unwrap().tile_type(), TileType::Finish);
        assert!(catalog.tiles()[1..19].iter().all(TileData::is_task));
    }

    #[test]
    fn test_standard_catalog_passes_validation() {
        assert!(TileCatalog::new(TileCatalog::standard().tiles().to_vec()).is_ok());
    }

    #[test]
    fn test_lookup_by_position_matches_id() {
        let catalog = TileCatalog::standard();
        for position in 0..BOARD_SIZE {
            assert_eq!(*catalog.at_position(position).unwrap().id() as usize, position + 1);
        }
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(21).is_none());
    }

    #[test]
    fn test_pronunciation_tiles_carry_words() {
        let catalog = TileCatalog::standard();
        let ids: Vec<u32> = catalog
            .tiles()
            .iter()
            .filter(|t| t.is_pronunciation())
            .map(|t| *t.id())
            .collect();
        assert_eq!(ids, [5, 12, 16, 18]);
    }

    #[test]
    fn test_rejects_out_of_order_ids() {
        let tiles = vec![
            TileData::new(1, "Start", "", TileType::Start, TaskCategory::General),
            TileData::new(3, "Finish", "", TileType::Finish, TaskCategory::General),
        ];
        assert_eq!(
            TileCatalog::new(tiles),
            Err(CatalogError::OutOfOrder { index: 1, found: 3 })
        );
    }

    #[test]
    fn test_rejects_missing_finish() {
        let tiles = vec![
            TileData::new(1, "Start", "", TileType::Start, TaskCategory::General),
            TileData::new(2, "Task", "", TileType::Task, TaskCategory::Writing),
        ];
        assert_eq!(TileCatalog::new(tiles), Err(CatalogError::BadEnds));
    }
}
