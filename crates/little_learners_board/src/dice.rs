//! Six-sided die.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// A face value in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    /// Lowest face.
    pub const MIN: u8 = 1;
    /// Highest face.
    pub const MAX: u8 = 6;

    /// Returns the face if `value` is in range.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Clamps `value` into range.
    pub fn saturating(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Face value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Face value as a step count.
    pub fn steps(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for DieFace {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("die face {} out of range", value))
    }
}

impl From<DieFace> for u8 {
    fn from(face: DieFace) -> Self {
        face.0
    }
}

impl std::fmt::Display for DieFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of die rolls.
pub trait Dice: Send {
    /// Rolls once.
    fn roll(&mut self) -> DieFace;
}

/// Uniformly random die.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Seeds from the operating system.
    #[instrument]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic die for reproducible sessions.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> DieFace {
        let face = DieFace(self.rng.gen_range(DieFace::MIN..=DieFace::MAX));
        debug!(face = face.value(), "Rolled");
        face
    }
}

/// Die that replays a fixed sequence of faces, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct LoadedDice {
    faces: VecDeque<DieFace>,
}

impl LoadedDice {
    /// Creates a die from face values; out-of-range values are clamped and an
    /// empty sequence always rolls 1.
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        let mut faces: VecDeque<DieFace> = faces.into_iter().map(DieFace::saturating).collect();
        if faces.is_empty() {
            faces.push_back(DieFace(DieFace::MIN));
        }
        Self { faces }
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self) -> DieFace {
        let face = self.faces[0];
        self.faces.rotate_left(1);
        debug!(face = face.value(), "Rolled loaded die");
        face
    }
}
