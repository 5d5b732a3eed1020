//! Sound cues and their 8-bit tone scores.
//!
//! The game only names the cue; an audio backend decides how (or whether) to
//! play it. [`SoundCue::tones`] gives the square-wave score the
//! chiptune effects use, for backends that synthesize.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A named sound effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SoundCue {
    /// Roster accepted, game begins.
    GameStart,
    /// Die starts tumbling.
    DiceRoll,
    /// Token advances one tile.
    Step,
    /// Teacher approved an answer.
    Correct,
    /// Teacher asked for another try.
    Incorrect,
    /// Someone reached the final tile.
    Win,
    /// Pointer hover or small UI feedback.
    UiHover,
}

/// Oscillator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Square wave.
    Square,
    /// Sawtooth wave.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

/// One note of a cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Pitch in hertz.
    pub frequency_hz: f32,
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Start offset from the cue start, seconds.
    pub offset_secs: f32,
    /// Length, seconds. Volume ramps down over this span.
    pub duration_secs: f32,
    /// Initial gain.
    pub volume: f32,
}

const fn tone(frequency_hz: f32, waveform: Waveform, duration_secs: f32, offset_secs: f32, volume: f32) -> Tone {
    Tone {
        frequency_hz,
        waveform,
        offset_secs,
        duration_secs,
        volume,
    }
}

// Rattle pitches for the dice roll, spread over 200-600 Hz.
const RATTLE_HZ: [f32; 8] = [430.0, 260.0, 575.0, 310.0, 495.0, 220.0, 380.0, 540.0];

impl SoundCue {
    /// The tone score for this cue.
    pub fn tones(self) -> Vec<Tone> {
        use Waveform::*;

        match self {
            SoundCue::Step => vec![tone(600.0, Square, 0.05, 0.0, 0.05)],
            SoundCue::DiceRoll => RATTLE_HZ
                .iter()
                .enumerate()
                .map(|(i, hz)| tone(*hz, Square, 0.05, i as f32 * 0.08, 0.05))
                .collect(),
            SoundCue::Correct => vec![
                tone(523.25, Square, 0.1, 0.0, 0.1),
                tone(659.25, Square, 0.4, 0.1, 0.1),
            ],
            SoundCue::Incorrect => vec![
                tone(150.0, Sawtooth, 0.2, 0.0, 0.1),
                tone(100.0, Sawtooth, 0.4, 0.15, 0.1),
            ],
            SoundCue::Win => vec![
                tone(523.25, Square, 0.2, 0.0, 0.1),
                tone(659.25, Square, 0.2, 0.2, 0.1),
                tone(783.99, Square, 0.2, 0.4, 0.1),
                tone(1046.50, Square, 0.6, 0.6, 0.1),
                tone(783.99, Square, 0.6, 0.6, 0.1),
            ],
            SoundCue::GameStart => vec![
                tone(220.0, Square, 0.1, 0.0, 0.1),
                tone(440.0, Square, 0.1, 0.1, 0.1),
                tone(880.0, Square, 0.4, 0.2, 0.1),
            ],
            SoundCue::UiHover => vec![tone(800.0, Triangle, 0.02, 0.0, 0.01)],
        }
    }

    /// Time until the last tone ends, seconds.
    pub fn length_secs(self) -> f32 {
        self.tones()
            .iter()
            .map(|t| t.offset_secs + t.duration_secs)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_cue_has_tones() {
        for cue in SoundCue::iter() {
            assert!(!cue.tones().is_empty(), "{} has no tones", cue);
        }
    }

    #[test]
    fn test_dice_rattle_shape() {
        let tones = SoundCue::DiceRoll.tones();
        assert_eq!(tones.len(), 8);
        assert!(tones.iter().all(|t| (200.0..=600.0).contains(&t.frequency_hz)));
    }

    #[test]
    fn test_win_fanfare_length() {
        assert!((SoundCue::Win.length_secs() - 1.2).abs() < 1e-6);
    }
}
