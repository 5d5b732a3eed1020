//! Text-to-speech for pronunciation tiles.
//!
//! Gemini returns raw little-endian 16-bit mono PCM at 24 kHz, base64
//! encoded. Failure of any kind yields `None`; playback is the caller's
//! business.

use crate::gemini::GeminiClient;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Sample rate of synthesized speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Mono 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl PcmAudio {
    /// Wraps samples at `sample_rate`.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decodes little-endian 16-bit samples. A trailing odd byte is dropped.
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Decodes base64 PCM as returned by the speech model.
    #[instrument(skip(encoded), fields(len = encoded.len()))]
    pub fn from_base64(encoded: &str, sample_rate: u32) -> Option<Self> {
        match STANDARD.decode(encoded.trim()) {
            Ok(bytes) => Some(Self::from_le_bytes(&bytes, sample_rate)),
            Err(e) => {
                warn!(error = %e, "Speech audio is not valid base64");
                None
            }
        }
    }

    /// Raw samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Samples per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples scaled to `[-1.0, 1.0)`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|s| *s as f32 / 32768.0).collect()
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Speech synthesis over the Gemini TTS model.
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    client: Option<GeminiClient>,
    model: String,
    voice: String,
}

impl SpeechSynthesizer {
    /// Creates a synthesizer; `None` disables speech.
    pub fn new(client: Option<GeminiClient>, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            voice: voice.into(),
        }
    }

    /// True if a backend is configured.
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Synthesizes `text`. Returns `None` on any failure.
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice, len = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Option<PcmAudio> {
        let client = self.client.as_ref()?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": self.voice } }
                }
            }
        });

        let response = match client.generate_content(&self.model, &body).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed");
                return None;
            }
        };

        let encoded = GeminiClient::parts(&response)
            .iter()
            .find_map(|part| part["inlineData"]["data"].as_str());
        let Some(encoded) = encoded else {
            warn!("No audio in speech response");
            return None;
        };

        let audio = PcmAudio::from_base64(encoded, SPEECH_SAMPLE_RATE)?;
        debug!(samples = audio.samples().len(), "Speech synthesized");
        Some(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_little_endian() {
        let audio = PcmAudio::from_le_bytes(&[0x01, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x42], 24_000);
        assert_eq!(audio.samples(), &[1, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_base64_round() {
        let encoded = STANDARD.encode([0x00u8, 0x40, 0x00, 0xc0]);
        let audio = PcmAudio::from_base64(&encoded, SPEECH_SAMPLE_RATE).unwrap();
        assert_eq!(audio.to_f32(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_bad_base64() {
        assert!(PcmAudio::from_base64("***", SPEECH_SAMPLE_RATE).is_none());
    }

    #[test]
    fn test_duration() {
        let audio = PcmAudio::new(vec![0; 12_000], SPEECH_SAMPLE_RATE);
        assert_eq!(audio.duration(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_no_client_no_audio() {
        let tts = SpeechSynthesizer::new(None, "m", "Kore");
        assert!(!tts.is_available());
        assert!(tts.synthesize("Fish").await.is_none());
    }
}
