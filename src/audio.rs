//! Sinks for the engine's fire-and-forget effects.

use little_learners_board::{Effect, SoundCue};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Receives sound cues and celebrations. Implementations must not block.
pub trait SoundSink: Send + Sync {
    /// Plays a cue.
    fn play(&self, cue: SoundCue);

    /// Celebrates a winner.
    fn celebrate(&self, _player_id: u32) {}

    /// Dispatches one engine effect.
    fn dispatch(&self, effect: &Effect) {
        match effect {
            Effect::Sound(cue) => self.play(*cue),
            Effect::Celebrate { player_id } => self.celebrate(*player_id),
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play(&self, _cue: SoundCue) {}
}

/// Logs cues at debug level and celebrations at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SoundSink for LogSink {
    fn play(&self, cue: SoundCue) {
        debug!(%cue, length_secs = cue.length_secs(), "Sound cue");
    }

    fn celebrate(&self, player_id: u32) {
        info!(player_id, "Confetti!");
    }
}

/// Forwards effects to a channel, for frontends that show them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Effect>,
}

impl ChannelSink {
    /// Creates the sink and its receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Effect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SoundSink for ChannelSink {
    fn play(&self, cue: SoundCue) {
        let _ = self.tx.send(Effect::Sound(cue));
    }

    fn celebrate(&self, player_id: u32) {
        let _ = self.tx.send(Effect::Celebrate { player_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.dispatch(&Effect::Sound(SoundCue::Win));
        sink.dispatch(&Effect::Celebrate { player_id: 2 });
        assert_eq!(rx.try_recv().unwrap(), Effect::Sound(SoundCue::Win));
        assert_eq!(rx.try_recv().unwrap(), Effect::Celebrate { player_id: 2 });
    }

    #[test]
    fn test_closed_channel_is_harmless() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.play(SoundCue::Step);
    }
}
