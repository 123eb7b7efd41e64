//! Audio-facing collaborators
//!
//! The core never decodes or synthesizes audio. It polls a playback clock,
//! samples the live average amplitude, and asks the host to play short
//! sound effects at a mixed volume.

use crate::error::SimError;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Trash collected
    Pickup,
    /// Player hit a hazard
    Hit,
    /// Player scraped a cave wall
    CaveScrape,
    /// Streak reached a new multiplier step
    StreakBonus,
    /// Level ended (health or song finished)
    LevelEnd,
}

/// Continuously readable playback position of the backing track
pub trait PlaybackClock {
    /// Current position in seconds, `None` while no track is attached
    fn position(&self) -> Option<f64>;
    /// Track duration in seconds, `None` until metadata is available
    fn duration(&self) -> Option<f64>;
}

/// Live average frequency-domain amplitude of the track (0-255)
pub trait AmplitudeSource {
    fn sample(&mut self) -> f32;
}

impl<F: FnMut() -> f32> AmplitudeSource for F {
    fn sample(&mut self) -> f32 {
        self()
    }
}

/// Host-side sound effect playback
pub trait SoundSink {
    /// Whether the effect's buffer is decoded and playable
    fn is_ready(&self, _effect: SoundEffect) -> bool {
        true
    }

    /// Start playback at the given linear volume (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), SimError>;
}

/// Sink that drops every effect (headless runs, tests)
#[derive(Debug, Default)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) -> Result<(), SimError> {
        Ok(())
    }
}

/// Clock whose values are set directly by the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    pub position: Option<f64>,
    pub duration: Option<f64>,
}

impl ManualClock {
    pub fn new(duration: f64) -> Self {
        Self {
            position: Some(0.0),
            duration: Some(duration),
        }
    }

    pub fn advance(&mut self, secs: f64) {
        if let Some(pos) = self.position.as_mut() {
            *pos += secs;
        }
    }
}

impl PlaybackClock for ManualClock {
    fn position(&self) -> Option<f64> {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

/// Amplitude source that replays a fixed sequence, looping at the end
#[derive(Debug, Clone)]
pub struct ScriptedAmplitude {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedAmplitude {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl AmplitudeSource for ScriptedAmplitude {
    fn sample(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Volume mixer for sound effects
#[derive(Debug, Clone)]
pub struct SfxMixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for SfxMixer {
    fn default() -> Self {
        Self::new(0.8, 1.0)
    }
}

impl SfxMixer {
    pub fn new(master_volume: f32, sfx_volume: f32) -> Self {
        Self {
            master_volume: master_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all effects
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play an effect if the host has it ready. Failures are logged, never returned:
    /// a dropped sound effect must not interrupt the frame.
    pub fn play(&self, sink: &mut dyn SoundSink, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 || !sink.is_ready(effect) {
            return;
        }
        if let Err(err) = sink.play(effect, vol) {
            log::warn!("{err}");
        }
    }
}
