//! Collaborator interfaces supplied by the embedding application
//!
//! Everything the core reads from or publishes to the outside world goes
//! through these types, so the tick can be driven by real browser plumbing
//! or by scripted values in tests.

pub mod assets;
pub mod audio;

pub use assets::{AssetTable, FrameAnimator, ImageHandle};
pub use audio::{
    AmplitudeSource, ManualClock, PlaybackClock, ScriptedAmplitude, SfxMixer, SilentSink,
    SoundEffect, SoundSink,
};

use crate::renderer::DrawSurface;

/// Pointer/touch input, as captured by the host
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Vertical position in surface pixels
    pub y: Option<f32>,
    /// Pointer is actively steering (button held / finger down)
    pub active: bool,
}

/// One-way setters the UI layer observes. Only snapshots cross this boundary.
pub trait ScoreObserver {
    fn set_score(&mut self, score: u64);
    fn set_health(&mut self, health: i32);
    fn set_level_ended(&mut self, ended: bool);
}

/// Observer that just keeps the latest published values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub score: u64,
    pub health: i32,
    pub level_ended: bool,
}

impl ScoreObserver for ScoreSnapshot {
    fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    fn set_health(&mut self, health: i32) {
        self.health = health;
    }

    fn set_level_ended(&mut self, ended: bool) {
        self.level_ended = ended;
    }
}

/// Borrowed collaborators for a single frame
pub struct FrameIo<'a> {
    pub clock: &'a dyn PlaybackClock,
    pub amplitude: &'a mut dyn AmplitudeSource,
    pub pointer: PointerState,
    pub sounds: &'a mut dyn SoundSink,
    pub observer: &'a mut dyn ScoreObserver,
    pub surface: &'a mut dyn DrawSurface,
}
