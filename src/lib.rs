//! Tide Runner - audio-driven ocean cleanup arcade core
//!
//! Core modules:
//! - `sim`: Per-frame simulation (spawning, collisions, cave, particles, theme)
//! - `scheduler`: Frame loop orchestration and delta-time handling
//! - `host`: Collaborator traits the embedding application implements
//! - `renderer`: Draw calls against a caller-supplied 2D surface
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod host;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use scheduler::{FrameRequest, FrameScheduler};
pub use settings::{InputMode, QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame factor baseline: one unit of per-frame motion per 1/120 s
    pub const FRAME_UNITS_PER_SECOND: f32 = 120.0;
    /// Deltas above this (seconds) are treated as a stalled frame
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Delta substituted for a stalled frame
    pub const NOMINAL_FRAME_DELTA: f32 = 1.0 / 60.0;

    /// Health bounds
    pub const MAX_HEALTH: i32 = 100;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 64.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Player x as a fraction of viewport width
    pub const PLAYER_X_FRACTION: f32 = 0.15;

    /// Pickups needed per multiplier step
    pub const STREAK_STEP: u32 = 5;
    /// Multiplier ceiling
    pub const MAX_MULTIPLIER: u32 = 10;
    /// Base points per pickup (before multiplier)
    pub const PICKUP_POINTS: u64 = 10;
}

/// Convert a wall-clock delta in seconds into frame units
#[inline]
pub fn frame_factor(dt: f32) -> f32 {
    dt * consts::FRAME_UNITS_PER_SECOND
}

/// Linear interpolation that is exact at both ends
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
