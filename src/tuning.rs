//! Data-driven game balance
//!
//! Every gameplay constant that designers tweak lives here, so a level
//! build can ship a `tuning.json` without touching code.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Beat detection ===
    /// Average amplitude (0-255) that counts as a beat
    pub beat_threshold: f32,
    /// Refractory period between beats (wall-clock ms)
    pub beat_cooldown_ms: f64,

    // === Difficulty ramp ===
    /// Speed multiplier growth per second of audio
    pub speed_ramp_per_sec: f32,
    /// Speed multiplier ceiling
    pub max_speed_multiplier: f32,

    // === Scoring ===
    pub hit_score_penalty: u64,
    pub hit_health_penalty: i32,
    pub pickup_health_bonus: i32,

    // === Spawning ===
    /// Minimum vertical gap between a new gull and near-edge hazards (px)
    pub min_hazard_gap: f32,
    /// Horizontal band at the right edge considered "near-edge" (px)
    pub near_edge_band: f32,
    /// Attempts before falling back to an unconstrained position
    pub spawn_retry_limit: u32,

    // === Bobbing ===
    /// Song progress after which hazards may bob
    pub bob_after_progress: f64,
    /// Bob offset (px) at full amplitude
    pub bob_amplitude: f32,

    // === Captions ===
    /// Caption lifetime in frame units
    pub caption_lifetime: f32,

    // === Cave ===
    pub cave_regen_interval_ms: f64,
    pub cave_step: f32,
    /// Grace period after the cave opens, collisions suppressed (ms)
    pub cave_warning_ms: f64,
    pub cave_penalty_cooldown_ms: f64,
    pub cave_bonus_cooldown_ms: f64,
    pub cave_score_penalty: u64,
    pub cave_health_penalty: i32,
    /// Corridor half-height as a multiple of player width
    pub cave_min_height_factor: f32,
    /// Extra corridor height as a fraction of viewport height
    pub cave_extra_height: f32,
    /// Max wall displacement as a fraction of viewport height (desktop)
    pub cave_max_displacement_desktop: f32,
    /// Max wall displacement as a fraction of viewport height (touch)
    pub cave_max_displacement_touch: f32,

    // === Player ===
    /// Steering smoothing per frame unit (0-1)
    pub steer_smoothing: f32,
    /// Hit flash length (ms)
    pub hit_flash_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            beat_threshold: 120.0,
            beat_cooldown_ms: 500.0,

            speed_ramp_per_sec: 0.004,
            max_speed_multiplier: 1.8,

            hit_score_penalty: 20,
            hit_health_penalty: 10,
            pickup_health_bonus: 1,

            min_hazard_gap: 110.0,
            near_edge_band: 240.0,
            spawn_retry_limit: 10,

            bob_after_progress: 0.5,
            bob_amplitude: 24.0,

            caption_lifetime: 360.0,

            cave_regen_interval_ms: 50.0,
            cave_step: 20.0,
            cave_warning_ms: 2000.0,
            cave_penalty_cooldown_ms: 500.0,
            cave_bonus_cooldown_ms: 500.0,
            cave_score_penalty: 15,
            cave_health_penalty: 5,
            cave_min_height_factor: 0.9,
            cave_extra_height: 0.12,
            cave_max_displacement_desktop: 0.12,
            cave_max_displacement_touch: 0.2,

            steer_smoothing: 0.12,
            hit_flash_ms: 300.0,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let tuning = Tuning::default();
        assert_eq!(tuning.beat_cooldown_ms, 500.0);
        assert_eq!(tuning.spawn_retry_limit, 10);
        assert_eq!(tuning.cave_penalty_cooldown_ms, 500.0);
    }

    #[test]
    fn test_override_single_field() {
        let tuning = Tuning::from_json(r#"{"beat_threshold": 90.0}"#).unwrap();
        assert_eq!(tuning.beat_threshold, 90.0);
        assert_eq!(tuning.hit_health_penalty, 10);
    }
}
