//! Amplitude-driven cave corridor
//!
//! While a cave window is open the playfield gets two walls built from
//! three superposed sine waves whose height follows the music. The player
//! must stay inside the corridor; staying near its middle earns a bonus.

use glam::Vec2;

use super::collision::Aabb;
use super::color::Color;
use super::context::SimContext;
use super::particles::ParticleShape;
use super::state::{GameState, HitKind, ScorePopup};
use super::tick::FrameSample;
use crate::host::{SoundEffect, SoundSink};
use crate::tuning::Tuning;

/// Cave boundary curves plus the timers that throttle and debounce them
#[derive(Debug, Clone, Default)]
pub struct CaveState {
    /// Upper wall samples, ascending x
    pub upper: Vec<Vec2>,
    /// Lower wall samples, same x as `upper`
    pub lower: Vec<Vec2>,
    pub active: bool,
    /// Wall-clock time the current window opened
    pub entered_ms: Option<f64>,
    last_regen_ms: Option<f64>,
    last_penalty_ms: Option<f64>,
    last_bonus_ms: Option<f64>,
}

/// Inputs for one regeneration pass
#[derive(Debug, Clone, Copy)]
pub struct CaveShape {
    pub viewport: Vec2,
    /// 0-255
    pub amplitude: f32,
    pub now_ms: f64,
    pub player_width: f32,
    pub desktop: bool,
}

fn cooled_down(last: Option<f64>, now_ms: f64, cooldown_ms: f64) -> bool {
    last.is_none_or(|t| now_ms - t >= cooldown_ms)
}

impl CaveState {
    pub fn enter(&mut self, now_ms: f64) {
        *self = Self {
            active: true,
            entered_ms: Some(now_ms),
            ..Self::default()
        };
    }

    pub fn exit(&mut self) {
        *self = Self::default();
    }

    /// Collisions are suppressed for a grace period after the cave opens
    pub fn in_warning(&self, now_ms: f64, warning_ms: f64) -> bool {
        self.entered_ms.is_some_and(|t| now_ms - t < warning_ms)
    }

    /// 0 -> 1 over the warning period, used to ramp visual urgency
    pub fn warning_intensity(&self, now_ms: f64, warning_ms: f64) -> f32 {
        match self.entered_ms {
            Some(t) if warning_ms > 0.0 => ((now_ms - t) / warning_ms).clamp(0.0, 1.0) as f32,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn needs_regen(&self, now_ms: f64, interval_ms: f64) -> bool {
        self.upper.is_empty() || cooled_down(self.last_regen_ms, now_ms, interval_ms)
    }

    /// Rebuild both walls from the current amplitude
    pub fn regenerate(&mut self, shape: CaveShape, tuning: &Tuning) {
        let CaveShape {
            viewport,
            amplitude,
            now_ms,
            player_width,
            desktop,
        } = shape;
        let step = tuning.cave_step.max(1.0);
        let center = viewport.y * 0.5;
        let t = (now_ms / 1000.0) as f32;
        let level = (amplitude / 255.0).clamp(0.0, 1.0);
        let max_disp = viewport.y
            * if desktop {
                tuning.cave_max_displacement_desktop
            } else {
                tuning.cave_max_displacement_touch
            };
        let min_cave_height = player_width * tuning.cave_min_height_factor;
        let half_extra = viewport.y * tuning.cave_extra_height * 0.5;

        let samples = (viewport.x / step).ceil().max(1.0) as usize;
        self.upper.clear();
        self.lower.clear();
        for i in 0..=samples {
            let x = (i as f32 * step).min(viewport.x);
            let wave = (x * 0.008 + t * 1.3).sin() * 0.55
                + (x * 0.021 - t * 0.9).sin() * 0.3
                + (x * 0.043 + t * 2.1).sin() * 0.15;
            let d = (wave * level * viewport.y * 0.5).clamp(-max_disp, max_disp);
            self.upper.push(Vec2::new(x, center - d - min_cave_height - half_extra));
            self.lower.push(Vec2::new(x, center - d + min_cave_height + half_extra));
        }
        self.last_regen_ms = Some(now_ms);
    }

    /// Interpolated (upper, lower) wall y at `x`
    pub fn boundary_at(&self, x: f32) -> Option<(f32, f32)> {
        for (i, pair) in self.upper.windows(2).enumerate() {
            let (x0, x1) = (pair[0].x, pair[1].x);
            if x < x0 || x > x1 {
                continue;
            }
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            let up = crate::lerp(pair[0].y, pair[1].y, t);
            let low = crate::lerp(self.lower[i].y, self.lower[i + 1].y, t);
            return Some((up, low));
        }
        None
    }

    /// Player box pokes through either wall at its left edge
    pub fn check_wall_collision(&self, player: &Aabb) -> bool {
        match self.boundary_at(player.left()) {
            Some((up, low)) => player.top() < up || player.bottom() > low,
            None => false,
        }
    }

    /// 1.0 when `center` sits on the corridor midline, falling to 0 at the walls
    pub fn proximity(&self, center: Vec2) -> Option<f32> {
        let (idx, up) = self
            .upper
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1.x - center.x).abs().total_cmp(&(b.1.x - center.x).abs()))?;
        let low = self.lower.get(idx)?;
        let mid = (up.y + low.y) * 0.5;
        let max_distance = (low.y - up.y) * 0.5;
        if max_distance <= 0.0 {
            return Some(0.0);
        }
        Some((1.0 - (center.y - mid).abs() / max_distance).clamp(0.0, 1.0))
    }
}

/// Run the cave for one frame: open/close with the level's windows,
/// regenerate on its interval, then apply wall penalties and centring bonus.
pub fn update_cave(
    state: &mut GameState,
    ctx: &SimContext,
    frame: &FrameSample,
    sounds: &mut dyn SoundSink,
) {
    if state.is_ended() {
        return;
    }
    let tuning = &ctx.tuning;
    let now = frame.now_ms;

    if !ctx.script.cave_active(frame.audio_time) {
        if state.cave.active {
            log::info!("Leaving cave at {:.1}s", frame.audio_time);
            state.cave.exit();
        }
        return;
    }
    if !state.cave.active {
        log::info!("Entering cave at {:.1}s", frame.audio_time);
        state.cave.enter(now);
    }

    if state.cave.needs_regen(now, tuning.cave_regen_interval_ms) {
        state.cave.regenerate(
            CaveShape {
                viewport: frame.viewport,
                amplitude: frame.amplitude,
                now_ms: now,
                player_width: state.player.size.x,
                desktop: ctx.settings.is_desktop(),
            },
            tuning,
        );
    }

    let player_box = state.player.bounds();
    if !state.cave.in_warning(now, tuning.cave_warning_ms)
        && state.cave.check_wall_collision(&player_box)
        && cooled_down(state.cave.last_penalty_ms, now, tuning.cave_penalty_cooldown_ms)
    {
        state.cave.last_penalty_ms = Some(now);
        state.reset_streak();
        state.deduct_score(tuning.cave_score_penalty);
        let center = state.player.center();
        state
            .particles
            .burst(&mut state.rng, center, 10, Color::DAMAGE, ParticleShape::Circle);
        state.player.mark_hit(now, HitKind::CaveWall);
        ctx.mixer.play(sounds, SoundEffect::CaveScrape);
        log::debug!("Cave wall scrape, health {}", state.health);
        if state.damage(tuning.cave_health_penalty) {
            return;
        }
    }

    let Some(proximity) = state.cave.proximity(state.player.center()) else {
        return;
    };
    if proximity > 0.5
        && cooled_down(state.cave.last_bonus_ms, now, tuning.cave_bonus_cooldown_ms)
    {
        state.cave.last_bonus_ms = Some(now);
        let bonus = (proximity * 50.0).floor() as u64;
        state.add_score(bonus);
        if ctx.settings.score_popups && bonus > 0 {
            let at = state.player.pos + Vec2::new(state.player.size.x, 0.0);
            state.popups.push(ScorePopup::new(at, format!("+{bonus}"), false));
        }
    }
}
