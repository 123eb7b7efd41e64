//! Variable-step simulation tick
//!
//! One call advances the whole game by a measured delta. Sub-steps always
//! run in the same order: transitions, spawner, items, cave, particles,
//! popups.

use glam::Vec2;

use super::cave::update_cave;
use super::color::{Color, streak_color};
use super::context::SimContext;
use super::particles::ParticleShape;
use super::spawner::{fire_scripted_spawns, spawn_on_beat};
use super::state::{EndReason, GameItem, GameState, HitKind, ItemKind, ScorePopup};
use crate::consts::STREAK_STEP;
use crate::host::{PointerState, SoundEffect, SoundSink};
use crate::tuning::Tuning;

/// Inputs for a single tick, sampled by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Clamped delta time (s)
    pub dt: f32,
    /// Playback position (s)
    pub audio_time: f64,
    /// Track duration (s), 0 if unknown
    pub duration: f64,
    /// Average amplitude (0-255)
    pub amplitude: f32,
    /// Wall clock (ms)
    pub now_ms: f64,
    /// Surface size, re-read every frame
    pub viewport: Vec2,
    pub pointer: PointerState,
}

impl FrameSample {
    pub fn frame_factor(&self) -> f32 {
        crate::frame_factor(self.dt)
    }

    /// Song progress 0-1
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.audio_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Global scroll speed factor: grows slowly with audio time, capped
pub fn speed_multiplier(audio_time: f64, tuning: &Tuning) -> f32 {
    let t = audio_time.max(0.0) as f32;
    (1.0 + t * tuning.speed_ramp_per_sec).min(tuning.max_speed_multiplier)
}

/// Advance the game by one frame
pub fn step(
    state: &mut GameState,
    ctx: &mut SimContext,
    frame: &FrameSample,
    sounds: &mut dyn SoundSink,
) {
    if state.is_ended() {
        return;
    }
    let ff = frame.frame_factor();
    state.frames += 1;
    state.audio_time = frame.audio_time;
    state.push_amplitude(frame.amplitude);

    ctx.transitions.update(frame.audio_time, ff, &mut ctx.theme);
    let ctx = &*ctx;

    // Spawner
    let toggles = ctx.script.toggles_at(frame.audio_time);
    let progress = frame.progress();
    fire_scripted_spawns(state, ctx, frame.audio_time, progress, frame.viewport);
    if state.beat.detect(frame.amplitude, frame.now_ms) {
        let spawned = spawn_on_beat(state, ctx, toggles, progress, frame.viewport);
        log::debug!(
            "Beat at {:.2}s (amp {:.0}), spawned {}",
            frame.audio_time,
            frame.amplitude,
            spawned
        );
    }

    // Player + items
    state
        .player
        .steer(frame.pointer, frame.viewport, ff, ctx.tuning.steer_smoothing);
    state
        .player
        .update_effects(ff, frame.now_ms, ctx.tuning.hit_flash_ms);
    update_items(state, ctx, frame, sounds);
    if state.is_ended() {
        return;
    }

    update_cave(state, ctx, frame, sounds);
    if state.is_ended() {
        return;
    }

    // Particles
    if toggles.bubbles {
        let tail = state.player.pos + Vec2::new(0.0, state.player.size.y * 0.5);
        state.particles.trail(&mut state.rng, tail);
    }
    state.particles.update(ff);

    state.popups.retain_mut(|popup| popup.update(ff));

    if frame.duration > 0.0 && frame.audio_time >= frame.duration {
        state.end_level(EndReason::SongFinished);
    }
}

/// Move, bob, cull and collide every item against the player.
/// Stops as soon as a hit ends the level.
fn update_items(
    state: &mut GameState,
    ctx: &SimContext,
    frame: &FrameSample,
    sounds: &mut dyn SoundSink,
) {
    let ff = frame.frame_factor();
    let speed = speed_multiplier(frame.audio_time, &ctx.tuning);
    let secs = (frame.now_ms / 1000.0) as f32;
    let bob = ctx.tuning.bob_amplitude * (frame.amplitude / 255.0).clamp(0.0, 1.0);
    let player_box = state.player.bounds();

    let mut i = 0;
    while i < state.items.len() {
        let item = &mut state.items[i];
        item.pos.x += item.speed * speed * ff;
        if item.kind == ItemKind::FishHook {
            item.rotation = (secs * 2.0 + item.phase).sin() * 0.35;
        }
        if let Some(base_y) = item.base_y {
            item.pos.y = base_y + (secs * 3.0 + item.phase).sin() * bob;
        }

        if item.is_off_screen() {
            let gone = state.items.swap_remove(i);
            if gone.kind.is_pickup() {
                state.stats.missed += 1;
            }
            continue;
        }
        if !item.hit_box().overlaps(&player_box) {
            i += 1;
            continue;
        }

        let hit = state.items.swap_remove(i);
        if hit.kind.is_pickup() {
            collect(state, ctx, &hit, frame, sounds);
        } else if strike(state, ctx, &hit, frame, sounds) {
            return;
        }
    }
}

fn collect(
    state: &mut GameState,
    ctx: &SimContext,
    item: &GameItem,
    frame: &FrameSample,
    sounds: &mut dyn SoundSink,
) {
    let points = state.award_pickup();
    state.stats.collected += 1;
    state.heal(ctx.tuning.pickup_health_bonus);

    let color = streak_color(state.streak);
    state
        .particles
        .burst(&mut state.rng, item.bounds().center(), 12, color, ParticleShape::Heart);

    let milestone = state.streak % STREAK_STEP == 0;
    if ctx.settings.score_popups {
        state
            .popups
            .push(ScorePopup::new(item.pos, format!("+{points}"), false));
        if milestone {
            let at = state.player.pos - Vec2::new(0.0, 24.0);
            state.popups.push(ScorePopup::new(
                at,
                format!("{} STREAK! x{}", state.streak, state.multiplier),
                true,
            ));
        }
    }

    ctx.mixer.play(sounds, SoundEffect::Pickup);
    if milestone {
        ctx.mixer.play(sounds, SoundEffect::StreakBonus);
    }
    log::trace!("Picked up {:?} for {} at {:.0}ms", item.kind, points, frame.now_ms);
}

/// Apply a hazard hit. Returns true if it ended the level.
fn strike(
    state: &mut GameState,
    ctx: &SimContext,
    item: &GameItem,
    frame: &FrameSample,
    sounds: &mut dyn SoundSink,
) -> bool {
    let tuning = &ctx.tuning;
    state.reset_streak();
    state.deduct_score(tuning.hit_score_penalty);
    state.particles.burst(
        &mut state.rng,
        item.hit_box().center(),
        16,
        Color::DAMAGE,
        ParticleShape::Circle,
    );
    state.player.mark_hit(frame.now_ms, HitKind::Hazard);
    if ctx.settings.score_popups {
        state.popups.push(ScorePopup::new(
            state.player.pos,
            format!("-{}", tuning.hit_score_penalty),
            false,
        ));
    }
    ctx.mixer.play(sounds, SoundEffect::Hit);
    let ended = state.damage(tuning.hit_health_penalty);
    log::debug!("Hit {:?}, health {}", item.kind, state.health);
    ended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_HEALTH;
    use crate::host::{AssetTable, SilentSink};
    use crate::settings::Settings;
    use crate::sim::events::TimedColorEvent;
    use crate::sim::level::{LevelId, LevelScript};
    use crate::sim::spawner::BeatDetector;
    use crate::sim::state::GamePhase;
    use proptest::prelude::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn setup() -> (GameState, SimContext) {
        let tuning = Tuning::default();
        let state = GameState::new(1234, VIEWPORT, 128, BeatDetector::from_tuning(&tuning));
        let ctx = SimContext::new(
            LevelScript::builtin(LevelId::Shallows),
            Settings::default(),
            tuning,
            AssetTable::placeholder(),
        );
        (state, ctx)
    }

    fn frame(audio_time: f64) -> FrameSample {
        FrameSample {
            dt: 1.0 / 120.0,
            audio_time,
            duration: 180.0,
            amplitude: 0.0,
            now_ms: audio_time * 1000.0,
            viewport: VIEWPORT,
            pointer: PointerState::default(),
        }
    }

    /// An item sitting on top of the player
    fn on_player(state: &mut GameState, kind: ItemKind) {
        let id = state.next_entity_id();
        let pos = state.player.pos + Vec2::new(10.0, 5.0);
        state
            .items
            .push(GameItem::new(id, kind, pos, Vec2::new(30.0, 30.0), -1.0));
    }

    #[test]
    fn test_items_scroll_left() {
        let (mut state, mut ctx) = setup();
        let size = Vec2::new(20.0, 20.0);
        let rock = GameItem::new(1, ItemKind::Rock, Vec2::new(700.0, 10.0), size, -2.0);
        state.items.push(rock);
        step(&mut state, &mut ctx, &frame(0.0), &mut SilentSink);
        assert!((state.items[0].pos.x - 698.0).abs() < 1e-4);
    }

    #[test]
    fn test_pickup_awards_points() {
        let (mut state, mut ctx) = setup();
        state.health = 50;
        on_player(&mut state, ItemKind::Trash);
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);

        assert!(state.items.is_empty());
        assert_eq!(state.score, 10);
        assert_eq!(state.streak, 1);
        assert_eq!(state.health, 51);
        assert_eq!(state.stats.collected, 1);
        assert_eq!(state.popups.len(), 1);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_fifth_pickup_shows_streak_bonus() {
        let (mut state, mut ctx) = setup();
        state.streak = 4;
        on_player(&mut state, ItemKind::Can);
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);

        assert_eq!(state.multiplier, 2);
        assert_eq!(state.score, 20);
        assert!(state.popups.iter().any(|p| p.bonus));
    }

    #[test]
    fn test_obstacle_resets_streak_and_penalizes() {
        let (mut state, mut ctx) = setup();
        state.streak = 7;
        state.multiplier = 2;
        state.score = 15;
        on_player(&mut state, ItemKind::Rock);
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);

        assert_eq!(state.streak, 0);
        assert_eq!(state.multiplier, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, MAX_HEALTH - 10);
        assert!(state.player.hit.is_some());
        assert!(state.player.spin > 0.0);
    }

    #[test]
    fn test_fatal_hit_ends_level_and_freezes_state() {
        let (mut state, mut ctx) = setup();
        state.health = 10;
        on_player(&mut state, ItemKind::Rock);
        on_player(&mut state, ItemKind::Gull);
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);

        assert_eq!(state.health, 0);
        assert_eq!(state.phase, GamePhase::Ended(EndReason::OutOfHealth));
        // loop stopped after the fatal hit, second hazard untouched
        assert_eq!(state.items.len(), 1);

        let frames = state.frames;
        let remaining = state.items[0].pos;
        step(&mut state, &mut ctx, &frame(1.1), &mut SilentSink);
        assert_eq!(state.frames, frames);
        assert_eq!(state.items[0].pos, remaining);
    }

    #[test]
    fn test_hook_upper_half_is_harmless() {
        let (mut state, mut ctx) = setup();
        // barb half sits entirely below the player
        let pos = Vec2::new(state.player.pos.x + 10.0, state.player.pos.y);
        let size = Vec2::new(20.0, state.player.size.y * 2.0 + 20.0);
        state.items.push(GameItem::new(9, ItemKind::FishHook, pos, size, -0.1));
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);
        assert_eq!(state.health, MAX_HEALTH);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_missed_pickups_are_counted() {
        let (mut state, mut ctx) = setup();
        let size = Vec2::new(30.0, 30.0);
        let trash = GameItem::new(1, ItemKind::Trash, Vec2::new(-29.5, 10.0), size, -1.0);
        let rock = GameItem::new(2, ItemKind::Rock, Vec2::new(-29.5, 500.0), size, -1.0);
        state.items.push(trash);
        state.items.push(rock);
        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);
        assert!(state.items.is_empty());
        assert_eq!(state.stats.missed, 1);
    }

    #[test]
    fn test_song_end_finishes_level() {
        let (mut state, mut ctx) = setup();
        let mut f = frame(180.0);
        f.duration = 180.0;
        step(&mut state, &mut ctx, &f, &mut SilentSink);
        assert_eq!(state.phase, GamePhase::Ended(EndReason::SongFinished));
    }

    #[test]
    fn test_color_event_fires_through_step() {
        let (mut state, mut ctx) = setup();
        let mut script = LevelScript::builtin(LevelId::Shallows);
        script.colors = vec![TimedColorEvent {
            time: 2.0,
            background: Color::hex(0, 0, 0),
            wave: Color::rgba(0, 0, 0, 0.0),
            duration: 1.0,
            triggered: false,
        }];
        ctx.load_level(script);
        let start = ctx.theme;

        step(&mut state, &mut ctx, &frame(1.0), &mut SilentSink);
        assert_eq!(ctx.theme, start);
        // 1s transition is 120 frame units, run a few extra
        for i in 0..130 {
            step(&mut state, &mut ctx, &frame(2.0 + i as f64 / 120.0), &mut SilentSink);
        }
        assert_eq!(ctx.theme.background, Color::hex(0, 0, 0));
    }

    #[test]
    fn test_loud_frames_spawn_on_beats() {
        let (mut state, mut ctx) = setup();
        let mut f = frame(20.0);
        f.amplitude = 250.0;
        for i in 0..40 {
            f.now_ms = 20_000.0 + i as f64 * 250.0;
            step(&mut state, &mut ctx, &f, &mut SilentSink);
        }
        assert!(state.stats.spawned > 0 || !state.items.is_empty());
        assert!(state.beat.last_beat_ms().is_some());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let (mut state, mut ctx) = setup();
            for i in 0..600 {
                let mut f = frame(10.0 + i as f64 / 120.0);
                f.amplitude = if i % 40 < 3 { 200.0 } else { 40.0 };
                step(&mut state, &mut ctx, &f, &mut SilentSink);
            }
            (state.score, state.health, state.items.len(), state.stats)
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn prop_speed_multiplier_monotone(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(speed_multiplier(lo, &tuning) <= speed_multiplier(hi, &tuning));
            prop_assert!(speed_multiplier(hi, &tuning) <= tuning.max_speed_multiplier);
        }
    }
}
