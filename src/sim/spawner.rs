//! Beat-gated probabilistic spawning
//!
//! On a detected beat every enabled category rolls against its own chance.
//! Scripted spawn events fire independently of beats. A category whose
//! sprite hasn't loaded yet is skipped without complaint.

use glam::Vec2;
use rand::Rng;

use super::context::SimContext;
use super::level::{LevelScript, LevelToggles};
use super::state::{GameItem, GameState, ItemKind, Sprite};
use crate::host::{AssetTable, assets::names};
use crate::tuning::Tuning;

/// Threshold + refractory beat detector
#[derive(Debug, Clone, PartialEq)]
pub struct BeatDetector {
    pub threshold: f32,
    pub cooldown_ms: f64,
    last_beat_ms: Option<f64>,
}

impl BeatDetector {
    pub fn new(threshold: f32, cooldown_ms: f64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_beat_ms: None,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.beat_threshold, tuning.beat_cooldown_ms)
    }

    /// True when `amplitude` is above threshold and the cooldown has elapsed.
    /// Only a detected beat restarts the cooldown.
    pub fn detect(&mut self, amplitude: f32, now_ms: f64) -> bool {
        if amplitude <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_beat_ms {
            if now_ms - last < self.cooldown_ms {
                return false;
            }
        }
        self.last_beat_ms = Some(now_ms);
        true
    }

    pub fn last_beat_ms(&self) -> Option<f64> {
        self.last_beat_ms
    }

    pub fn reset(&mut self) {
        self.last_beat_ms = None;
    }
}

/// Per-category spawn parameters
#[derive(Debug, Clone, Copy)]
struct SpawnProfile {
    kind: ItemKind,
    asset: &'static str,
    /// Chance at progress 0
    chance: f64,
    /// Added chance at progress 1
    progress_scale: f64,
    /// Width range (px); height follows `aspect`
    width: (f32, f32),
    aspect: f32,
    /// Leftward speed range (px per frame unit)
    speed: (f32, f32),
}

impl SpawnProfile {
    fn chance_at(&self, progress: f64) -> f64 {
        (self.chance + self.progress_scale * progress.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    }
}

const PROFILES: [SpawnProfile; 7] = [
    SpawnProfile {
        kind: ItemKind::Trash,
        asset: names::TRASH,
        chance: 0.55,
        progress_scale: 0.0,
        width: (28.0, 44.0),
        aspect: 1.0,
        speed: (2.0, 3.2),
    },
    SpawnProfile {
        kind: ItemKind::Bottle,
        asset: names::BOTTLE,
        chance: 0.25,
        progress_scale: 0.0,
        width: (18.0, 26.0),
        aspect: 2.2,
        speed: (2.0, 3.0),
    },
    SpawnProfile {
        kind: ItemKind::Can,
        asset: names::CAN,
        chance: 0.25,
        progress_scale: 0.0,
        width: (20.0, 28.0),
        aspect: 1.4,
        speed: (2.2, 3.2),
    },
    SpawnProfile {
        kind: ItemKind::Bag,
        asset: names::BAG,
        chance: 0.2,
        progress_scale: 0.0,
        width: (30.0, 46.0),
        aspect: 1.1,
        speed: (1.6, 2.6),
    },
    SpawnProfile {
        kind: ItemKind::Rock,
        asset: names::ROCK,
        chance: 0.15,
        progress_scale: 0.25,
        width: (40.0, 70.0),
        aspect: 0.8,
        speed: (1.8, 2.6),
    },
    SpawnProfile {
        kind: ItemKind::Gull,
        asset: names::GULL,
        chance: 0.1,
        progress_scale: 0.3,
        width: (48.0, 64.0),
        aspect: 0.6,
        speed: (3.0, 4.5),
    },
    SpawnProfile {
        kind: ItemKind::FishHook,
        asset: names::HOOK,
        chance: 0.08,
        progress_scale: 0.22,
        width: (22.0, 30.0),
        aspect: 3.0,
        speed: (1.8, 2.4),
    },
];

/// Gull flap frame length (ms)
const GULL_FRAME_MS: f64 = 90.0;

fn profile(kind: ItemKind) -> &'static SpawnProfile {
    // PROFILES covers every ItemKind in declaration order
    &PROFILES[ItemKind::ALL.iter().position(|k| *k == kind).unwrap_or(0)]
}

/// Chance that a category spawns on one beat at the given song progress
pub fn spawn_chance(kind: ItemKind, progress: f64) -> f64 {
    profile(kind).chance_at(progress)
}

fn sprite_for<R: Rng>(assets: &AssetTable, asset: &str, rng: &mut R) -> Option<Sprite> {
    if let Some(anim) = assets.animator(asset, GULL_FRAME_MS) {
        let phase = rng.random_range(0.0..GULL_FRAME_MS * anim.frame_count() as f64);
        return Some(Sprite::Animated(anim.with_phase(phase)));
    }
    assets.image(asset).map(Sprite::Image)
}

fn asset_loaded(assets: &AssetTable, asset: &str) -> bool {
    assets.has_image(asset) || assets.has_animation(asset)
}

/// Vertical spot for a gull that keeps clear of other hazards near the
/// right edge. Falls back to any position after `spawn_retry_limit` tries.
fn spaced_hazard_y(state: &mut GameState, height: f32, viewport: Vec2, tuning: &Tuning) -> f32 {
    let max_y = (viewport.y - height).max(0.0);
    let edge = viewport.x - tuning.near_edge_band;
    for _ in 0..tuning.spawn_retry_limit {
        let y = state.rng.random_range(0.0..=max_y);
        let clear = state
            .items
            .iter()
            .filter(|item| item.kind.is_hazard() && item.pos.x >= edge)
            .all(|item| (item.pos.y - y).abs() >= tuning.min_hazard_gap);
        if clear {
            return y;
        }
    }
    log::debug!("No spaced slot for hazard, placing freely");
    state.rng.random_range(0.0..=max_y)
}

/// Append one item of `kind` at the right edge (offset by `x_offset`).
/// Returns false when its asset isn't loaded.
fn spawn_item(
    state: &mut GameState,
    ctx: &SimContext,
    kind: ItemKind,
    progress: f64,
    viewport: Vec2,
    x_offset: f32,
) -> bool {
    let profile = profile(kind);
    if !asset_loaded(&ctx.assets, profile.asset) {
        return false;
    }
    let tuning = &ctx.tuning;

    let width = state.rng.random_range(profile.width.0..=profile.width.1);
    let size = Vec2::new(width, width * profile.aspect);
    let speed = -state.rng.random_range(profile.speed.0..=profile.speed.1);
    let max_y = (viewport.y - size.y).max(0.0);
    let y = match kind {
        ItemKind::Gull => spaced_hazard_y(state, size.y, viewport, tuning),
        // hooks hang in the upper band so their barb stays reachable
        ItemKind::FishHook => {
            let lo = viewport.y * 0.1;
            let hi = (viewport.y * 0.5).max(lo);
            state.rng.random_range(lo..=hi)
        }
        _ => state.rng.random_range(0.0..=max_y),
    };

    let id = state.next_entity_id();
    let mut item = GameItem::new(id, kind, Vec2::new(viewport.x + x_offset, y), size, speed);
    item.sprite = sprite_for(&ctx.assets, profile.asset, &mut state.rng);
    item.phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    if kind == ItemKind::Bottle || kind == ItemKind::Can {
        item.rotation = state.rng.random_range(-0.6..0.6);
    }
    if matches!(kind, ItemKind::Rock | ItemKind::Gull) && progress > tuning.bob_after_progress {
        item.base_y = Some(y);
    }

    if kind.is_pickup() {
        state.stats.spawned += 1;
    }
    log::debug!("Spawned {:?} #{} at y={:.0}", kind, id, y);
    state.items.push(item);
    true
}

/// Roll every enabled category once. Returns the number of items spawned.
pub fn spawn_on_beat(
    state: &mut GameState,
    ctx: &SimContext,
    toggles: LevelToggles,
    progress: f64,
    viewport: Vec2,
) -> usize {
    let mut spawned = 0;
    for profile in PROFILES.iter().filter(|p| p.kind != ItemKind::FishHook) {
        if !toggles.allows(profile.kind) || !asset_loaded(&ctx.assets, profile.asset) {
            continue;
        }
        if state.rng.random_bool(profile.chance_at(progress))
            && spawn_item(state, ctx, profile.kind, progress, viewport, 0.0)
        {
            spawned += 1;
        }
    }

    // Hooks roll on their own, outside the category loop
    let hook = profile(ItemKind::FishHook);
    if toggles.hooks
        && asset_loaded(&ctx.assets, hook.asset)
        && state.rng.random_bool(hook.chance_at(progress))
        && spawn_item(state, ctx, ItemKind::FishHook, progress, viewport, 0.0)
    {
        spawned += 1;
    }
    spawned
}

/// Load a level's scripted spawns into the state, all re-armed and in time order
pub fn arm_scripted_spawns(state: &mut GameState, script: &LevelScript) {
    state.scripted_spawns = script.spawns.clone();
    state.scripted_spawns.sort_by(|a, b| a.time.total_cmp(&b.time));
    for event in &mut state.scripted_spawns {
        event.triggered = false;
    }
}

/// Fire every scripted spawn whose time has come, each exactly once
pub fn fire_scripted_spawns(
    state: &mut GameState,
    ctx: &SimContext,
    audio_time: f64,
    progress: f64,
    viewport: Vec2,
) -> usize {
    let mut due = Vec::new();
    for event in &mut state.scripted_spawns {
        if event.time > audio_time {
            break;
        }
        if !event.triggered {
            event.triggered = true;
            due.push((event.kind, event.count));
        }
    }

    let mut spawned = 0;
    for (kind, count) in due {
        let spacing = profile(kind).width.1 + 16.0;
        for i in 0..count {
            if spawn_item(state, ctx, kind, progress, viewport, i as f32 * spacing) {
                spawned += 1;
            }
        }
    }
    spawned
}
