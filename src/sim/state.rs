//! Game state and core simulation types
//!
//! `GameState` is the single mutable root the frame scheduler touches each
//! tick. Nothing outside it holds authoritative gameplay state.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cave::CaveState;
use super::collision::Aabb;
use super::level::SpawnEvent;
use super::particles::ParticleSystem;
use super::spawner::BeatDetector;
use crate::consts::*;
use crate::host::{FrameAnimator, ImageHandle, PointerState};

/// Item categories (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Generic trash pickup
    Trash,
    /// Cosmetic pickup variants, same scoring as trash
    Bottle,
    Can,
    Bag,
    /// Static hazard
    Rock,
    /// Flying hazard, spawned with spacing from other hazards
    Gull,
    /// Swinging hazard, only the lower half of its box hurts
    FishHook,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Trash,
        ItemKind::Bottle,
        ItemKind::Can,
        ItemKind::Bag,
        ItemKind::Rock,
        ItemKind::Gull,
        ItemKind::FishHook,
    ];

    pub fn is_pickup(&self) -> bool {
        matches!(
            self,
            ItemKind::Trash | ItemKind::Bottle | ItemKind::Can | ItemKind::Bag
        )
    }

    pub fn is_hazard(&self) -> bool {
        !self.is_pickup()
    }
}

/// What to draw for an item
#[derive(Debug, Clone)]
pub enum Sprite {
    Image(ImageHandle),
    Animated(FrameAnimator),
}

impl Sprite {
    pub fn frame_at(&self, now_ms: f64) -> Option<ImageHandle> {
        match self {
            Sprite::Image(handle) => Some(*handle),
            Sprite::Animated(anim) => anim.frame_at(now_ms),
        }
    }
}

/// A pickup or hazard scrolling toward the player
#[derive(Debug, Clone)]
pub struct GameItem {
    pub id: u32,
    pub kind: ItemKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed in px per frame unit (negative = leftward)
    pub speed: f32,
    pub rotation: f32,
    pub sprite: Option<Sprite>,
    /// Resting y for bobbing hazards
    pub base_y: Option<f32>,
    /// Per-item phase for swing/bob so neighbours don't move in lockstep
    pub phase: f32,
}

impl GameItem {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            speed,
            rotation: 0.0,
            sprite: None,
            base_y: None,
            phase: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Box used for collision against the player
    pub fn hit_box(&self) -> Aabb {
        match self.kind {
            ItemKind::FishHook => self.bounds().lower_half(),
            _ => self.bounds(),
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Hazard,
    CaveWall,
}

/// Transient damage flash on the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitFlash {
    pub at_ms: f64,
    pub kind: HitKind,
}

/// The player's avatar
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    /// Steering tilt (radians)
    pub tilt: f32,
    /// Spin from the last hit (radians), decays to 0
    pub spin: f32,
    pub hit: Option<HitFlash>,
}

impl Player {
    pub fn new(viewport: Vec2) -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            pos: Vec2::new(
                viewport.x * PLAYER_X_FRACTION,
                (viewport.y - size.y) * 0.5,
            ),
            size,
            vel_y: 0.0,
            tilt: 0.0,
            spin: 0.0,
            hit: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Ease toward the pointer while it is steering, otherwise coast to rest
    pub fn steer(
        &mut self,
        pointer: PointerState,
        viewport: Vec2,
        frame_factor: f32,
        smoothing: f32,
    ) {
        // x tracks the viewport so host resizes keep the avatar in place
        self.pos.x = viewport.x * PLAYER_X_FRACTION;

        let target = match (pointer.active, pointer.y) {
            (true, Some(y)) => Some(y - self.size.y * 0.5),
            _ => None,
        };

        let before = self.pos.y;
        match target {
            Some(target_y) => {
                let blend = (smoothing * frame_factor).clamp(0.0, 1.0);
                self.pos.y += (target_y - self.pos.y) * blend;
            }
            None => {
                self.pos.y += self.vel_y * frame_factor;
            }
        }
        self.pos.y = self.pos.y.clamp(0.0, (viewport.y - self.size.y).max(0.0));

        let moved = self.pos.y - before;
        if target.is_some() {
            self.vel_y = if frame_factor > 0.0 { moved / frame_factor } else { 0.0 };
        } else {
            self.vel_y *= 0.9_f32.powf(frame_factor);
        }
        self.tilt = (self.vel_y * 0.04).clamp(-0.5, 0.5);
    }

    /// Start spin + tint after taking damage
    pub fn mark_hit(&mut self, now_ms: f64, kind: HitKind) {
        self.hit = Some(HitFlash { at_ms: now_ms, kind });
        self.spin = std::f32::consts::TAU;
    }

    /// Decay spin and expire the hit flash
    pub fn update_effects(&mut self, frame_factor: f32, now_ms: f64, flash_ms: f64) {
        if self.spin > 0.0 {
            self.spin = (self.spin - 0.15 * frame_factor).max(0.0);
        }
        if let Some(hit) = self.hit {
            if now_ms - hit.at_ms >= flash_ms {
                self.hit = None;
            }
        }
    }
}

/// Floating "+20" style text
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub text: String,
    pub opacity: f32,
    /// Frame units left
    pub ticks_left: f32,
    pub lifetime: f32,
    /// Streak milestone popups are drawn larger
    pub bonus: bool,
}

/// Default popup lifetime in frame units
pub const POPUP_LIFETIME: f32 = 90.0;

impl ScorePopup {
    pub fn new(pos: Vec2, text: impl Into<String>, bonus: bool) -> Self {
        Self {
            pos,
            text: text.into(),
            opacity: 1.0,
            ticks_left: POPUP_LIFETIME,
            lifetime: POPUP_LIFETIME,
            bonus,
        }
    }

    /// Drift up and fade. Returns false once expired.
    pub fn update(&mut self, frame_factor: f32) -> bool {
        self.pos.y -= 0.6 * frame_factor;
        self.ticks_left -= frame_factor;
        self.opacity = (self.ticks_left / self.lifetime).clamp(0.0, 1.0);
        self.ticks_left > 0.0
    }
}

/// Pickup bookkeeping for the end-of-level summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashStats {
    pub spawned: u32,
    pub collected: u32,
    pub missed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Health reached zero
    OutOfHealth,
    /// Track played to the end
    SongFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Ended(EndReason),
}

/// Spectrum history length
pub const AMPLITUDE_HISTORY: usize = 64;

/// Score multiplier for a streak: one step every `STREAK_STEP` pickups, capped
pub fn multiplier_for_streak(streak: u32) -> u32 {
    (1 + streak / STREAK_STEP).min(MAX_MULTIPLIER)
}

/// Complete simulation state for one level session
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// 0 - MAX_HEALTH
    pub health: i32,
    pub streak: u32,
    pub multiplier: u32,
    pub stats: TrashStats,
    pub player: Player,
    pub items: Vec<GameItem>,
    pub particles: ParticleSystem,
    pub popups: Vec<ScorePopup>,
    pub cave: CaveState,
    pub beat: BeatDetector,
    /// Scripted spawn events with their fired flags
    pub scripted_spawns: Vec<SpawnEvent>,
    /// Recent amplitude samples, newest last
    pub amplitude_history: VecDeque<f32>,
    /// Playback position of the last simulated frame (s)
    pub audio_time: f64,
    /// Simulated frames this session
    pub frames: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, viewport: Vec2, max_particles: usize, beat: BeatDetector) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            health: MAX_HEALTH,
            streak: 0,
            multiplier: 1,
            stats: TrashStats::default(),
            player: Player::new(viewport),
            items: Vec::new(),
            particles: ParticleSystem::new(max_particles),
            popups: Vec::new(),
            cave: CaveState::default(),
            beat,
            scripted_spawns: Vec::new(),
            amplitude_history: VecDeque::with_capacity(AMPLITUDE_HISTORY),
            audio_time: 0.0,
            frames: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::Ended(_))
    }

    /// Enter the terminal phase. Returns true only for the call that ended it.
    pub fn end_level(&mut self, reason: EndReason) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = GamePhase::Ended(reason);
        log::info!(
            "Level ended ({:?}): score {}, trash {}/{} collected",
            reason,
            self.score,
            self.stats.collected,
            self.stats.spawned
        );
        true
    }

    /// Add points for a pickup and advance the streak. Returns points awarded.
    pub fn award_pickup(&mut self) -> u64 {
        self.streak += 1;
        self.multiplier = multiplier_for_streak(self.streak);
        let points = PICKUP_POINTS * self.multiplier as u64;
        self.score += points;
        points
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Subtract points, floored at zero
    pub fn deduct_score(&mut self, points: u64) {
        self.score = self.score.saturating_sub(points);
    }

    pub fn reset_streak(&mut self) {
        self.streak = 0;
        self.multiplier = 1;
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).clamp(0, MAX_HEALTH);
    }

    /// Apply damage. Ends the level (once) when health runs out; returns
    /// true if this call ended it.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).clamp(0, MAX_HEALTH);
        self.health == 0 && self.end_level(EndReason::OutOfHealth)
    }

    /// Record an amplitude sample for the spectrum bars
    pub fn push_amplitude(&mut self, amplitude: f32) {
        if self.amplitude_history.len() == AMPLITUDE_HISTORY {
            self.amplitude_history.pop_front();
        }
        self.amplitude_history.push_back(amplitude);
    }
}
