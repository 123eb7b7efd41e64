//! Simulation module
//!
//! All gameplay logic lives here. It never touches the host directly:
//! - Variable timestep, scaled by the frame factor
//! - Seeded RNG only
//! - Host collaborators passed in as trait objects
//! - No drawing

pub mod cave;
pub mod collision;
pub mod color;
pub mod context;
pub mod events;
pub mod level;
pub mod particles;
pub mod pool;
pub mod spawner;
pub mod state;
pub mod tick;

pub use cave::{CaveShape, CaveState, update_cave};
pub use collision::Aabb;
pub use color::{Color, streak_color};
pub use context::SimContext;
pub use events::{
    ActiveCaption, ActiveColorTransition, ThemeCells, TimedColorEvent, TimedTextEvent,
    TransitionEngine, fit_font_size,
};
pub use level::{CaveWindow, LevelId, LevelScript, LevelToggles, SpawnEvent, ToggleRange};
pub use particles::{Particle, ParticleShape, ParticleSystem};
pub use pool::{ObjectPool, PoolStats, Poolable};
pub use spawner::{BeatDetector, arm_scripted_spawns, fire_scripted_spawns, spawn_on_beat};
pub use state::{
    EndReason, GameItem, GamePhase, GameState, ItemKind, Player, ScorePopup, Sprite, TrashStats,
};
pub use tick::{FrameSample, speed_multiplier, step};
