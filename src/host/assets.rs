//! Preloaded visual assets, keyed by logical name
//!
//! Assets arrive progressively. A missing entry is never an error: the
//! spawner checks availability and skips the category until it shows up.

use std::collections::HashMap;
use std::sync::Arc;

/// Opaque handle to an image the host has decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Frame-based sprite animation
#[derive(Debug, Clone)]
pub struct FrameAnimator {
    frames: Arc<[ImageHandle]>,
    frame_ms: f64,
    /// Offset so neighbouring sprites don't flap in lockstep
    phase_ms: f64,
}

impl FrameAnimator {
    pub fn new(frames: Arc<[ImageHandle]>, frame_ms: f64) -> Self {
        Self {
            frames,
            frame_ms: frame_ms.max(1.0),
            phase_ms: 0.0,
        }
    }

    pub fn with_phase(mut self, phase_ms: f64) -> Self {
        self.phase_ms = phase_ms;
        self
    }

    /// Frame to show at wall-clock time `now_ms`
    pub fn frame_at(&self, now_ms: f64) -> Option<ImageHandle> {
        if self.frames.is_empty() {
            return None;
        }
        let idx = ((now_ms + self.phase_ms) / self.frame_ms).floor().max(0.0) as usize;
        Some(self.frames[idx % self.frames.len()])
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Logical asset names the core asks for
pub mod names {
    pub const PLAYER: &str = "player";
    pub const TRASH: &str = "trash";
    pub const BOTTLE: &str = "bottle";
    pub const CAN: &str = "can";
    pub const BAG: &str = "bag";
    pub const ROCK: &str = "rock";
    pub const GULL: &str = "gull";
    pub const HOOK: &str = "hook";
}

/// Image and animation handles the host has finished loading
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    images: HashMap<String, ImageHandle>,
    animations: HashMap<String, Arc<[ImageHandle]>>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_image(&mut self, name: impl Into<String>, handle: ImageHandle) {
        self.images.insert(name.into(), handle);
    }

    pub fn insert_animation(&mut self, name: impl Into<String>, frames: Vec<ImageHandle>) {
        if frames.is_empty() {
            return;
        }
        self.animations.insert(name.into(), frames.into());
    }

    pub fn image(&self, name: &str) -> Option<ImageHandle> {
        self.images.get(name).copied()
    }

    /// Build an animator for `name`, if all frames are loaded
    pub fn animator(&self, name: &str, frame_ms: f64) -> Option<FrameAnimator> {
        self.animations
            .get(name)
            .map(|frames| FrameAnimator::new(Arc::clone(frames), frame_ms))
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Table with every sprite the built-in levels use (headless runs, tests)
    pub fn placeholder() -> Self {
        let mut table = Self::new();
        let still = [
            names::PLAYER,
            names::TRASH,
            names::BOTTLE,
            names::CAN,
            names::BAG,
            names::ROCK,
            names::HOOK,
        ];
        for (i, name) in still.iter().enumerate() {
            table.insert_image(*name, ImageHandle(i as u32 + 1));
        }
        table.insert_animation(
            names::GULL,
            (100..104).map(ImageHandle).collect(),
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animator_cycles_frames() {
        let anim = FrameAnimator::new(vec![ImageHandle(1), ImageHandle(2)].into(), 100.0);
        assert_eq!(anim.frame_at(0.0), Some(ImageHandle(1)));
        assert_eq!(anim.frame_at(150.0), Some(ImageHandle(2)));
        assert_eq!(anim.frame_at(250.0), Some(ImageHandle(1)));
    }

    #[test]
    fn test_missing_assets_report_absent() {
        let table = AssetTable::new();
        assert!(table.image(names::TRASH).is_none());
        assert!(table.animator(names::GULL, 80.0).is_none());
    }

    #[test]
    fn test_empty_animation_is_not_registered() {
        let mut table = AssetTable::new();
        table.insert_animation(names::GULL, Vec::new());
        assert!(!table.has_animation(names::GULL));
    }
}
