//! Declarative level content
//!
//! A level is a step function over audio time: ordered `(start, toggles)`
//! ranges, plus timed captions, colour changes, scripted spawns and cave
//! windows. Built-in levels are defined in code; custom levels load from JSON.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::events::{TimedColorEvent, TimedTextEvent};
use super::state::ItemKind;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelId {
    Shallows,
    KelpForest,
    Trench,
    Custom,
}

impl LevelId {
    pub const BUILTIN: [LevelId; 3] = [LevelId::Shallows, LevelId::KelpForest, LevelId::Trench];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelId::Shallows => "shallows",
            LevelId::KelpForest => "kelp-forest",
            LevelId::Trench => "trench",
            LevelId::Custom => "custom",
        }
    }
}

/// Feature flags active for one time range. Replaced wholesale, never merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelToggles {
    pub trash: bool,
    pub bottles: bool,
    pub cans: bool,
    pub bags: bool,
    pub rocks: bool,
    pub gulls: bool,
    pub hooks: bool,
    /// Bubble trail behind the player
    pub bubbles: bool,
    /// Spectrum bars behind the playfield
    pub spectrum: bool,
}

impl LevelToggles {
    pub const ALL: LevelToggles = LevelToggles {
        trash: true,
        bottles: true,
        cans: true,
        bags: true,
        rocks: true,
        gulls: true,
        hooks: true,
        bubbles: true,
        spectrum: true,
    };

    /// Whether the generic beat loop may roll this kind
    pub fn allows(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Trash => self.trash,
            ItemKind::Bottle => self.bottles,
            ItemKind::Can => self.cans,
            ItemKind::Bag => self.bags,
            ItemKind::Rock => self.rocks,
            ItemKind::Gull => self.gulls,
            ItemKind::FishHook => self.hooks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToggleRange {
    /// Audio time (s) where this range begins; it lasts until the next one
    pub start: f64,
    pub toggles: LevelToggles,
}

/// Scripted burst of items that fires once at `time`, independent of beats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    pub time: f64,
    pub kind: ItemKind,
    pub count: u32,
    #[serde(skip)]
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaveWindow {
    pub start: f64,
    pub end: f64,
}

impl CaveWindow {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelScript {
    pub id: LevelId,
    pub name: String,
    pub toggles: Vec<ToggleRange>,
    #[serde(default)]
    pub captions: Vec<TimedTextEvent>,
    #[serde(default)]
    pub colors: Vec<TimedColorEvent>,
    #[serde(default)]
    pub spawns: Vec<SpawnEvent>,
    #[serde(default)]
    pub cave_windows: Vec<CaveWindow>,
    /// The whole level is a cave
    #[serde(default)]
    pub permanent_cave: bool,
}

impl LevelScript {
    /// Parse and validate a custom level
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let script: LevelScript = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Check ordering and range rules
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid =
            |reason: String| -> Result<(), SimError> { Err(SimError::InvalidLevel { reason }) };

        for pair in self.toggles.windows(2) {
            if pair[1].start <= pair[0].start {
                return invalid(format!(
                    "toggle range at {}s does not follow {}s",
                    pair[1].start, pair[0].start
                ));
            }
        }
        let times = self
            .toggles
            .iter()
            .map(|r| r.start)
            .chain(self.captions.iter().map(|e| e.time))
            .chain(self.colors.iter().map(|e| e.time))
            .chain(self.spawns.iter().map(|e| e.time));
        for t in times {
            if !t.is_finite() || t < 0.0 {
                return invalid(format!("timestamp {t} is not a non-negative time"));
            }
        }
        // NaN fails both checks
        if let Some(e) = self
            .colors
            .iter()
            .find(|e| e.duration.is_nan() || e.duration < 0.0)
        {
            return invalid(format!("colour event at {}s has negative duration", e.time));
        }
        if let Some(w) = self
            .cave_windows
            .iter()
            .find(|w| w.start.is_nan() || w.end.is_nan() || w.end <= w.start)
        {
            return invalid(format!("cave window {}s..{}s is empty", w.start, w.end));
        }
        Ok(())
    }

    /// Toggle set in force at audio time `t`. All off before the first range.
    pub fn toggles_at(&self, t: f64) -> LevelToggles {
        let idx = self.toggles.partition_point(|r| r.start <= t);
        if idx == 0 {
            LevelToggles::default()
        } else {
            self.toggles[idx - 1].toggles
        }
    }

    pub fn cave_active(&self, t: f64) -> bool {
        self.permanent_cave || self.cave_windows.iter().any(|w| w.contains(t))
    }

    pub fn builtin(id: LevelId) -> Self {
        match id {
            LevelId::Shallows | LevelId::Custom => shallows(),
            LevelId::KelpForest => kelp_forest(),
            LevelId::Trench => trench(),
        }
    }
}

fn caption(time: f64, text: &str) -> TimedTextEvent {
    TimedTextEvent {
        time,
        text: text.to_string(),
        triggered: false,
    }
}

fn theme(time: f64, background: Color, wave: Color, duration: f64) -> TimedColorEvent {
    TimedColorEvent {
        time,
        background,
        wave,
        duration,
        triggered: false,
    }
}

fn burst(time: f64, kind: ItemKind, count: u32) -> SpawnEvent {
    SpawnEvent {
        time,
        kind,
        count,
        triggered: false,
    }
}

fn shallows() -> LevelScript {
    let calm = LevelToggles {
        trash: true,
        bubbles: true,
        ..LevelToggles::default()
    };
    let busy = LevelToggles {
        bottles: true,
        cans: true,
        rocks: true,
        ..calm
    };
    let open_sea = LevelToggles {
        bags: true,
        gulls: true,
        spectrum: true,
        ..busy
    };
    LevelScript {
        id: LevelId::Shallows,
        name: "The Shallows".into(),
        toggles: vec![
            ToggleRange { start: 0.0, toggles: calm },
            ToggleRange { start: 20.0, toggles: busy },
            ToggleRange { start: 45.0, toggles: open_sea },
            ToggleRange { start: 75.0, toggles: LevelToggles::ALL },
            ToggleRange { start: 140.0, toggles: open_sea },
        ],
        captions: vec![
            caption(2.0, "The tide brings more than sand"),
            caption(20.0, "Watch for the rocks"),
            caption(45.0, "The gulls are hungry too"),
            caption(60.0, "Into the grotto"),
            caption(75.0, "Someone is fishing up there"),
        ],
        colors: vec![
            theme(0.0, Color::hex(0x0b, 0x3d, 0x91), Color::rgba(64, 200, 255, 0.35), 0.0),
            theme(45.0, Color::hex(0x0e, 0x6b, 0x78), Color::rgba(120, 255, 220, 0.3), 4.0),
            theme(100.0, Color::hex(0x4a, 0x1f, 0x5c), Color::rgba(255, 150, 90, 0.4), 6.0),
        ],
        spawns: vec![burst(30.0, ItemKind::Trash, 5), burst(90.0, ItemKind::Bottle, 4)],
        cave_windows: vec![CaveWindow { start: 60.0, end: 72.0 }],
        permanent_cave: false,
    }
}

fn kelp_forest() -> LevelScript {
    let entry = LevelToggles {
        trash: true,
        cans: true,
        bubbles: true,
        spectrum: true,
        ..LevelToggles::default()
    };
    let thick = LevelToggles {
        bags: true,
        hooks: true,
        rocks: true,
        ..entry
    };
    LevelScript {
        id: LevelId::KelpForest,
        name: "Kelp Forest".into(),
        toggles: vec![
            ToggleRange { start: 0.0, toggles: entry },
            ToggleRange { start: 30.0, toggles: thick },
            ToggleRange { start: 90.0, toggles: LevelToggles::ALL },
        ],
        captions: vec![
            caption(1.5, "Light fades between the stalks"),
            caption(30.0, "Lines in the water"),
            caption(50.0, "Squeeze through"),
        ],
        colors: vec![
            theme(0.0, Color::hex(0x12, 0x4d, 0x2b), Color::rgba(150, 255, 120, 0.3), 0.0),
            theme(50.0, Color::hex(0x06, 0x2a, 0x1a), Color::rgba(90, 200, 90, 0.45), 3.0),
            theme(90.0, Color::hex(0x1b, 0x5e, 0x3a), Color::rgba(220, 255, 140, 0.3), 5.0),
        ],
        spawns: vec![burst(15.0, ItemKind::Can, 6)],
        cave_windows: vec![
            CaveWindow { start: 50.0, end: 65.0 },
            CaveWindow { start: 110.0, end: 120.0 },
        ],
        permanent_cave: false,
    }
}

fn trench() -> LevelScript {
    let dark = LevelToggles {
        trash: true,
        bottles: true,
        bubbles: true,
        ..LevelToggles::default()
    };
    LevelScript {
        id: LevelId::Trench,
        name: "The Trench".into(),
        toggles: vec![
            ToggleRange { start: 0.0, toggles: dark },
            ToggleRange {
                start: 40.0,
                toggles: LevelToggles {
                    rocks: true,
                    spectrum: true,
                    ..dark
                },
            },
        ],
        captions: vec![
            caption(1.0, "No light reaches this far"),
            caption(40.0, "The walls are moving"),
        ],
        colors: vec![
            theme(0.0, Color::hex(0x05, 0x0a, 0x1e), Color::rgba(80, 90, 255, 0.25), 0.0),
            theme(40.0, Color::hex(0x10, 0x02, 0x20), Color::rgba(200, 60, 255, 0.35), 8.0),
        ],
        spawns: Vec::new(),
        cave_windows: Vec::new(),
        permanent_cave: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_validate() {
        for id in LevelId::BUILTIN {
            LevelScript::builtin(id).validate().unwrap();
        }
    }

    #[test]
    fn test_toggles_step_function() {
        let script = LevelScript::builtin(LevelId::Shallows);
        assert!(script.toggles_at(0.0).trash);
        assert!(!script.toggles_at(19.99).rocks);
        assert!(script.toggles_at(20.0).rocks);
        assert!(!script.toggles_at(44.0).gulls);
        assert_eq!(script.toggles_at(80.0), LevelToggles::ALL);
        // later range does not inherit hooks from the one before it
        assert!(!script.toggles_at(150.0).hooks);
    }

    #[test]
    fn test_before_first_range_everything_off() {
        let mut script = LevelScript::builtin(LevelId::Shallows);
        script.toggles[0].start = 5.0;
        assert_eq!(script.toggles_at(1.0), LevelToggles::default());
    }

    #[test]
    fn test_cave_windows() {
        let script = LevelScript::builtin(LevelId::Shallows);
        assert!(!script.cave_active(59.9));
        assert!(script.cave_active(60.0));
        assert!(!script.cave_active(72.0));
        assert!(LevelScript::builtin(LevelId::Trench).cave_active(3.0));
    }

    #[test]
    fn test_from_json() {
        let json = r##"{
            "id": "Custom",
            "name": "Test Reef",
            "toggles": [
                {"start": 0.0, "toggles": {"trash": true}},
                {"start": 10.0, "toggles": {"trash": true, "hooks": true}}
            ],
            "colors": [
                {"time": 0.0, "background": "#001122", "wave": "rgba(1, 2, 3, 0.5)", "duration": 0.0}
            ],
            "spawns": [{"time": 4.0, "kind": "Bag", "count": 2}],
            "cave_windows": [{"start": 5.0, "end": 8.0}]
        }"##;
        let script = LevelScript::from_json(json).unwrap();
        assert_eq!(script.id, LevelId::Custom);
        assert!(script.toggles_at(12.0).hooks);
        assert!(!script.toggles_at(12.0).rocks);
        assert_eq!(script.colors[0].background, Color::hex(0x00, 0x11, 0x22));
        assert!(script.cave_active(6.0));
        assert!(!script.spawns[0].triggered);
    }

    #[test]
    fn test_validation_rejects_unordered_ranges() {
        let mut script = LevelScript::builtin(LevelId::Shallows);
        script.toggles.swap(1, 2);
        assert!(matches!(script.validate(), Err(SimError::InvalidLevel { .. })));
    }

    #[test]
    fn test_validation_rejects_empty_cave_window() {
        let mut script = LevelScript::builtin(LevelId::KelpForest);
        script.cave_windows.push(CaveWindow { start: 9.0, end: 9.0 });
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan_ranges() {
        let mut script = LevelScript::builtin(LevelId::KelpForest);
        script.cave_windows.push(CaveWindow {
            start: f64::NAN,
            end: 20.0,
        });
        assert!(script.validate().is_err());

        let mut script = LevelScript::builtin(LevelId::Shallows);
        script.colors[1].duration = f64::NAN;
        assert!(script.validate().is_err());
        script.colors[1].duration = -1.0;
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_colour() {
        let json = r##"{"id":"Custom","name":"x","toggles":[],
            "colors":[{"time":0.0,"background":"teal","wave":"#000","duration":1.0}]}"##;
        assert!(matches!(LevelScript::from_json(json), Err(SimError::Json(_))));
    }
}
