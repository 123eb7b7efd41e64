//! Per-level configuration and presentation state shared by the sub-steps

use super::events::{ThemeCells, TransitionEngine};
use super::level::LevelScript;
use crate::host::{AssetTable, SfxMixer};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Everything the tick reads besides `GameState`. The theme cells are the
/// only part written every frame (by the transition engine).
#[derive(Debug, Clone)]
pub struct SimContext {
    pub settings: Settings,
    pub tuning: Tuning,
    pub script: LevelScript,
    pub theme: ThemeCells,
    pub transitions: TransitionEngine,
    pub assets: AssetTable,
    pub mixer: SfxMixer,
}

impl SimContext {
    pub fn new(
        script: LevelScript,
        settings: Settings,
        tuning: Tuning,
        assets: AssetTable,
    ) -> Self {
        let mixer = SfxMixer::new(settings.master_volume, settings.sfx_volume);
        let transitions = TransitionEngine::new(tuning.caption_lifetime);
        let mut ctx = Self {
            settings,
            tuning,
            script,
            theme: ThemeCells::default(),
            transitions,
            assets,
            mixer,
        };
        ctx.rearm_events();
        ctx
    }

    /// Swap in a new level and re-arm its captions and colour events
    pub fn load_level(&mut self, script: LevelScript) {
        self.script = script;
        self.rearm_events();
    }

    /// Reset the theme and re-arm every timed event of the current level
    pub fn rearm_events(&mut self) {
        self.theme = ThemeCells::default();
        self.transitions
            .reset(&self.script.colors, &self.script.captions, &mut self.theme);
    }
}
