//! Frame loop orchestration
//!
//! The host calls [`FrameScheduler::tick`] once per display refresh and keeps
//! calling while it answers [`FrameRequest::Rearm`]. Each tick measures the
//! wall-clock delta, polls the playback clock, runs one simulation step,
//! publishes score snapshots and draws.

use glam::Vec2;

use crate::consts::{MAX_FRAME_DELTA, NOMINAL_FRAME_DELTA};
use crate::host::{AssetTable, FrameIo, SoundEffect};
use crate::renderer::draw_frame;
use crate::settings::Settings;
use crate::sim::{
    BeatDetector, FrameSample, GameState, LevelScript, SimContext, arm_scripted_spawns, step,
};
use crate::tuning::Tuning;

/// Viewport assumed until the first frame reads the real surface size
const INITIAL_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
/// A frame slower than this counts as dropped (1.5 x 60 Hz)
const DROPPED_FRAME_MS: f64 = 1000.0 / 60.0 * 1.5;

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule another tick
    Rearm,
    /// Loop is stopped (paused or level ended)
    Halt,
}

/// Frames-per-second and dropped-frame tracking. Reports only; nothing
/// degrades quality automatically.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_start_ms: Option<f64>,
    frames_in_window: u32,
    fps: Option<u32>,
    dropped: u64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame. Returns `Some(fps)` once per elapsed second.
    pub fn record(&mut self, now_ms: f64, delta_ms: f64) -> Option<u32> {
        if delta_ms > DROPPED_FRAME_MS {
            self.dropped += 1;
        }
        let Some(start) = self.window_start_ms else {
            self.window_start_ms = Some(now_ms);
            return None;
        };
        self.frames_in_window += 1;
        let elapsed = now_ms - start;
        if elapsed < 1000.0 {
            return None;
        }
        let fps = (self.frames_in_window as f64 * 1000.0 / elapsed).round() as u32;
        self.fps = Some(fps);
        self.frames_in_window = 0;
        // Fall back to `now` if we're more than a window behind
        let next = start + 1000.0;
        self.window_start_ms = Some(if now_ms - next > 1000.0 { now_ms } else { next });
        Some(fps)
    }

    /// Last reported rate
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Forget timing after a pause so the gap isn't counted
    pub fn reset_window(&mut self) {
        self.window_start_ms = None;
        self.frames_in_window = 0;
    }
}

/// Clamp a wall-clock delta: stalls over `MAX_FRAME_DELTA` become one nominal frame
pub fn clamp_delta(delta_ms: f64) -> f32 {
    let dt = (delta_ms / 1000.0).max(0.0) as f32;
    if dt > MAX_FRAME_DELTA {
        NOMINAL_FRAME_DELTA
    } else {
        dt
    }
}

/// Owns the game session and drives it one frame at a time
#[derive(Debug)]
pub struct FrameScheduler {
    state: GameState,
    ctx: SimContext,
    seed: u64,
    running: bool,
    last_frame_ms: Option<f64>,
    fps: FpsCounter,
    viewport_known: bool,
}

impl FrameScheduler {
    pub fn new(level: LevelScript, settings: Settings, tuning: Tuning, seed: u64) -> Self {
        let ctx = SimContext::new(level, settings, tuning, AssetTable::new());
        let state = Self::fresh_state(&ctx, seed);
        Self {
            state,
            ctx,
            seed,
            running: false,
            last_frame_ms: None,
            fps: FpsCounter::new(),
            viewport_known: false,
        }
    }

    /// Builder form for hosts that already have their assets
    pub fn with_assets(mut self, assets: AssetTable) -> Self {
        self.ctx.assets = assets;
        self
    }

    fn fresh_state(ctx: &SimContext, seed: u64) -> GameState {
        let mut state = GameState::new(
            seed,
            INITIAL_VIEWPORT,
            ctx.settings.max_particles(),
            BeatDetector::from_tuning(&ctx.tuning),
        );
        arm_scripted_spawns(&mut state, &ctx.script);
        state
    }

    /// Begin the loop at wall-clock `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.running = true;
        self.last_frame_ms = Some(now_ms);
        self.fps.reset_window();
        log::info!(
            "Level '{}' started (seed {})",
            self.ctx.script.name,
            self.seed
        );
    }

    /// Pause: the next tick halts without simulating
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Paused at frame {}", self.state.frames);
        }
        self.running = false;
        self.last_frame_ms = None;
    }

    /// Continue after `stop`. An ended level stays ended until `restart`.
    pub fn resume(&mut self, now_ms: f64) {
        if self.state.is_ended() {
            log::warn!("Resume ignored: level has ended");
            return;
        }
        self.running = true;
        self.last_frame_ms = Some(now_ms);
        self.fps.reset_window();
    }

    /// Load `level` with a fresh session and start it
    pub fn restart(&mut self, level: LevelScript, now_ms: f64) {
        self.ctx.load_level(level);
        self.state = Self::fresh_state(&self.ctx, self.seed);
        self.viewport_known = false;
        self.start(now_ms);
    }

    /// Apply changed settings mid-session (particle cap, volumes)
    pub fn apply_settings(&mut self, settings: Settings) {
        self.state
            .particles
            .set_max_particles(settings.max_particles());
        self.ctx.mixer.set_master_volume(settings.master_volume);
        self.ctx.mixer.set_sfx_volume(settings.sfx_volume);
        log::info!("Settings applied: quality {}", settings.quality.as_str());
        self.ctx.settings = settings;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Host-side access for progressive asset loading and volume changes
    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }

    /// Run one frame
    pub fn tick(&mut self, now_ms: f64, io: &mut FrameIo<'_>) -> FrameRequest {
        if !self.running {
            return FrameRequest::Halt;
        }

        let delta_ms = self.last_frame_ms.map_or(0.0, |last| now_ms - last);
        self.last_frame_ms = Some(now_ms);
        if let Some(fps) = self.fps.record(now_ms, delta_ms) {
            log::debug!("{} fps, {} dropped", fps, self.fps.dropped_frames());
        }

        // Audio not playing yet: nothing to simulate
        let audio_time = match io.clock.position() {
            Some(pos) if pos > 0.0 => pos,
            _ => return FrameRequest::Rearm,
        };

        let viewport = io.surface.size();
        if !self.viewport_known {
            self.state.player = crate::sim::Player::new(viewport);
            self.viewport_known = true;
        }

        let frame = FrameSample {
            dt: clamp_delta(delta_ms),
            audio_time,
            duration: io.clock.duration().unwrap_or(0.0),
            amplitude: io.amplitude.sample(),
            now_ms,
            viewport,
            pointer: io.pointer,
        };
        step(&mut self.state, &mut self.ctx, &frame, &mut *io.sounds);

        io.observer.set_score(self.state.score);
        io.observer.set_health(self.state.health);
        io.observer.set_level_ended(self.state.is_ended());

        draw_frame(&mut *io.surface, &self.state, &self.ctx, now_ms);

        if self.state.is_ended() {
            self.running = false;
            self.ctx.mixer.play(&mut *io.sounds, SoundEffect::LevelEnd);
            return FrameRequest::Halt;
        }
        FrameRequest::Rearm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ManualClock, PointerState, ScoreSnapshot, ScriptedAmplitude, SilentSink};
    use crate::renderer::RecordingSurface;
    use crate::sim::{EndReason, GameItem, GamePhase, ItemKind, LevelId};

    struct Rig {
        clock: ManualClock,
        amplitude: ScriptedAmplitude,
        sounds: SilentSink,
        snapshot: ScoreSnapshot,
        surface: RecordingSurface,
    }

    impl Rig {
        fn new(duration: f64) -> Self {
            Self {
                clock: ManualClock::new(duration),
                amplitude: ScriptedAmplitude::new(vec![30.0, 60.0, 180.0, 40.0]),
                sounds: SilentSink,
                snapshot: ScoreSnapshot::default(),
                surface: RecordingSurface::new(800.0, 600.0),
            }
        }

        fn tick(&mut self, sched: &mut FrameScheduler, now_ms: f64) -> FrameRequest {
            let mut io = FrameIo {
                clock: &self.clock,
                amplitude: &mut self.amplitude,
                pointer: PointerState::default(),
                sounds: &mut self.sounds,
                observer: &mut self.snapshot,
                surface: &mut self.surface,
            };
            sched.tick(now_ms, &mut io)
        }
    }

    fn scheduler() -> FrameScheduler {
        FrameScheduler::new(
            LevelScript::builtin(LevelId::Shallows),
            Settings::default(),
            Tuning::default(),
            99,
        )
        .with_assets(AssetTable::placeholder())
    }

    #[test]
    fn test_clamp_delta() {
        assert!((clamp_delta(16.0) - 0.016).abs() < 1e-6);
        assert_eq!(clamp_delta(100.0), 0.1);
        assert_eq!(clamp_delta(250.0), NOMINAL_FRAME_DELTA);
        assert_eq!(clamp_delta(-5.0), 0.0);
    }

    #[test]
    fn test_not_started_halts() {
        let mut sched = scheduler();
        let mut rig = Rig::new(10.0);
        assert_eq!(rig.tick(&mut sched, 0.0), FrameRequest::Halt);
    }

    #[test]
    fn test_zero_position_is_noop_rearm() {
        let mut sched = scheduler();
        let mut rig = Rig::new(10.0);
        sched.start(0.0);
        rig.clock.position = Some(0.0);
        assert_eq!(rig.tick(&mut sched, 16.0), FrameRequest::Rearm);
        assert_eq!(sched.state().frames, 0);
        assert!(rig.surface.commands().is_empty());

        rig.clock.position = None;
        assert_eq!(rig.tick(&mut sched, 32.0), FrameRequest::Rearm);
        assert_eq!(sched.state().frames, 0);
    }

    #[test]
    fn test_publishes_snapshots_and_draws() {
        let mut sched = scheduler();
        let mut rig = Rig::new(60.0);
        sched.start(0.0);
        rig.clock.advance(0.5);
        assert_eq!(rig.tick(&mut sched, 16.0), FrameRequest::Rearm);
        assert_eq!(sched.state().frames, 1);
        assert_eq!(rig.snapshot.health, 100);
        assert!(!rig.snapshot.level_ended);
        assert!(!rig.surface.commands().is_empty());
    }

    #[test]
    fn test_song_end_halts() {
        let mut sched = scheduler();
        let mut rig = Rig::new(2.0);
        sched.start(0.0);
        let mut now = 0.0;
        let mut last = FrameRequest::Rearm;
        for _ in 0..400 {
            now += 1000.0 / 60.0;
            rig.clock.advance(1.0 / 60.0);
            last = rig.tick(&mut sched, now);
            if last == FrameRequest::Halt {
                break;
            }
        }
        assert_eq!(last, FrameRequest::Halt);
        assert!(!sched.is_running());
        assert!(rig.snapshot.level_ended);
        assert_eq!(sched.state().phase, GamePhase::Ended(EndReason::SongFinished));

        // ended levels don't resume
        sched.resume(now + 10.0);
        assert!(!sched.is_running());
    }

    #[test]
    fn test_fatal_hazard_halts() {
        let mut sched = scheduler();
        let mut rig = Rig::new(60.0);
        sched.start(0.0);
        rig.clock.advance(0.5);
        assert_eq!(rig.tick(&mut sched, 16.0), FrameRequest::Rearm);

        sched.state.health = 10;
        let id = sched.state.next_entity_id();
        let pos = sched.state.player.pos + Vec2::new(10.0, 5.0);
        let rock = GameItem::new(id, ItemKind::Rock, pos, Vec2::new(30.0, 30.0), -1.0);
        sched.state.items.push(rock);

        rig.clock.advance(1.0 / 60.0);
        assert_eq!(rig.tick(&mut sched, 32.0), FrameRequest::Halt);
        assert!(!sched.is_running());
        assert!(rig.snapshot.level_ended);
        assert_eq!(rig.snapshot.health, 0);
        assert_eq!(sched.state().phase, GamePhase::Ended(EndReason::OutOfHealth));

        // stays halted until restarted
        assert_eq!(rig.tick(&mut sched, 48.0), FrameRequest::Halt);
    }

    #[test]
    fn test_pause_and_resume_resets_delta() {
        let mut sched = scheduler();
        let mut rig = Rig::new(60.0);
        sched.start(0.0);
        rig.clock.advance(1.0);
        rig.tick(&mut sched, 16.0);

        sched.stop();
        assert_eq!(rig.tick(&mut sched, 5000.0), FrameRequest::Halt);
        let frames = sched.state().frames;

        sched.resume(10_000.0);
        let before = sched.state().items.iter().map(|i| i.pos.x).collect::<Vec<_>>();
        rig.tick(&mut sched, 10_016.0);
        assert_eq!(sched.state().frames, frames + 1);
        // a 16ms frame moves items a few px at most, not a 10s jump
        for (item, x0) in sched.state().items.iter().zip(before) {
            assert!((item.pos.x - x0).abs() < 20.0);
        }
    }

    #[test]
    fn test_restart_resets_session() {
        let mut sched = scheduler();
        let mut rig = Rig::new(60.0);
        sched.start(0.0);
        for i in 1..=30 {
            rig.clock.advance(1.0 / 60.0);
            rig.tick(&mut sched, i as f64 * 16.0);
        }
        assert!(sched.state().frames > 0);

        sched.restart(LevelScript::builtin(LevelId::Trench), 1000.0);
        assert!(sched.is_running());
        assert_eq!(sched.state().frames, 0);
        assert_eq!(sched.state().score, 0);
        assert_eq!(sched.context().script.id, LevelId::Trench);
    }

    #[test]
    fn test_apply_settings_mid_session() {
        let mut sched = scheduler();
        let settings = Settings {
            particles: false,
            master_volume: 0.5,
            ..Settings::default()
        };
        sched.apply_settings(settings);
        assert!(!sched.context().settings.particles);
        assert!((sched.context().mixer.effective_volume() - 0.5).abs() < 1e-6);

        let mut rig = Rig::new(60.0);
        sched.start(0.0);
        for i in 1..=20 {
            rig.clock.advance(1.0 / 60.0);
            rig.tick(&mut sched, i as f64 * 16.0);
        }
        assert!(sched.state().particles.is_empty());
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::new();
        let mut reported = None;
        for i in 0..=61 {
            let now = i as f64 * (1000.0 / 60.0);
            if let Some(v) = fps.record(now, 1000.0 / 60.0) {
                reported = Some(v);
            }
        }
        assert_eq!(reported, Some(60));
        assert_eq!(fps.dropped_frames(), 0);

        fps.record(2000.0, 50.0);
        assert_eq!(fps.dropped_frames(), 1);
    }
}
