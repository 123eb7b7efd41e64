//! Tide Runner headless runner
//!
//! Plays a level against a synthetic track and prints a JSON summary.
//! Usage: `tide-runner [shallows|kelp-forest|trench|<level.json>] [seed] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host embeds the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use tide_runner::host::{
        AssetTable, FrameIo, ManualClock, PointerState, ScoreSnapshot, SilentSink,
    };
    use tide_runner::renderer::RecordingSurface;
    use tide_runner::sim::{LevelId, LevelScript};
    use tide_runner::{FrameRequest, FrameScheduler, Settings, SimError, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn load_level(arg: Option<&str>) -> Result<LevelScript, SimError> {
        let Some(arg) = arg else {
            return Ok(LevelScript::builtin(LevelId::Shallows));
        };
        if let Some(id) = LevelId::BUILTIN.iter().find(|id| id.as_str() == arg) {
            return Ok(LevelScript::builtin(*id));
        }
        let json = std::fs::read_to_string(Path::new(arg))?;
        LevelScript::from_json(&json)
    }

    /// Kick every half second over a slow swell
    fn synthetic_amplitude(t: f64) -> f32 {
        let phase = (t * 2.0).fract();
        let kick = if phase < 0.08 { 170.0 } else { 0.0 };
        let swell = 60.0 + 40.0 * (t * 0.2).sin();
        (kick + swell) as f32
    }

    pub fn run(args: Vec<String>) -> Result<(), SimError> {
        let level = load_level(args.first().map(String::as_str))?;
        let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0x71de_5eed_u64);
        let seconds: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(90.0);

        let settings = match std::env::var("TIDE_RUNNER_SETTINGS") {
            Ok(path) => Settings::load(path)?,
            Err(_) => Settings::default(),
        };
        let tuning = match std::env::var("TIDE_RUNNER_TUNING") {
            Ok(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            Err(_) => Tuning::default(),
        };

        log::info!("Tide Runner (headless) starting, {seconds:.0}s track");
        let mut scheduler = FrameScheduler::new(level, settings, tuning, seed)
            .with_assets(AssetTable::placeholder());

        let mut clock = ManualClock::new(seconds);
        let mut sounds = SilentSink;
        let mut snapshot = ScoreSnapshot::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now_ms = 0.0;
        let mut draw_calls = 0usize;

        scheduler.start(now_ms);
        loop {
            now_ms += FRAME_MS;
            clock.advance(FRAME_MS / 1000.0);
            let t = clock.position.unwrap_or(0.0);
            let mut amplitude = move || synthetic_amplitude(t);
            // Sweep the avatar up and down through the field
            let pointer = PointerState {
                y: Some(300.0 + 220.0 * (t * 0.7).sin() as f32),
                active: true,
            };

            surface.clear();
            let request = scheduler.tick(
                now_ms,
                &mut FrameIo {
                    clock: &clock,
                    amplitude: &mut amplitude,
                    pointer,
                    sounds: &mut sounds,
                    observer: &mut snapshot,
                    surface: &mut surface,
                },
            );
            draw_calls += surface.commands().len();
            if request == FrameRequest::Halt {
                break;
            }
        }

        let state = scheduler.state();
        let summary = serde_json::json!({
            "level": scheduler.context().script.name,
            "seed": seed,
            "frames": state.frames,
            "score": snapshot.score,
            "health": snapshot.health,
            "level_ended": snapshot.level_ended,
            "phase": format!("{:?}", state.phase),
            "trash": state.stats,
            "particle_pool": {
                "created": state.particles.pool().stats().created,
                "reused": state.particles.pool().stats().reused,
            },
            "dropped_frames": scheduler.fps().dropped_frames(),
            "draw_calls": draw_calls,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
