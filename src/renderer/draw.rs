//! Frame composition
//!
//! Draw order: background, spectrum, wave band, cave walls, items, player,
//! particles, popups, caption.

use glam::Vec2;

use super::DrawSurface;
use super::shapes;
use crate::host::assets::names;
use crate::sim::state::HitKind;
use crate::sim::{
    CaveState, Color, GameItem, GameState, ItemKind, ParticleShape, SimContext, Sprite,
    fit_font_size,
};

const CAPTION_MAX_PX: f32 = 36.0;
const CAPTION_MIN_PX: f32 = 12.0;
/// Captions fade over their last this-many frame units
const CAPTION_FADE: f32 = 30.0;

/// Draw one complete frame of `state` onto `surface`
pub fn draw_frame(
    surface: &mut dyn DrawSurface,
    state: &GameState,
    ctx: &SimContext,
    now_ms: f64,
) {
    let size = surface.size();
    let theme = ctx.theme;
    let toggles = ctx.script.toggles_at(state.audio_time);

    surface.fill_rect(Vec2::ZERO, size, theme.background);

    if toggles.spectrum {
        let history: Vec<f32> = state.amplitude_history.iter().copied().collect();
        let bar_color = theme.wave.with_alpha((theme.wave.a * 1.5).min(0.8));
        let bars = ctx.settings.quality.spectrum_bars();
        for (pos, bar) in shapes::spectrum_bars(&history, bars, size) {
            surface.fill_rect(pos, bar, bar_color);
        }
    }

    draw_wave_band(surface, size, state, ctx, now_ms);
    draw_cave(surface, size, state, ctx, now_ms);

    for item in &state.items {
        draw_item(surface, item, now_ms);
    }

    draw_player(surface, state, ctx);

    for p in state.particles.live() {
        let color = p.color.with_alpha(p.color.a * p.opacity);
        match p.shape {
            ParticleShape::Circle => surface.fill_circle(p.pos, p.size, color),
            ParticleShape::Heart => {
                surface.fill_polygon(&shapes::heart(p.pos, p.size * 2.0, 16), color)
            }
        }
    }

    for popup in &state.popups {
        let (font_px, color) = if popup.bonus {
            (28.0, Color::GOLD)
        } else {
            (20.0, Color::WHITE)
        };
        surface.fill_text(&popup.text, popup.pos, font_px, color.with_alpha(popup.opacity));
    }

    if let Some(caption) = ctx.transitions.current_caption() {
        let font_px = fit_font_size(
            &caption.text,
            size.x * 0.9,
            CAPTION_MAX_PX,
            CAPTION_MIN_PX,
            |text, px| surface.measure_text(text, px),
        );
        let alpha = (caption.remaining / CAPTION_FADE).clamp(0.0, 1.0);
        surface.fill_text(
            &caption.text,
            Vec2::new(size.x * 0.5, size.y * 0.2),
            font_px,
            Color::WHITE.with_alpha(alpha),
        );
    }
}

/// Surface band along the top edge, swelling with the music
fn draw_wave_band(
    surface: &mut dyn DrawSurface,
    size: Vec2,
    state: &GameState,
    ctx: &SimContext,
    now_ms: f64,
) {
    let level = state.amplitude_history.back().copied().unwrap_or(0.0) / 255.0;
    let t = (now_ms / 1000.0) as f32;
    let base = size.y * 0.06;
    let swell = 4.0 + 10.0 * level.clamp(0.0, 1.0);
    let step = 24.0;
    let samples = (size.x / step).ceil().max(1.0) as usize;
    let curve: Vec<Vec2> = (0..=samples)
        .map(|i| {
            let x = (i as f32 * step).min(size.x);
            Vec2::new(x, base + (x * 0.02 + t * 2.0).sin() * swell)
        })
        .collect();
    surface.fill_polygon(&shapes::wall_polygon(&curve, 0.0), ctx.theme.wave);
}

const CAVE_ROCK: Color = Color::rgba(24, 16, 36, 0.92);

/// Wall colour: steady rock, pulsing red with growing strength while
/// collisions are still suppressed
fn cave_wall_color(cave: &CaveState, now_ms: f64, warning_ms: f64) -> Color {
    if !cave.in_warning(now_ms, warning_ms) {
        return CAVE_ROCK;
    }
    let urgency = cave.warning_intensity(now_ms, warning_ms);
    let pulse = ((now_ms / 120.0).sin() as f32 * 0.5 + 0.5) * urgency;
    Color::lerp(CAVE_ROCK, Color::RED.with_alpha(CAVE_ROCK.a), pulse * 0.6)
}

fn draw_cave(
    surface: &mut dyn DrawSurface,
    size: Vec2,
    state: &GameState,
    ctx: &SimContext,
    now_ms: f64,
) {
    let cave = &state.cave;
    if !cave.active || cave.upper.is_empty() {
        return;
    }
    let color = cave_wall_color(cave, now_ms, ctx.tuning.cave_warning_ms);

    surface.fill_polygon(&shapes::wall_polygon(&cave.upper, 0.0), color);
    surface.fill_polygon(&shapes::wall_polygon(&cave.lower, size.y), color);
}

fn fallback_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Trash | ItemKind::Bag => Color::hex(0x9a, 0x9a, 0x9a),
        ItemKind::Bottle => Color::rgba(120, 220, 140, 0.8),
        ItemKind::Can => Color::hex(0xc0, 0xc0, 0xd0),
        ItemKind::Rock => Color::hex(0x55, 0x4a, 0x40),
        ItemKind::Gull => Color::WHITE,
        ItemKind::FishHook => Color::hex(0xb0, 0xb0, 0xb8),
    }
}

fn draw_item(surface: &mut dyn DrawSurface, item: &GameItem, now_ms: f64) {
    if item.kind == ItemKind::FishHook {
        let line_x = item.pos.x + item.size.x * 0.5 - 1.0;
        surface.fill_rect(
            Vec2::new(line_x, 0.0),
            Vec2::new(2.0, item.pos.y.max(0.0)),
            Color::WHITE.with_alpha(0.6),
        );
    }
    match item.sprite.as_ref().and_then(|s: &Sprite| s.frame_at(now_ms)) {
        Some(frame) => surface.draw_image(frame, item.pos, item.size, item.rotation, 1.0),
        None => surface.fill_rect(item.pos, item.size, fallback_color(item.kind)),
    }
}

fn draw_player(surface: &mut dyn DrawSurface, state: &GameState, ctx: &SimContext) {
    let player = &state.player;
    let rotation = player.tilt + player.spin;
    match ctx.assets.image(names::PLAYER) {
        Some(image) => surface.draw_image(image, player.pos, player.size, rotation, 1.0),
        None => surface.fill_rect(player.pos, player.size, Color::hex(0xff, 0xb3, 0x47)),
    }
    if let Some(hit) = player.hit {
        let tint = match hit.kind {
            HitKind::Hazard => Color::DAMAGE,
            HitKind::CaveWall => Color::ORANGE,
        };
        surface.fill_rect(player.pos, player.size, tint.with_alpha(0.45));
    }
}
