//! Polygon generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

/// Outline of a heart centred on `center`, `size` px across
pub fn heart(center: Vec2, size: f32, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(8);
    // Parametric curve spans roughly 32 units wide
    let scale = size / 32.0;
    (0..segments)
        .map(|i| {
            let t = (i as f32 / segments as f32) * 2.0 * PI;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos()
                - 5.0 * (2.0 * t).cos()
                - 2.0 * (3.0 * t).cos()
                - (4.0 * t).cos();
            // Screen y grows downward
            center + Vec2::new(x, -y) * scale
        })
        .collect()
}

/// Closed polygon between a wall curve and a horizontal screen edge
pub fn wall_polygon(curve: &[Vec2], edge_y: f32) -> Vec<Vec2> {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(curve.len() + 2);
    points.push(Vec2::new(first.x, edge_y));
    points.extend_from_slice(curve);
    points.push(Vec2::new(last.x, edge_y));
    points
}

/// Bars rising from the bottom edge, one per most recent amplitude sample.
/// Returns (top-left, size) pairs.
pub fn spectrum_bars(history: &[f32], bars: usize, viewport: Vec2) -> Vec<(Vec2, Vec2)> {
    if bars == 0 || history.is_empty() {
        return Vec::new();
    }
    let width = viewport.x / bars as f32;
    let recent = &history[history.len().saturating_sub(bars)..];
    recent
        .iter()
        .enumerate()
        .map(|(i, amp)| {
            let h = (amp / 255.0).clamp(0.0, 1.0) * viewport.y * 0.35;
            (
                Vec2::new(i as f32 * width, viewport.y - h),
                Vec2::new((width - 2.0).max(1.0), h),
            )
        })
        .collect()
}
