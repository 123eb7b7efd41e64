//! 2D drawing module
//!
//! The core never owns a canvas. It issues draw calls against a
//! `DrawSurface` the host supplies, re-reading its size every frame.

pub mod draw;
pub mod shapes;
pub mod surface;

pub use draw::draw_frame;
pub use surface::{DrawCommand, RecordingSurface};

use glam::Vec2;

use crate::host::ImageHandle;
use crate::sim::Color;

/// Caller-supplied 2D drawing surface (screen space, y down)
pub trait DrawSurface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    /// Draw `image` into the box at `pos`, rotated about its centre
    fn draw_image(&mut self, image: ImageHandle, pos: Vec2, size: Vec2, rotation: f32, alpha: f32);
    /// Text centred horizontally on `pos.x`, baseline at `pos.y`
    fn fill_text(&mut self, text: &str, pos: Vec2, font_px: f32, color: Color);
    /// Rendered width of `text` at `font_px`
    fn measure_text(&self, text: &str, font_px: f32) -> f32;
}
