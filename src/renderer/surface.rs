//! Surface that records draw calls instead of rasterizing them

use glam::Vec2;

use super::DrawSurface;
use crate::host::ImageHandle;
use crate::sim::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        pos: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Image {
        image: ImageHandle,
        pos: Vec2,
        size: Vec2,
        rotation: f32,
        alpha: f32,
    },
    Text {
        text: String,
        pos: Vec2,
        font_px: f32,
        color: Color,
    },
}

/// Headless surface for tests and the demo binary.
///
/// Text is measured with a fixed advance of `char_width * font_px` per char.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub char_width: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            char_width: 0.6,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the surface empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text drawn so far
    pub fn texts(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, font_px, .. } => Some((text.as_str(), *font_px)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { pos, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_image(&mut self, image: ImageHandle, pos: Vec2, size: Vec2, rotation: f32, alpha: f32) {
        self.commands.push(DrawCommand::Image {
            image,
            pos,
            size,
            rotation,
            alpha,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, font_px: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            font_px,
            color,
        });
    }

    fn measure_text(&self, text: &str, font_px: f32) -> f32 {
        text.chars().count() as f32 * self.char_width * font_px
    }
}
