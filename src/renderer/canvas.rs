//! Drawing primitives the host must provide

use glam::Vec2;

/// RGBA, each channel in 0..=1
pub type Color = [f32; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const PLAYER: Color = [0.0, 1.0, 65.0 / 255.0, 1.0]; // Matrix green
    pub const BRAKE_RING: Color = [1.0, 50.0 / 255.0, 50.0 / 255.0, 0.7];
    pub const CUE_NEUTRAL: Color = [1.0, 1.0, 1.0, 0.4];
    pub const CUE_CAUTION: Color = [1.0, 1.0, 0.0, 0.6];
    pub const CUE_CRITICAL: Color = [1.0, 50.0 / 255.0, 50.0 / 255.0, 0.8];

    const fn rgb(r: u8, g: u8, b: u8) -> Color {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }

    /// Obstacle palette, indexed by `Obstacle::color`
    pub const OBSTACLES: [Color; 16] = [
        rgb(0xFF, 0x52, 0x52),
        rgb(0xFF, 0x40, 0x81),
        rgb(0xE0, 0x40, 0xFB),
        rgb(0x7C, 0x4D, 0xFF),
        rgb(0x53, 0x6D, 0xFE),
        rgb(0x44, 0x8A, 0xFF),
        rgb(0x40, 0xC4, 0xFF),
        rgb(0x18, 0xFF, 0xFF),
        rgb(0x64, 0xFF, 0xDA),
        rgb(0x69, 0xF0, 0xAE),
        rgb(0xB2, 0xFF, 0x59),
        rgb(0xEE, 0xFF, 0x41),
        rgb(0xFF, 0xFF, 0x00),
        rgb(0xFF, 0xD7, 0x40),
        rgb(0xFF, 0xAB, 0x40),
        rgb(0xFF, 0x6E, 0x40),
    ];

    pub fn obstacle(index: u8) -> Color {
        OBSTACLES[index as usize % OBSTACLES.len()]
    }
}

/// CSS `rgba()` string for a color
pub fn css_color(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3]
    )
}

/// A 2D drawing surface
pub trait Canvas {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32);
    fn dashed_line(&mut self, from: Vec2, to: Vec2, dash: [f32; 2], color: Color, line_width: f32);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f32, height: f32 },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, color: Color, line_width: f32 },
    DashedLine { from: Vec2, to: Vec2, dash: [f32; 2], color: Color, line_width: f32 },
}

/// Canvas that records draw calls (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct CommandCanvas {
    pub commands: Vec<DrawCommand>,
}

impl CommandCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the last clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Canvas for CommandCanvas {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn dashed_line(&mut self, from: Vec2, to: Vec2, dash: [f32; 2], color: Color, line_width: f32) {
        self.commands.push(DrawCommand::DashedLine {
            from,
            to,
            dash,
            color,
            line_width,
        });
    }
}
