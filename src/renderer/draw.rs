//! Backend-neutral draw commands
//!
//! The scene is described as a flat list of 2D primitives in screen pixels.
//! A sink decides what to do with them: the wgpu backend tessellates them,
//! tests just collect them.

use glam::Vec2;

use crate::util::{Rect, Rgb};

/// One 2D primitive in screen space (pixels, y down)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled quadrilateral, corners in winding order
    Quad { points: [Vec2; 4], color: Rgb },
    Rect { rect: Rect, color: Rgb },
    RectOutline { rect: Rect, color: Rgb, line_width: f32 },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgb,
    },
    Circle { center: Vec2, radius: f32, color: Rgb },
    /// Centered text
    Text {
        text: String,
        position: Vec2,
        size: f32,
        color: Rgb,
        bold: bool,
    },
    /// Rectangle fading from `top` to `bottom`
    VerticalGradient { rect: Rect, top: Rgb, bottom: Rgb },
}

/// Receiver of draw commands
pub trait DrawSink {
    fn draw(&mut self, command: DrawCommand);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.draw(DrawCommand::Rect {
            rect: Rect {
                x,
                y,
                width,
                height,
            },
            color,
        });
    }
}

impl DrawSink for Vec<DrawCommand> {
    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}
