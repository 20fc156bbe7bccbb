//! Text layer
//!
//! The WebGPU backend only draws triangles. `Text` commands are painted on a
//! 2D canvas stacked above it, in the order the scene emitted them.

use glam::Vec2;

use super::draw::DrawCommand;
use crate::util::Rgb;

/// Smallest font the overlay bothers to paint (px)
pub const MIN_FONT_PX: f32 = 1.0;

/// A `Text` command borrowed out of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLabel<'a> {
    pub text: &'a str,
    /// Center of the text (baseline middle)
    pub position: Vec2,
    pub size: f32,
    pub color: Rgb,
    pub bold: bool,
}

impl TextLabel<'_> {
    /// CSS font shorthand, e.g. `bold 12px sans-serif`
    pub fn css_font(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{}{}px sans-serif", weight, self.size.round().max(MIN_FONT_PX))
    }

    pub fn fill_style(&self) -> String {
        self.color.to_hex()
    }
}

/// Text labels of a frame, back to front
pub fn text_labels(commands: &[DrawCommand]) -> impl Iterator<Item = TextLabel<'_>> {
    commands.iter().filter_map(|command| match command {
        DrawCommand::Text {
            text,
            position,
            size,
            color,
            bold,
        } if !text.is_empty() && size.is_finite() && *size > 0.0 => Some(TextLabel {
            text,
            position: *position,
            size: *size,
            color: *color,
            bold: *bold,
        }),
        _ => None,
    })
}

#[cfg(target_arch = "wasm32")]
pub use web::TextOverlay;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    use super::text_labels;
    use crate::renderer::DrawCommand;

    /// 2D canvas painting the frame's text over the WebGPU canvas
    pub struct TextOverlay {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl TextOverlay {
        pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
            let ctx = canvas
                .get_context("2d")
                .ok()
                .flatten()?
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            Some(Self { canvas, ctx })
        }

        pub fn resize(&self, width: u32, height: u32) {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            // Resizing resets the context state
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
        }

        pub fn draw(&self, commands: &[DrawCommand]) {
            let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
            self.ctx.clear_rect(0.0, 0.0, w, h);
            for label in text_labels(commands) {
                self.ctx.set_font(&label.css_font());
                self.ctx.set_fill_style_str(&label.fill_style());
                let _ = self.ctx.fill_text(
                    label.text,
                    label.position.x as f64,
                    label.position.y as f64,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, GameConfig};
    use crate::renderer::{Projector, render_scene, tessellate};
    use crate::sim::GameState;

    fn text(text: &str, size: f32, bold: bool) -> DrawCommand {
        DrawCommand::Text {
            text: text.to_string(),
            position: Vec2::new(10.0, 20.0),
            size,
            color: Rgb::hex(0xFFD700),
            bold,
        }
    }

    #[test]
    fn test_text_reaches_overlay_not_triangles() {
        let commands = vec![text("FUTUR-KG", 12.0, true)];
        assert!(tessellate(&commands).is_empty());

        let labels: Vec<_> = text_labels(&commands).collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "FUTUR-KG");
        assert_eq!(labels[0].position, Vec2::new(10.0, 20.0));
        assert_eq!(labels[0].css_font(), "bold 12px sans-serif");
        assert_eq!(labels[0].fill_style(), "#ffd700");
    }

    #[test]
    fn test_label_fonts() {
        let commands = vec![text("2024", 7.6, false), text("tiny", 0.2, false)];
        let fonts: Vec<_> = text_labels(&commands).map(|l| l.css_font()).collect();
        assert_eq!(fonts, ["8px sans-serif", "1px sans-serif"]);
    }

    #[test]
    fn test_unpaintable_labels_dropped() {
        let commands = vec![
            text("", 12.0, false),
            text("gone", 0.0, false),
            text("nan", f32::NAN, false),
            DrawCommand::Rect {
                rect: crate::util::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height: 1.0,
                },
                color: Rgb::BLACK,
            },
        ];
        assert_eq!(text_labels(&commands).count(), 0);
    }

    #[test]
    fn test_scene_text_is_labelled_in_order() {
        let state = GameState::new(21, GameConfig::default()).unwrap();
        let projector = Projector::new(800, 600, &CameraConfig::default()).unwrap();
        let mut commands = Vec::new();
        render_scene(&state, &projector, &mut commands);

        let expected: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, size, .. } if !text.is_empty() && *size > 0.0 => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        let labels: Vec<&str> = text_labels(&commands).map(|l| l.text).collect();
        assert_eq!(labels, expected);
    }
}
