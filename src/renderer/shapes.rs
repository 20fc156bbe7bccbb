//! Triangle generation for 2D draw commands

use glam::Vec2;
use std::f32::consts::PI;

use super::draw::DrawCommand;
use super::vertex::Vertex;
use crate::util::Rect;

/// Segments used for circles
const CIRCLE_SEGMENTS: u32 = 16;

/// Turn draw commands into a triangle list
///
/// Text produces no triangles; see [`super::overlay`].
pub fn tessellate(commands: &[DrawCommand]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(commands.len() * 6);
    for command in commands {
        match command {
            DrawCommand::Quad { points, color } => {
                quad(&mut vertices, *points, [color.to_rgba(1.0); 4]);
            }
            DrawCommand::Rect { rect, color } => {
                quad(&mut vertices, corners(rect), [color.to_rgba(1.0); 4]);
            }
            DrawCommand::RectOutline {
                rect,
                color,
                line_width,
            } => rect_outline(&mut vertices, rect, *line_width, color.to_rgba(1.0)),
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => line(&mut vertices, *from, *to, *width, color.to_rgba(1.0)),
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => vertices.extend(circle(*center, *radius, color.to_rgba(1.0), CIRCLE_SEGMENTS)),
            DrawCommand::VerticalGradient { rect, top, bottom } => {
                let (top, bottom) = (top.to_rgba(1.0), bottom.to_rgba(1.0));
                quad(&mut vertices, corners(rect), [top, top, bottom, bottom]);
            }
            // Painted by the 2D text overlay
            DrawCommand::Text { .. } => {}
        }
    }
    vertices
}

/// Top-left, top-right, bottom-right, bottom-left
fn corners(rect: &Rect) -> [Vec2; 4] {
    [
        Vec2::new(rect.x, rect.y),
        Vec2::new(rect.x + rect.width, rect.y),
        Vec2::new(rect.x + rect.width, rect.y + rect.height),
        Vec2::new(rect.x, rect.y + rect.height),
    ]
}

/// Two triangles over four corners in winding order
fn quad(vertices: &mut Vec<Vertex>, points: [Vec2; 4], colors: [[f32; 4]; 4]) {
    for i in [0, 1, 2, 0, 2, 3] {
        vertices.push(Vertex::new(points[i].x, points[i].y, colors[i]));
    }
}

fn rect_outline(vertices: &mut Vec<Vertex>, rect: &Rect, width: f32, color: [f32; 4]) {
    let [tl, tr, br, bl] = corners(rect);
    for (from, to) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
        line(vertices, from, to, width, color);
    }
}

/// Thick line as a quad along the perpendicular
fn line(vertices: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    quad(
        vertices,
        [from + perp, to + perp, to - perp, from - perp],
        [color; 4],
    );
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Rgb;

    #[test]
    fn test_rect_is_two_triangles() {
        let commands = [DrawCommand::Rect {
            rect: Rect {
                x: 10.0,
                y: 20.0,
                width: 30.0,
                height: 40.0,
            },
            color: Rgb::WHITE,
        }];
        let vertices = tessellate(&commands);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].position, [10.0, 20.0]);
        assert_eq!(vertices[2].position, [40.0, 60.0]);
        assert!(vertices.iter().all(|v| v.color == [1.0; 4]));
    }

    #[test]
    fn test_gradient_colors_top_and_bottom() {
        let commands = [DrawCommand::VerticalGradient {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            top: Rgb::WHITE,
            bottom: Rgb::BLACK,
        }];
        let vertices = tessellate(&commands);
        for v in vertices {
            let expected = if v.position[1] == 0.0 { 1.0 } else { 0.0 };
            assert_eq!(v.color[0], expected);
        }
    }

    #[test]
    fn test_text_and_degenerate_lines_emit_nothing() {
        let commands = [
            DrawCommand::Text {
                text: "hello".into(),
                position: Vec2::ZERO,
                size: 12.0,
                color: Rgb::BLACK,
                bold: false,
            },
            DrawCommand::Line {
                from: Vec2::ONE,
                to: Vec2::ONE,
                width: 3.0,
                color: Rgb::BLACK,
            },
        ];
        assert!(tessellate(&commands).is_empty());
    }

    #[test]
    fn test_line_has_requested_width() {
        let vertices = tessellate(&[DrawCommand::Line {
            from: Vec2::new(0.0, 0.0),
            to: Vec2::new(10.0, 0.0),
            width: 4.0,
            color: Rgb::WHITE,
        }]);
        let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| y.abs() == 2.0));
    }

    #[test]
    fn test_outline_and_circle_counts() {
        let outline = tessellate(&[DrawCommand::RectOutline {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 5.0,
                height: 5.0,
            },
            color: Rgb::WHITE,
            line_width: 1.0,
        }]);
        assert_eq!(outline.len(), 4 * 6);

        let circle = tessellate(&[DrawCommand::Circle {
            center: Vec2::ZERO,
            radius: 3.0,
            color: Rgb::WHITE,
        }]);
        assert_eq!(circle.len(), CIRCLE_SEGMENTS as usize * 3);
    }
}
