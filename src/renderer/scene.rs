//! Scene composition: sky, road strips and depth-sorted sprites
//!
//! Everything is projected relative to the camera and emitted far to near so
//! later commands paint over earlier ones.

use std::f32::consts::TAU;

use glam::Vec2;

use super::draw::{DrawCommand, DrawSink};
use super::projection::{Projected, Projector};
use crate::sim::{
    AdPost, Camera, Car, ColorBand, GameState, Segment, Sign, Stage, Tree, TreeKind,
};
use crate::util::{Rect, Rgb, color_lerp};

const GROUND_NEAR: Rgb = Rgb::hex(0x90EE90);
const GROUND_FAR: Rgb = Rgb::hex(0x228B22);
const LANE_MARKING: Rgb = Rgb::WHITE;
const WINDOW: Rgb = Rgb::hex(0x87CEEB);
const WHEEL: Rgb = Rgb::hex(0x333333);
const TRUNK: Rgb = Rgb::hex(0x8B4513);
const FOLIAGE: Rgb = Rgb::hex(0x228B22);
const SIGN_POLE: Rgb = Rgb::hex(0x666666);
const SIGN_BOARD: Rgb = Rgb::hex(0xFFFF00);
const AD_POLE: Rgb = Rgb::hex(0x444444);

/// Fraction of the projected road width used by side and center markings
const MARKING: f32 = 0.05;

/// Relative-z window in which cars and trees are drawn
const NEAR_SPRITE_WINDOW: (f32, f32) = (-200.0, 2000.0);
/// Relative-z window in which signs and ad posts are drawn
const BILLBOARD_WINDOW: (f32, f32) = (-200.0, 1000.0);
/// Horizontal slack before an off-screen car is skipped
const CAR_SCREEN_MARGIN: f32 = 200.0;

/// Something standing on the road, with its camera-relative depth
#[derive(Debug, Clone, Copy)]
enum Sprite<'a> {
    Car(&'a Car),
    Tree(&'a Tree),
    Sign(&'a Sign),
    AdPost(&'a AdPost),
}

/// Draw the full scene for the current frame
pub fn render_scene<S: DrawSink + ?Sized>(state: &GameState, projector: &Projector, sink: &mut S) {
    draw_backdrop(state.stage, projector, sink);
    draw_road(state, projector, sink);

    let camera = &state.camera;
    for (sprite, _) in collect_sprites(state) {
        match sprite {
            // Cars ride on the hill under them
            Sprite::Car(car) => {
                draw_car(
                    projector,
                    car.x - camera.x,
                    state.road.hill_at(car.z) + car.y - camera.height,
                    car.z - camera.z,
                    car,
                    sink,
                );
            }
            Sprite::Tree(tree) => draw_tree(projector, camera, tree, sink),
            Sprite::Sign(sign) => draw_sign(projector, camera, sign, sink),
            Sprite::AdPost(post) => draw_ad_post(projector, camera, post, sink),
        }
    }
}

fn draw_backdrop<S: DrawSink + ?Sized>(stage: Stage, projector: &Projector, sink: &mut S) {
    let horizon = projector.horizon();
    let (sky_top, sky_horizon) = stage.sky();
    sink.draw(DrawCommand::VerticalGradient {
        rect: Rect {
            x: 0.0,
            y: 0.0,
            width: projector.width(),
            height: horizon,
        },
        top: sky_top,
        bottom: sky_horizon,
    });
    sink.draw(DrawCommand::VerticalGradient {
        rect: Rect {
            x: 0.0,
            y: horizon,
            width: projector.width(),
            height: projector.height() - horizon,
        },
        top: GROUND_NEAR,
        bottom: GROUND_FAR,
    });
}

/// Quad between two projected road cross-sections, spanning `[left, right]`
/// as fractions of the road width around the center line
fn strip(p1: &Projected, p2: &Projected, left: f32, right: f32) -> [Vec2; 4] {
    [
        Vec2::new(p1.x + left * p1.w, p1.y),
        Vec2::new(p1.x + right * p1.w, p1.y),
        Vec2::new(p2.x + right * p2.w, p2.y),
        Vec2::new(p2.x + left * p2.w, p2.y),
    ]
}

fn draw_road<S: DrawSink + ?Sized>(state: &GameState, projector: &Projector, sink: &mut S) {
    let camera = &state.camera;
    let segments = state
        .road
        .visible_segments(camera.z, state.config.camera.draw_distance);
    for segment in segments.iter().rev() {
        draw_segment(projector, camera, segment, state.road.segment_length(), sink);
    }
}

/// Draw one road slice: grass band, surface, side lines and center dash
pub fn draw_segment<S: DrawSink + ?Sized>(
    projector: &Projector,
    camera: &Camera,
    segment: &Segment,
    segment_length: f32,
    sink: &mut S,
) {
    let x = segment.curve - camera.x;
    let y = segment.hill - camera.height;
    let p1 = projector.project(x, y, segment.z - camera.z);
    let p2 = projector.project(x, y, segment.z + segment_length - camera.z);
    if !p1.is_visible() || !p2.is_visible() {
        return;
    }

    let colors = segment.band.colors();
    let width = projector.width();
    sink.draw(DrawCommand::Quad {
        points: [
            Vec2::new(0.0, p1.y),
            Vec2::new(width, p1.y),
            Vec2::new(width, p2.y),
            Vec2::new(0.0, p2.y),
        ],
        color: colors.grass,
    });
    sink.draw(DrawCommand::Quad {
        points: strip(&p1, &p2, -0.5, 0.5),
        color: colors.road,
    });
    sink.draw(DrawCommand::Quad {
        points: strip(&p1, &p2, -0.5, -0.5 + MARKING),
        color: colors.rumble,
    });
    sink.draw(DrawCommand::Quad {
        points: strip(&p1, &p2, 0.5 - MARKING, 0.5),
        color: colors.rumble,
    });
    if segment.band == ColorBand::Light {
        sink.draw(DrawCommand::Quad {
            points: strip(&p1, &p2, -MARKING / 2.0, MARKING / 2.0),
            color: LANE_MARKING,
        });
    }
}

fn within(window: (f32, f32), rel_z: f32) -> bool {
    rel_z > window.0 && rel_z < window.1
}

/// Cars and scenery in draw range, farthest first
fn collect_sprites(state: &GameState) -> Vec<(Sprite<'_>, f32)> {
    let camera_z = state.camera.z;
    let road = &state.road;
    let mut sprites = Vec::new();

    let cars = std::iter::once(&state.player).chain(&state.ai_cars);
    sprites.extend(
        cars.map(|car| (Sprite::Car(car), car.z - camera_z))
            .filter(|&(_, z)| within(NEAR_SPRITE_WINDOW, z)),
    );
    sprites.extend(
        road.trees
            .iter()
            .map(|tree| (Sprite::Tree(tree), tree.z - camera_z))
            .filter(|&(_, z)| within(NEAR_SPRITE_WINDOW, z)),
    );
    sprites.extend(
        road.signs
            .iter()
            .map(|sign| (Sprite::Sign(sign), sign.z - camera_z))
            .filter(|&(_, z)| within(BILLBOARD_WINDOW, z)),
    );
    sprites.extend(
        road.ad_posts
            .iter()
            .map(|post| (Sprite::AdPost(post), post.z - camera_z))
            .filter(|&(_, z)| within(BILLBOARD_WINDOW, z)),
    );

    sprites.sort_by(|a, b| b.1.total_cmp(&a.1));
    sprites
}

/// Draw a car at camera-relative `(x, y, z)`
///
/// Returns the body's screen rectangle, or `None` when the car is too far,
/// too close or off screen.
pub fn draw_car<S: DrawSink + ?Sized>(
    projector: &Projector,
    x: f32,
    y: f32,
    z: f32,
    car: &Car,
    sink: &mut S,
) -> Option<Rect> {
    let p = projector.project(x, y, z);
    if p.scale <= 0.001 || p.scale > 10.0 {
        return None;
    }
    if p.x < -CAR_SCREEN_MARGIN || p.x > projector.width() + CAR_SCREEN_MARGIN {
        return None;
    }

    let width = (p.scale * car.width).max(4.0);
    let height = (p.scale * car.height).max(3.0);
    let body = Rect {
        x: p.x - width / 2.0,
        y: p.y - height,
        width,
        height,
    };
    sink.draw(DrawCommand::Rect {
        rect: body,
        color: car.color,
    });

    // Only big enough cars get details
    if width > 8.0 {
        let roof_w = width * 0.7;
        let roof_h = height * 0.4;
        sink.fill_rect(
            p.x - roof_w / 2.0,
            p.y - height,
            roof_w,
            roof_h,
            color_lerp(car.color, Rgb::BLACK, 0.3),
        );

        let window_w = roof_w * 0.8;
        let window_h = roof_h * 0.7;
        sink.fill_rect(
            p.x - window_w / 2.0,
            p.y - height + 2.0,
            window_w,
            window_h,
            WINDOW,
        );

        let wheel = (width * 0.15).max(2.0);
        sink.fill_rect(p.x - width / 3.0, p.y - wheel / 2.0, wheel, wheel, WHEEL);
        sink.fill_rect(
            p.x + width / 3.0 - wheel,
            p.y - wheel / 2.0,
            wheel,
            wheel,
            WHEEL,
        );
    }

    let plate = car.plate().filter(|_| p.scale > 0.3 && width > 20.0);
    if let Some((plate, year)) = plate {
        let plate_w = width * 0.6;
        let plate_h = (height * 0.2).max(4.0);
        sink.fill_rect(
            p.x - plate_w / 2.0,
            p.y - plate_h - 2.0,
            plate_w,
            plate_h,
            Rgb::WHITE,
        );

        if plate_h > 6.0 {
            let size = (plate_h * 0.4).max(6.0);
            sink.draw(DrawCommand::Text {
                text: year.to_string(),
                position: Vec2::new(p.x, p.y - plate_h / 2.0 - 1.0),
                size,
                color: Rgb::BLACK,
                bold: false,
            });
            sink.draw(DrawCommand::Text {
                text: plate.to_string(),
                position: Vec2::new(p.x, p.y - 3.0),
                size,
                color: Rgb::BLACK,
                bold: false,
            });
        }
    }

    Some(body)
}

/// Project scenery; `None` unless it is in front and not oversized
fn project_scenery(
    projector: &Projector,
    camera: &Camera,
    x: f32,
    y: f32,
    z: f32,
) -> Option<Projected> {
    let p = projector.project(x - camera.x, y - camera.height, z - camera.z);
    (p.scale > 0.0 && p.scale <= 1.0).then_some(p)
}

fn draw_tree<S: DrawSink + ?Sized>(
    projector: &Projector,
    camera: &Camera,
    tree: &Tree,
    sink: &mut S,
) {
    let Some(p) = project_scenery(projector, camera, tree.x, tree.y, tree.z) else {
        return;
    };
    let tree_h = p.scale * 200.0 * tree.size;
    let trunk_w = p.scale * 20.0;
    sink.fill_rect(p.x - trunk_w / 2.0, p.y - tree_h, trunk_w, tree_h, TRUNK);

    let top = Vec2::new(p.x, p.y - tree_h);
    match tree.kind {
        TreeKind::Palm => {
            let frond = tree_h * 0.6;
            for i in 0..6 {
                let angle = i as f32 / 6.0 * TAU;
                let end = top + Vec2::new(angle.cos() * frond, angle.sin() * frond * 0.3);
                sink.draw(DrawCommand::Line {
                    from: top,
                    to: end,
                    width: trunk_w * 0.3,
                    color: FOLIAGE,
                });
            }
        }
        TreeKind::Regular => sink.draw(DrawCommand::Circle {
            center: top,
            radius: tree_h * 0.4,
            color: FOLIAGE,
        }),
    }
}

/// Pole with a bordered board and a centered caption
#[allow(clippy::too_many_arguments)]
fn draw_board<S: DrawSink + ?Sized>(
    p: &Projected,
    (board_w, board_h, pole_h): (f32, f32, f32),
    pole: (f32, Rgb),
    fill: Rgb,
    border: (f32, Rgb),
    text: &str,
    text_style: (f32, Rgb, bool),
    sink: &mut S,
) {
    let (pole_w, pole_color) = pole;
    sink.fill_rect(p.x - pole_w / 2.0, p.y - pole_h, pole_w, pole_h, pole_color);

    let board = Rect {
        x: p.x - board_w / 2.0,
        y: p.y - pole_h - board_h,
        width: board_w,
        height: board_h,
    };
    sink.draw(DrawCommand::Rect {
        rect: board,
        color: fill,
    });
    sink.draw(DrawCommand::RectOutline {
        rect: board,
        color: border.1,
        line_width: border.0,
    });

    let (size, color, bold) = text_style;
    sink.draw(DrawCommand::Text {
        text: text.to_string(),
        position: Vec2::new(p.x, p.y - pole_h - board_h / 2.0 + 5.0),
        size,
        color,
        bold,
    });
}

fn draw_sign<S: DrawSink + ?Sized>(
    projector: &Projector,
    camera: &Camera,
    sign: &Sign,
    sink: &mut S,
) {
    let Some(p) = project_scenery(projector, camera, sign.x, sign.y, sign.z) else {
        return;
    };
    let board_h = p.scale * 80.0;
    draw_board(
        &p,
        (p.scale * 150.0, board_h, p.scale * 100.0),
        (4.0, SIGN_POLE),
        SIGN_BOARD,
        (2.0, Rgb::BLACK),
        sign.message,
        ((board_h * 0.3).max(8.0), Rgb::BLACK, false),
        sink,
    );
}

fn draw_ad_post<S: DrawSink + ?Sized>(
    projector: &Projector,
    camera: &Camera,
    post: &AdPost,
    sink: &mut S,
) {
    let Some(p) = project_scenery(projector, camera, post.x, post.y, post.z) else {
        return;
    };
    let board_h = p.scale * 120.0;
    draw_board(
        &p,
        (p.scale * 200.0, board_h, p.scale * 80.0),
        (6.0, AD_POLE),
        post.color,
        (3.0, Rgb::WHITE),
        post.message,
        ((board_h * 0.2).max(10.0), Rgb::WHITE, true),
        sink,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, GameConfig, RoadConfig};

    fn state() -> GameState {
        let config = GameConfig {
            road: RoadConfig {
                initial_segments: 100,
                segments_ahead: 20,
                ..Default::default()
            },
            ..Default::default()
        };
        GameState::new(21, config).unwrap()
    }

    fn projector() -> Projector {
        Projector::new(800, 600, &CameraConfig::default()).unwrap()
    }

    /// Depth at which the projection scale equals `scale`
    fn depth_for(projector: &Projector, scale: f32) -> f32 {
        projector.depth() / scale
    }

    /// Car centred on the road at the depth where the projection scale is `scale`
    fn draw_player_at(
        projector: &Projector,
        car: &Car,
        scale: f32,
        commands: &mut Vec<DrawCommand>,
    ) -> Option<Rect> {
        draw_car(projector, 0.0, 0.0, depth_for(projector, scale), car, commands)
    }

    fn count_text(commands: &[DrawCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count()
    }

    #[test]
    fn test_scene_starts_with_sky_then_road() {
        let state = state();
        let projector = projector();
        let mut commands = Vec::new();
        render_scene(&state, &projector, &mut commands);

        assert!(matches!(
            commands[0],
            DrawCommand::VerticalGradient { top, .. } if top == Stage::KigaliCity.sky().0
        ));
        assert!(matches!(commands[1], DrawCommand::VerticalGradient { .. }));
        let quads = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Quad { .. }))
            .count();
        assert!(quads >= 4 * 100);
    }

    #[test]
    fn test_sky_follows_stage() {
        let mut state = state();
        let projector = projector();
        let top_of = |state: &GameState| {
            let mut commands = Vec::new();
            render_scene(state, &projector, &mut commands);
            match commands[0] {
                DrawCommand::VerticalGradient { top, bottom, .. } => Some((top, bottom)),
                _ => None,
            }
        };
        assert_eq!(top_of(&state), Some(Stage::KigaliCity.sky()));
        state.stage = Stage::DigitalHorizon;
        assert_eq!(top_of(&state), Some(Stage::DigitalHorizon.sky()));
    }

    #[test]
    fn test_player_is_drawn() {
        let state = state();
        let mut commands = Vec::new();
        render_scene(&state, &projector(), &mut commands);
        assert!(commands.iter().any(|c| matches!(
            c,
            DrawCommand::Rect { color, .. } if *color == state.player.color
        )));
    }

    #[test]
    fn test_segment_behind_camera_is_skipped() {
        let state = state();
        let projector = projector();
        let segment = &state.road.segments()[0];
        let mut camera = state.camera;
        camera.z = 1000.0;
        let mut commands = Vec::new();
        draw_segment(&projector, &camera, segment, 200.0, &mut commands);
        assert!(commands.is_empty());

        camera.z = -500.0;
        draw_segment(&projector, &camera, segment, 200.0, &mut commands);
        // Grass, road and two side lines; segment 0 has no center dash
        assert_eq!(commands.len(), 4);
    }

    #[test]
    fn test_car_detail_levels() {
        let projector = projector();
        let player = Car::player(0);

        // Tiny: body only, at minimum size
        let mut commands = Vec::new();
        let body = draw_player_at(&projector, &player, 0.02, &mut commands);
        assert_eq!(body.map(|r| (r.width, r.height)), Some((4.0, 3.0)));
        assert_eq!(commands.len(), 1);

        // Mid: details and a blank plate
        let mut commands = Vec::new();
        draw_player_at(&projector, &player, 0.5, &mut commands);
        assert_eq!(commands.len(), 1 + 4 + 1);
        assert_eq!(count_text(&commands), 0);

        // Close: plate text
        let mut commands = Vec::new();
        draw_player_at(&projector, &player, 2.0, &mut commands);
        assert_eq!(count_text(&commands), 2);
        assert!(commands.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "FUTUR-KG"
        )));
    }

    #[test]
    fn test_ai_car_never_gets_plate() {
        use rand::SeedableRng;
        let projector = projector();
        let mut rng = rand_pcg::Pcg32::seed_from_u64(1);
        let car = Car::ai(1, 0.0, 0.0, &mut rng);
        let mut commands = Vec::new();
        draw_car(&projector, 0.0, 0.0, depth_for(&projector, 2.0), &car, &mut commands);
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn test_car_culling() {
        let projector = projector();
        let player = Car::player(0);
        let mut commands = Vec::new();
        // Too far
        assert!(draw_player_at(&projector, &player, 0.0005, &mut commands).is_none());
        // Too close
        assert!(draw_player_at(&projector, &player, 20.0, &mut commands).is_none());
        // Behind
        assert!(draw_car(&projector, 0.0, 0.0, -10.0, &player, &mut commands).is_none());
        // Off to the side
        assert!(draw_car(&projector, 1.0e6, 0.0, 1.0, &player, &mut commands).is_none());
        assert!(commands.is_empty());
    }

    #[test]
    fn test_sprites_are_windowed_and_sorted_far_to_near() {
        let mut state = state();
        state.camera.z = 2000.0;
        let sprites = collect_sprites(&state);
        assert!(!sprites.is_empty());
        for pair in sprites.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        for (sprite, z) in &sprites {
            let window = match sprite {
                Sprite::Car(_) | Sprite::Tree(_) => NEAR_SPRITE_WINDOW,
                Sprite::Sign(_) | Sprite::AdPost(_) => BILLBOARD_WINDOW,
            };
            assert!(within(window, *z));
        }
    }

    #[test]
    fn test_cars_follow_hills() {
        let mut state = state();
        state.ai_cars.clear();
        state.camera.z = 0.0;
        let segment = state.road.segments()[1..9]
            .iter()
            .max_by(|a, b| a.hill.abs().total_cmp(&b.hill.abs()))
            .cloned()
            .unwrap();
        assert!(segment.hill != 0.0);
        state.player.z = segment.z + 100.0;
        assert_eq!(state.road.hill_at(state.player.z), segment.hill);

        let projector = projector();
        let mut commands = Vec::new();
        render_scene(&state, &projector, &mut commands);
        let drawn = commands.iter().find_map(|c| match c {
            DrawCommand::Rect { rect, color } if *color == state.player.color => Some(*rect),
            _ => None,
        });

        let camera = &state.camera;
        let player = &state.player;
        let mut expected = Vec::new();
        let on_hill = draw_car(
            &projector,
            player.x - camera.x,
            segment.hill + player.y - camera.height,
            player.z - camera.z,
            player,
            &mut expected,
        );
        assert!(on_hill.is_some());
        assert_eq!(drawn, on_hill);
    }

    #[test]
    fn test_nearer_car_painted_last() {
        let mut state = state();
        let far = Rgb::hex(0x010203);
        let near = Rgb::hex(0x040506);
        state.ai_cars[0].z = 1200.0;
        state.ai_cars[0].color = far;
        state.ai_cars[1].z = 600.0;
        state.ai_cars[1].color = near;
        state.ai_cars.truncate(2);

        let mut commands = Vec::new();
        render_scene(&state, &projector(), &mut commands);
        let position = |wanted: Rgb| {
            commands.iter().position(|c| matches!(
                c,
                DrawCommand::Rect { color, .. } if *color == wanted
            ))
        };
        let (far_at, near_at) = (position(far), position(near));
        assert!(far_at.is_some() && near_at.is_some());
        assert!(far_at < near_at);
    }
}
