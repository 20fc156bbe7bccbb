//! Per-frame simulation tick
//!
//! One call advances the whole game: toggles, countdown, cars, collisions,
//! traffic, camera, road growth and run bookkeeping, in that order.

use rand::Rng;

use super::input::InputState;
use super::road::{Stage, VICTORY_DISTANCE};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::MAX_FRAME_DT;
use crate::util::lerp;

/// How far the camera leans into the road curve
const CAMERA_CURVE_FACTOR: f32 = 0.3;
/// Lateral spread of spawned and recycled traffic
const TRAFFIC_SPREAD: f32 = 800.0;

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &InputState, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    let pressed = input.pressed_since(&state.previous_input);
    state.previous_input = *input;
    handle_toggles(state, &pressed);

    match state.phase {
        GamePhase::Countdown => {
            state.countdown -= dt;
            if state.countdown <= 0.0 {
                state.countdown = 0.0;
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::RunStarted);
                log::info!("Run started (seed {})", state.seed);
            }
            return;
        }
        GamePhase::Paused | GamePhase::GameOver | GamePhase::Victory => return,
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    if pressed.accelerate {
        state.events.push(GameEvent::Accelerate);
    }
    if pressed.brake {
        state.events.push(GameEvent::Brake);
    }

    update_cars(state, input, dt);
    resolve_collisions(state);
    if state.phase == GamePhase::GameOver {
        finish_run(state);
        return;
    }

    recycle_traffic(state);
    follow_camera(state);
    state.road.extend_road(state.player.z, &mut state.rng);
    top_up_traffic(state);
    update_progress(state, dt);
}

fn handle_toggles(state: &mut GameState, pressed: &InputState) {
    if pressed.radio {
        state.music = !state.music;
        state.events.push(GameEvent::RadioToggled(state.music));
    }

    if pressed.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if pressed.free_ride && state.phase == GamePhase::Playing {
        state.free_ride = !state.free_ride;
        state.events.push(GameEvent::FreeRideToggled(state.free_ride));
        log::info!(
            "Free ride {}",
            if state.free_ride { "enabled" } else { "disabled" }
        );
    }
}

fn update_cars(state: &mut GameState, input: &InputState, dt: f32) {
    state
        .player
        .update(dt, &state.road, Some(input), &mut state.rng);
    for car in &mut state.ai_cars {
        car.update(dt, &state.road, None, &mut state.rng);
    }
}

/// Crash the player and any AI car it touches; crashed cars can't collide
fn resolve_collisions(state: &mut GameState) {
    for car in &mut state.ai_cars {
        if state.player.crashed || car.crashed || !car.check_collision(&state.player) {
            continue;
        }

        state.player.crash(&mut state.rng);
        car.crash(&mut state.rng);
        if !state.free_ride {
            state.lives = state.lives.saturating_sub(1);
        }
        state.events.push(GameEvent::Collision { lives: state.lives });
        log::debug!("Collision with car {} ({} lives left)", car.id, state.lives);

        if state.lives == 0 && !state.free_ride {
            state.phase = GamePhase::GameOver;
        }
    }
}

/// Move traffic that fell too far behind back out in front of the player
fn recycle_traffic(state: &mut GameState) {
    let player_z = state.player.z;
    let cutoff = player_z - state.config.traffic.recycle_distance;
    for car in &mut state.ai_cars {
        if car.z >= cutoff {
            continue;
        }
        let x = state.rng.random_range(-TRAFFIC_SPREAD..=TRAFFIC_SPREAD);
        let z = player_z + state.rng.random_range(1000.0..2000.0);
        car.respawn(x, z, &mut state.rng);
        log::debug!("Recycled car {} to z {:.0}", car.id, z);
    }
}

fn follow_camera(state: &mut GameState) {
    let factor = state.config.camera.follow_factor;
    let camera = &mut state.camera;
    camera.x = lerp(camera.x, state.player.x, factor);
    camera.z = lerp(camera.z, state.player.z - camera.follow_distance, factor);
    camera.x += state.road.curve_at(camera.z) * CAMERA_CURVE_FACTOR;
}

fn top_up_traffic(state: &mut GameState) {
    let target = state.config.traffic.target_cars(state.stage.number());
    while state.ai_cars.len() < target {
        let x = state.rng.random_range(-TRAFFIC_SPREAD..=TRAFFIC_SPREAD);
        let z = state.player.z + state.rng.random_range(500.0..2000.0);
        state.spawn_ai_car(x, z);
    }
}

fn update_progress(state: &mut GameState, dt: f32) {
    state.time += dt;
    state.distance = state.distance.max(state.player.z);

    let stage = Stage::from_distance(state.distance);
    if stage != state.stage {
        state.stage = stage;
        state.events.push(GameEvent::StageChanged(stage));
        log::info!("Entering stage {}: {}", stage.number(), stage.name());
    }

    if state.distance >= VICTORY_DISTANCE && state.stage == Stage::LAST {
        state.phase = GamePhase::Victory;
        finish_run(state);
        return;
    }

    state.score += (state.distance / 10.0).floor() as u64;
}

fn finish_run(state: &mut GameState) {
    let result = state.run_result();
    state.events.push(GameEvent::RunFinished(result));
    log::info!(
        "Run finished: {:.0}m in {:.1}s, stage {}{}",
        result.distance,
        result.time,
        result.stage.number(),
        if result.victory { " (victory)" } else { "" }
    );
}
