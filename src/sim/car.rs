//! Player and AI vehicles
//!
//! Speeds are in km/h, positions in world units (meters along the road).
//! A car is either driving or crashed; crashed is a timed state that always
//! ends back in driving.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use super::road::Road;
use crate::util::{Rect, Rgb, random_color};

pub const MIN_SPEED: f32 = 0.0;
/// Seconds a car stays crashed
pub const CRASH_DURATION: f32 = 2.0;
/// Fraction of speed kept per second of driving
pub const FRICTION: f32 = 0.9;
/// Extra fraction of speed kept per second while off the road
pub const OFF_ROAD_FRICTION: f32 = 0.5;
/// Turn speed kept per reference frame
pub const TURN_DAMPING: f32 = 0.8;
pub const REFERENCE_DT: f32 = 1.0 / 60.0;
/// Lateral units moved per second per unit of turn speed
pub const LATERAL_SCALE: f32 = 100.0;
/// Off-road lateral clamp as a multiple of the road half-width
pub const OFF_ROAD_LIMIT: f32 = 1.2;

/// Deceleration while coasting (km/h per second)
pub const COAST_DECEL: f32 = 50.0;
/// Turn speed gained per second of held steering at full authority
pub const STEER_RATE: f32 = 10.0;
/// Speed at which steering reaches full authority
pub const FULL_STEER_SPEED: f32 = 100.0;

pub const LANE_WIDTH: f32 = 300.0;
const LANE_GAIN: f32 = 0.01;
const LANE_TOLERANCE: f32 = 10.0;
/// How strongly AI cars drift with the road curve
const CURVE_HUG: f32 = 0.001;

pub const PLAYER_COLOR: Rgb = Rgb::hex(0xFF0000);
pub const PLAYER_PLATE: &str = "FUTUR-KG";
pub const PLAYER_YEAR: &str = "2025";

/// Convert km/h to m/s
#[inline]
pub fn kmh_to_ms(kmh: f32) -> f32 {
    kmh / 3.6
}

/// Lane-following state of an AI car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDriver {
    /// Lane the car currently occupies (-1, 0, 1)
    pub lane: i8,
    pub target_lane: i8,
    pub lane_change_timer: f32,
    pub lane_change_delay: f32,
    pub target_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CarKind {
    Player { plate: String, year: String },
    Ai(AiDriver),
}

/// A vehicle on the road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: u32,
    /// Lateral position (0 = road center)
    pub x: f32,
    pub y: f32,
    /// Longitudinal position
    pub z: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub turn_speed: f32,
    pub max_turn_speed: f32,
    pub color: Rgb,
    pub width: f32,
    pub height: f32,
    pub length: f32,
    pub crashed: bool,
    pub crash_timer: f32,
    pub kind: CarKind,
}

impl Car {
    fn base(id: u32, x: f32, z: f32, kind: CarKind) -> Self {
        Self {
            id,
            x,
            y: 0.0,
            z,
            speed: 0.0,
            max_speed: 0.0,
            acceleration: 0.0,
            deceleration: 300.0,
            turn_speed: 0.0,
            max_turn_speed: 5.0,
            color: PLAYER_COLOR,
            width: 80.0,
            height: 40.0,
            length: 120.0,
            crashed: false,
            crash_timer: 0.0,
            kind,
        }
    }

    /// The player's car at the start line
    pub fn player(id: u32) -> Self {
        Self {
            max_speed: 300.0,
            acceleration: 200.0,
            ..Self::base(
                id,
                0.0,
                0.0,
                CarKind::Player {
                    plate: PLAYER_PLATE.to_string(),
                    year: PLAYER_YEAR.to_string(),
                },
            )
        }
    }

    /// A traffic car with randomized top speed, lane and color
    pub fn ai<R: Rng>(id: u32, x: f32, z: f32, rng: &mut R) -> Self {
        let max_speed = rng.random_range(80.0..150.0);
        let lane = rng.random_range(-1..=1);
        let driver = AiDriver {
            lane,
            target_lane: lane,
            lane_change_timer: 0.0,
            lane_change_delay: rng.random_range(3.0..8.0),
            target_speed: max_speed * rng.random_range(0.7..1.0),
        };
        Self {
            max_speed,
            acceleration: 100.0,
            color: random_color(rng),
            ..Self::base(id, x, z, CarKind::Ai(driver))
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CarKind::Player { .. })
    }

    /// Plate number and model year (player only)
    pub fn plate(&self) -> Option<(&str, &str)> {
        match &self.kind {
            CarKind::Player { plate, year } => Some((plate, year)),
            CarKind::Ai(_) => None,
        }
    }

    /// Advance the car by `dt` seconds
    ///
    /// `input` is only read for the player; AI cars steer themselves using
    /// the road and `rng`. A crashed car only counts down its crash timer.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        road: &Road,
        input: Option<&InputState>,
        rng: &mut R,
    ) {
        let dt = dt.max(0.0);

        if self.crashed {
            self.crash_timer -= dt;
            if self.crash_timer <= 0.0 {
                self.crashed = false;
                self.crash_timer = 0.0;
                self.speed = (self.speed * 0.5).max(MIN_SPEED);
            }
            return;
        }

        // Drag first so a held throttle can still sit at max speed
        self.speed *= FRICTION.powf(dt);
        if self.x.abs() > road.half_width() {
            self.speed *= OFF_ROAD_FRICTION.powf(dt);
        }

        if self.is_player() {
            if let Some(input) = input {
                self.drive_player(dt, input);
            }
        } else {
            self.drive_ai(dt, road, rng);
        }

        self.z += kmh_to_ms(self.speed) * dt;
        self.x += self.turn_speed * dt * LATERAL_SCALE;
        self.turn_speed *= TURN_DAMPING.powf(dt / REFERENCE_DT);

        let limit = road.half_width() * OFF_ROAD_LIMIT;
        self.x = self.x.clamp(-limit, limit);
        self.speed = self.speed.clamp(MIN_SPEED, self.max_speed);
    }

    fn drive_player(&mut self, dt: f32, input: &InputState) {
        if input.accelerate && !input.brake {
            self.speed = (self.speed + self.acceleration * dt).min(self.max_speed);
        } else if input.brake {
            self.speed = (self.speed - self.deceleration * dt).max(MIN_SPEED);
        } else {
            self.speed = (self.speed - COAST_DECEL * dt).max(MIN_SPEED);
        }

        // Little steering authority at low speed
        let speed_factor = (self.speed / FULL_STEER_SPEED).min(1.0);
        let steer = STEER_RATE * dt * speed_factor;
        if input.left {
            self.turn_speed = (self.turn_speed - steer).max(-self.max_turn_speed);
        }
        if input.right {
            self.turn_speed = (self.turn_speed + steer).min(self.max_turn_speed);
        }
    }

    fn drive_ai<R: Rng>(&mut self, dt: f32, road: &Road, rng: &mut R) {
        let CarKind::Ai(ai) = &mut self.kind else {
            return;
        };

        if self.speed < ai.target_speed {
            self.speed = (self.speed + self.acceleration * dt).min(ai.target_speed);
        } else {
            self.speed = (self.speed - COAST_DECEL * dt).max(ai.target_speed);
        }

        ai.lane_change_timer += dt;
        if ai.lane_change_timer > ai.lane_change_delay {
            ai.target_lane = rng.random_range(-1..=1);
            ai.lane_change_timer = 0.0;
            ai.lane_change_delay = rng.random_range(3.0..8.0);
            ai.target_speed = self.max_speed * rng.random_range(0.7..1.0);
        }

        let lane_error = ai.target_lane as f32 * LANE_WIDTH - self.x;
        if lane_error.abs() > LANE_TOLERANCE {
            self.turn_speed =
                (lane_error * LANE_GAIN).clamp(-self.max_turn_speed, self.max_turn_speed);
        }
        ai.lane = (self.x / LANE_WIDTH).round().clamp(-1.0, 1.0) as i8;

        self.x += road.current_segment(self.z).curve * CURVE_HUG;
    }

    /// Proximity test on both axes; symmetric in its arguments
    pub fn check_collision(&self, other: &Car) -> bool {
        let dz = (self.z - other.z).abs();
        let dx = (self.x - other.x).abs();
        dz < (self.length + other.length) / 2.0 && dx < (self.width + other.width) / 2.0
    }

    /// Enter the crashed state with a random spin
    pub fn crash<R: Rng>(&mut self, rng: &mut R) {
        self.crashed = true;
        self.crash_timer = CRASH_DURATION;
        self.speed *= 0.3;
        self.turn_speed = rng.random_range(-2.0..=2.0);
    }

    /// Stop the car at a new position and clear any crash
    pub fn reset(&mut self, x: f32, z: f32) {
        self.x = x;
        self.z = z;
        self.speed = 0.0;
        self.turn_speed = 0.0;
        self.crashed = false;
        self.crash_timer = 0.0;
    }

    /// Put a recycled traffic car back on the road at `(x, z)`
    pub fn respawn<R: Rng>(&mut self, x: f32, z: f32, rng: &mut R) {
        self.reset(x, z);
        self.speed = rng.random_range(80.0..150.0f32).min(self.max_speed);
        self.color = random_color(rng);
    }

    /// Top-down footprint (x across, z along the road)
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x - self.width / 2.0,
            y: self.z - self.length / 2.0,
            width: self.width,
            height: self.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoadConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn test_road() -> Road {
        let mut rng = Pcg32::seed_from_u64(1);
        let config = RoadConfig {
            initial_segments: 200,
            ..Default::default()
        };
        Road::new(config, &mut rng).unwrap()
    }

    fn throttle() -> InputState {
        InputState {
            accelerate: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_throttle_reaches_max_speed() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut car = Car::player(0);
        let input = throttle();

        let mut last_z = car.z;
        for _ in 0..300 {
            car.update(DT, &road, Some(&input), &mut rng);
            assert!(car.z > last_z, "distance must keep increasing");
            last_z = car.z;
        }
        assert_eq!(car.speed, car.max_speed);
        assert!(car.z > 0.0);
    }

    #[test]
    fn test_brake_and_coast_stop_at_zero() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut car = Car::player(0);
        car.speed = 120.0;

        let brake = InputState {
            brake: true,
            accelerate: true,
            ..Default::default()
        };
        for _ in 0..60 {
            car.update(DT, &road, Some(&brake), &mut rng);
        }
        assert_eq!(car.speed, 0.0);

        car.speed = 40.0;
        let idle = InputState::default();
        for _ in 0..120 {
            car.update(DT, &road, Some(&idle), &mut rng);
        }
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn test_steering_scales_with_speed() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(2);
        let left = InputState {
            left: true,
            ..Default::default()
        };

        let mut parked = Car::player(0);
        parked.update(DT, &road, Some(&left), &mut rng);
        assert_eq!(parked.x, 0.0);

        let mut slow = Car::player(0);
        slow.speed = 30.0;
        let mut fast = Car::player(0);
        fast.speed = 200.0;
        for _ in 0..10 {
            slow.update(DT, &road, Some(&left), &mut rng);
            fast.update(DT, &road, Some(&left), &mut rng);
        }
        assert!(slow.x < 0.0);
        assert!(fast.x < slow.x);
    }

    #[test]
    fn test_crashed_car_ignores_input_for_crash_duration() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut car = Car::player(0);
        car.speed = 200.0;
        car.crash(&mut rng);
        assert!(car.crashed);
        assert!((car.speed - 60.0).abs() < 1e-3);

        let steer = InputState {
            left: true,
            accelerate: true,
            ..Default::default()
        };
        let dt = 0.25;
        let (x, z, speed) = (car.x, car.z, car.speed);
        for step in 1..=8 {
            car.update(dt, &road, Some(&steer), &mut rng);
            assert_eq!((car.x, car.z), (x, z), "moved while crashed at step {step}");
            assert_eq!(car.crashed, step < 8);
        }
        assert!((car.speed - speed * 0.5).abs() < 1e-3);

        // Next update processes input again
        let mut idle = car.clone();
        car.update(dt, &road, Some(&steer), &mut rng);
        idle.update(dt, &road, Some(&InputState::default()), &mut rng);
        assert!(car.speed > idle.speed);
        assert!(car.x < idle.x);
    }

    #[test]
    fn test_collision_is_proximity_on_both_axes() {
        let mut rng = Pcg32::seed_from_u64(5);
        let player = Car::player(0);
        let mut other = Car::ai(1, 0.0, 0.0, &mut rng);

        other.z = 119.0;
        other.x = 79.0;
        assert!(player.check_collision(&other));

        other.z = 120.0;
        assert!(!player.check_collision(&other));

        other.z = 50.0;
        other.x = -80.0;
        assert!(!player.check_collision(&other));
        assert!(!other.check_collision(&player));
    }

    #[test]
    fn test_bounds_match_collision_footprint() {
        let mut rng = Pcg32::seed_from_u64(5);
        let player = Car::player(0);
        let other = Car::ai(1, 60.0, 100.0, &mut rng);
        assert!(player.check_collision(&other));
        assert!(player.bounds().intersects(&other.bounds()));
    }

    #[test]
    fn test_reset_and_respawn() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut car = Car::ai(3, 0.0, 500.0, &mut rng);
        car.speed = 100.0;
        car.crash(&mut rng);

        car.reset(10.0, 20.0);
        assert_eq!((car.x, car.z, car.speed, car.turn_speed), (10.0, 20.0, 0.0, 0.0));
        assert!(!car.crashed);

        car.crash(&mut rng);
        car.respawn(-300.0, 4000.0, &mut rng);
        assert!(!car.crashed);
        assert!(car.speed >= 80.0 && car.speed <= car.max_speed);
        assert_eq!(car.z, 4000.0);
    }

    #[test]
    fn test_ai_seeks_target_lane() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut car = Car::ai(1, 0.0, 1000.0, &mut rng);
        if let CarKind::Ai(ai) = &mut car.kind {
            ai.target_lane = 1;
            ai.lane_change_delay = 1000.0;
        }

        for _ in 0..300 {
            car.update(DT, &road, None, &mut rng);
            assert!(car.speed <= car.max_speed);
        }
        assert!((car.x - LANE_WIDTH).abs() < 40.0, "x = {}", car.x);
        let CarKind::Ai(ai) = &car.kind else {
            panic!("expected AI car");
        };
        assert_eq!(ai.lane, 1);
        assert!(car.z > 1000.0);
    }

    #[test]
    fn test_ai_changes_lane_after_delay() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut car = Car::ai(1, 0.0, 1000.0, &mut rng);
        let delay = match &car.kind {
            CarKind::Ai(ai) => ai.lane_change_delay,
            CarKind::Player { .. } => unreachable!(),
        };
        let steps = (delay / DT).ceil() as usize + 1;
        for _ in 0..steps {
            car.update(DT, &road, None, &mut rng);
        }
        let CarKind::Ai(ai) = &car.kind else {
            panic!("expected AI car");
        };
        assert!(ai.lane_change_timer < delay);
        assert!((3.0..8.0).contains(&ai.lane_change_delay));
    }

    #[test]
    fn test_off_road_is_clamped_and_slowed() {
        let road = test_road();
        let mut rng = Pcg32::seed_from_u64(2);
        let right = InputState {
            right: true,
            ..Default::default()
        };

        let mut on_road = Car::player(0);
        on_road.speed = 200.0;
        let mut off_road = on_road.clone();
        off_road.x = 1100.0;

        on_road.update(DT, &road, Some(&right), &mut rng);
        off_road.update(DT, &road, Some(&right), &mut rng);
        assert!(off_road.speed < on_road.speed);

        for _ in 0..600 {
            off_road.update(DT, &road, Some(&right), &mut rng);
        }
        assert!(off_road.x <= road.half_width() * OFF_ROAD_LIMIT);
    }

    proptest! {
        #[test]
        fn prop_speed_stays_in_range(
            start_speed in 0.0f32..300.0,
            start_x in -1500.0f32..1500.0,
            steps in prop::collection::vec((any::<[bool; 4]>(), 0.0f32..0.1), 1..120),
        ) {
            let road = test_road();
            let mut rng = Pcg32::seed_from_u64(9);
            let mut player = Car::player(0);
            player.speed = start_speed;
            player.x = start_x;
            let mut ai = Car::ai(1, start_x, 500.0, &mut rng);
            ai.speed = start_speed.min(ai.max_speed);

            for ([left, right, accelerate, brake], dt) in steps {
                let input = InputState { left, right, accelerate, brake, ..Default::default() };
                player.update(dt, &road, Some(&input), &mut rng);
                ai.update(dt, &road, None, &mut rng);
                prop_assert!(player.speed >= MIN_SPEED && player.speed <= player.max_speed);
                prop_assert!(ai.speed >= MIN_SPEED && ai.speed <= ai.max_speed);
            }
        }

        #[test]
        fn prop_collision_is_symmetric(
            ax in -1500.0f32..1500.0, az in 0.0f32..5000.0,
            bx in -1500.0f32..1500.0, bz in 0.0f32..5000.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(10);
            let mut a = Car::player(0);
            a.x = ax;
            a.z = az;
            let b = Car::ai(1, bx, bz, &mut rng);
            prop_assert_eq!(a.check_collision(&b), b.check_collision(&a));
        }
    }
}
