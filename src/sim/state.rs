//! Game state and core simulation types
//!
//! Everything one run needs lives here: road, cars, camera, counters and the
//! seeded RNG that drives every random decision.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::car::Car;
use super::input::InputState;
use super::road::{Road, Stage};
use crate::config::{CameraConfig, GameConfig};
use crate::error::ConfigError;
use crate::hud::HudSnapshot;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Counting down before the run starts
    Countdown,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Out of lives
    GameOver,
    /// Reached the end of the last stage
    Victory,
}

/// Camera trailing the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f32,
    /// Fixed height above the road
    pub height: f32,
    pub z: f32,
    pub follow_distance: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            x: 0.0,
            height: config.height,
            z: -config.follow_distance,
            follow_distance: config.follow_distance,
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub distance: f32,
    pub time: f32,
    pub stage: Stage,
    pub victory: bool,
}

/// Things the front-end may want to react to (sound, UI, persistence)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Accelerate,
    Brake,
    Collision { lives: u8 },
    StageChanged(Stage),
    FreeRideToggled(bool),
    RadioToggled(bool),
    Paused,
    Resumed,
    RunStarted,
    RunFinished(RunResult),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: GameConfig,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Seconds left in the countdown
    pub countdown: f32,
    pub road: Road,
    pub player: Car,
    /// AI traffic (sorted by id)
    pub ai_cars: Vec<Car>,
    pub camera: Camera,
    pub lives: u8,
    pub score: u64,
    /// Furthest distance reached this run
    pub distance: f32,
    /// Seconds of play this run
    pub time: f32,
    pub stage: Stage,
    pub free_ride: bool,
    /// Radio on/off
    pub music: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Input seen on the previous tick, for edge detection
    pub previous_input: InputState,
    /// Pending events for the front-end
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with the given seed, counting down to its first run
    pub fn new(seed: u64, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let road = Road::new(config.road.clone(), &mut rng)?;

        let mut state = Self {
            seed,
            camera: Camera::new(&config.camera),
            countdown: config.traffic.countdown,
            lives: config.traffic.lives,
            rng,
            phase: GamePhase::Countdown,
            road,
            player: Car::player(0),
            ai_cars: Vec::new(),
            score: 0,
            distance: 0.0,
            time: 0.0,
            stage: Stage::KigaliCity,
            free_ride: false,
            music: true,
            time_ticks: 0,
            previous_input: InputState::default(),
            events: Vec::new(),
            next_id: 1,
            config,
        };
        state.populate_traffic();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start over: fresh road, counters and traffic, then count down again
    pub fn reset_run(&mut self) {
        match Road::new(self.config.road.clone(), &mut self.rng) {
            Ok(road) => self.road = road,
            Err(e) => log::warn!("Keeping the previous road, new one failed: {}", e),
        }
        self.player.reset(0.0, 0.0);
        self.ai_cars.clear();
        self.camera = Camera::new(&self.config.camera);
        self.lives = self.config.traffic.lives;
        self.score = 0;
        self.distance = 0.0;
        self.time = 0.0;
        self.stage = Stage::KigaliCity;
        self.countdown = self.config.traffic.countdown;
        self.phase = GamePhase::Countdown;
        self.populate_traffic();
    }

    /// Opening traffic, scattered over the first stretch of road
    fn populate_traffic(&mut self) {
        let count = self.config.traffic.target_cars(self.stage.number());
        for _ in 0..count {
            let x = self.rng.random_range(-800.0..800.0);
            let z = self.rng.random_range(1000.0..10000.0);
            self.spawn_ai_car(x, z);
        }
    }

    /// Add one AI car at `(x, z)`
    pub fn spawn_ai_car(&mut self, x: f32, z: f32) {
        let id = self.next_entity_id();
        let car = Car::ai(id, x, z, &mut self.rng);
        self.ai_cars.push(car);
    }

    /// Hand pending events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Victory)
    }

    pub fn run_result(&self) -> RunResult {
        RunResult {
            distance: self.distance,
            time: self.time,
            stage: self.stage,
            victory: self.phase == GamePhase::Victory,
        }
    }

    /// Values for the heads-up display
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            speed: self.player.speed,
            distance: self.distance,
            stage: self.stage,
            lives: self.lives,
            time: self.time,
            score: self.score,
            free_ride: self.free_ride,
            music: self.music,
            countdown: (self.phase == GamePhase::Countdown).then_some(self.countdown),
        }
    }
}
