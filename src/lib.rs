//! Future Drive - A pseudo-3D endless driving arcade game
//!
//! Core modules:
//! - `sim`: Simulation (road generation, car physics, traffic, game state)
//! - `renderer`: Perspective projection, draw commands and the WebGPU backend
//! - `hud`: Read-only HUD values for the front-end
//! - `config`: Validated gameplay constants
//! - `highscores` / `settings`: LocalStorage persistence

pub mod audio;
pub mod config;
pub mod error;
pub mod highscores;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod util;

pub use config::GameConfig;
pub use error::ConfigError;
pub use highscores::HighScores;
pub use hud::HudSnapshot;
pub use settings::Settings;

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest step a single `tick` will integrate
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
    /// Wall-clock frame delta cap before accumulation
    pub const MAX_ACCUMULATED_DT: f32 = 0.1;
}
