//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod car;
pub mod input;
pub mod road;
pub mod state;
pub mod tick;

pub use car::{AiDriver, Car, CarKind};
pub use input::InputState;
pub use road::{
    AdPost, ColorBand, Road, SceneryRef, Segment, Sign, Stage, Tree, TreeKind, stage_name,
};
pub use state::{Camera, GameEvent, GamePhase, GameState, RunResult};
pub use tick::tick;
