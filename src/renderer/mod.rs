//! Rendering module
//!
//! The scene is built as backend-neutral draw commands (`scene`), which the
//! WebGPU backend (`pipeline`) tessellates into colored triangles. Text goes
//! to a 2D canvas layered on top (`overlay`).

pub mod draw;
pub mod overlay;
pub mod pipeline;
pub mod projection;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use draw::{DrawCommand, DrawSink};
#[cfg(target_arch = "wasm32")]
pub use overlay::TextOverlay;
pub use overlay::{TextLabel, text_labels};
pub use pipeline::RenderState;
pub use projection::{Projected, Projector};
pub use scene::{draw_car, draw_segment, render_scene};
pub use shapes::tessellate;
pub use vertex::Vertex;
