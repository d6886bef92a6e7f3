//! WebGPU rendering module
//!
//! Lit, depth-tested mesh rendering of the scene graph with an orbiting
//! perspective camera.

pub mod camera;
pub mod pipeline;
pub mod uniforms;
pub mod vertex;

pub use camera::{OrbitControls, PerspectiveCamera};
pub use pipeline::{DrawItem, SceneRenderState, plan_draws};
pub use vertex::Vertex;
