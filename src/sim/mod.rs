//! Wave simulation module
//!
//! All animation logic lives here. It must stay deterministic:
//! - Fixed timestep only, driven by refresh timestamps
//! - Stable iteration order (sphere insertion order)
//! - No rendering or platform dependencies

pub mod driver;
pub mod params;
pub mod state;
pub mod wave;

pub use driver::{AnimationDriver, DriverState, FrameHost};
pub use params::{AMPLITUDE_RANGE, VELOCITY_RANGE, WAVE_LENGTH_RANGE, WaveParams};
pub use state::{SimulationState, Sphere, SphereRegistry};
pub use wave::{WaveEngine, compute_sphere_heights, phase_offset, sphere_height};
