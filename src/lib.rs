//! Wave Tiles - perforated floor tiles with spheres riding a radial wave
//!
//! Core modules:
//! - `geometry`: Outlines with holes, triangulation, extrusion, primitive meshes
//! - `scene`: Scene graph sink, materials, tile + sphere set placement
//! - `sim`: Wave engine and fixed-timestep animation driver
//! - `renderer`: WebGPU rendering pipeline and orbit camera
//! - `settings`: Scene configuration

pub mod error;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, RenderError};
pub use settings::SceneConfig;

use glam::Vec2;

/// Scene configuration constants
pub mod consts {
    /// Target simulation rate (steps per second)
    pub const TARGET_FPS: f64 = 60.0;

    /// Half-extent of the square tile outline
    pub const TILE_HALF_SIZE: f32 = 1.0;
    /// Radius of each hole punched into a tile
    pub const HOLE_RADIUS: f32 = 0.5;
    /// Segments used to approximate a hole circle
    pub const HOLE_SEGMENTS: u32 = 12;

    /// Sphere defaults
    pub const SPHERE_RADIUS: f32 = 0.5;
    pub const SPHERE_SEGMENTS: u32 = 32;
    /// Resting height of a freshly placed sphere
    pub const SPHERE_START_Y: f32 = 2.0;

    /// Reference point the wave radiates from (in swapped (z, x) space)
    pub const WAVE_ORIGIN: [f32; 2] = [100.0, 100.0];
    /// Distance mapped onto the full wavelength offset range
    pub const WAVE_DISTANCE_SPAN: f32 = 100.0;
    /// Lowest point of the wave
    pub const WAVE_TROUGH: f32 = -3.0;

    /// Default placement row: x coordinates, all at z = 1
    pub const SET_XS: [f32; 8] = [1.0, 4.0, 7.0, 10.0, -2.0, -5.0, -8.0, -11.0];
    pub const SET_Z: f32 = 1.0;
}

/// Linearly rescale `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Unclamped: values outside the input range extrapolate. A degenerate input
/// range maps everything to the midpoint of the output range.
#[inline]
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return (out_min + out_max) * 0.5;
    }
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Euclidean distance between two planar points
#[inline]
pub fn planar_distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}
