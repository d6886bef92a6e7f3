//! Radial traveling wave
//!
//! Each sphere's height is a pure function of the accumulated phase, its
//! distance from the wave origin, and the live parameters.

use glam::Vec2;

use super::params::WaveParams;
use super::state::SphereRegistry;
use crate::consts::{WAVE_DISTANCE_SPAN, WAVE_ORIGIN, WAVE_TROUGH};
use crate::{planar_distance, remap};

/// Height of a sphere at planar `(x, z)`.
///
/// Distance is measured from `(z, x)`, not `(x, z)`, to the wave origin; the
/// swap sets which diagonal the wavefront runs along.
pub fn sphere_height(planar: Vec2, phase: f64, wave_length: f32, amplitude: f32) -> f32 {
    let swapped = Vec2::new(planar.y, planar.x);
    let d = planar_distance(swapped, Vec2::from(WAVE_ORIGIN));
    let offset = phase_offset(d, wave_length);
    let local_angle = phase + offset as f64;
    remap(local_angle.sin() as f32, -1.0, 1.0, WAVE_TROUGH, amplitude)
}

/// Phase offset for a distance: `wave_length` at the origin, falling
/// linearly through `-wave_length` at the span and beyond (no clamping).
pub fn phase_offset(distance: f32, wave_length: f32) -> f32 {
    remap(distance, 0.0, WAVE_DISTANCE_SPAN, wave_length, -wave_length)
}

/// Set every sphere's height for the given phase
pub fn compute_sphere_heights(
    spheres: &mut SphereRegistry,
    phase: f64,
    wave_length: f32,
    amplitude: f32,
) {
    for sphere in spheres.iter_mut() {
        sphere.position.y = sphere_height(sphere.planar(), phase, wave_length, amplitude);
    }
}

/// Phase accumulator; grows by `velocity` every step and is never reset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaveEngine {
    phase: f64,
    steps: u64,
}

impl WaveEngine {
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Simulation steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Update sphere heights at the current phase, then advance it
    pub fn step(&mut self, spheres: &mut SphereRegistry, params: &WaveParams) {
        compute_sphere_heights(spheres, self.phase, params.wave_length(), params.amplitude());
        self.phase += params.velocity() as f64;
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectId;
    use crate::sim::state::Sphere;
    use glam::Vec3;
    use proptest::prelude::*;

    fn registry(points: &[(f32, f32)]) -> SphereRegistry {
        let mut reg = SphereRegistry::default();
        for (i, &(x, z)) in points.iter().enumerate() {
            reg.push(Sphere {
                object: ObjectId(i as u32),
                position: Vec3::new(x, 2.0, z),
            });
        }
        reg
    }

    #[test]
    fn test_offset_not_clamped_past_span() {
        // (0, 0) is ~141.42 from (100, 100), past the 100 span
        let d = planar_distance(Vec2::ZERO, Vec2::from(WAVE_ORIGIN));
        assert!((d - 141.421_36).abs() < 1e-3);
        let offset = phase_offset(d, 20.0);
        assert!(offset < -20.0);
        assert!((offset - -36.568_54).abs() < 1e-3);

        let y = sphere_height(Vec2::ZERO, 0.0, 20.0, 5.0);
        let expected = remap((offset as f64).sin() as f32, -1.0, 1.0, -3.0, 5.0);
        assert!((y - expected).abs() < 1e-5);
    }

    #[test]
    fn test_coordinates_swapped() {
        // (x, z) = (10, 1) measures from (1, 10); (1, 10) measures from (10, 1)
        let a = sphere_height(Vec2::new(10.0, 1.0), 0.3, 7.0, 6.0);
        let d = planar_distance(Vec2::new(1.0, 10.0), Vec2::new(100.0, 100.0));
        let expected = remap(
            (0.3 + phase_offset(d, 7.0) as f64).sin() as f32,
            -1.0,
            1.0,
            -3.0,
            6.0,
        );
        assert!((a - expected).abs() < 1e-5);
    }

    #[test]
    fn test_zero_wave_length_is_uniform() {
        let mut reg = registry(&[(1.0, 1.0), (-11.0, 1.0), (40.0, -3.0)]);
        compute_sphere_heights(&mut reg, 0.7, 0.0, 5.0);
        let y0 = reg.get(0).unwrap().position.y;
        assert!(reg.iter().all(|s| (s.position.y - y0).abs() < 1e-6));
    }

    #[test]
    fn test_only_height_changes() {
        let mut reg = registry(&[(4.0, 1.0), (-5.0, 1.0)]);
        compute_sphere_heights(&mut reg, 1.0, 20.0, 5.0);
        assert_eq!(reg.get(0).unwrap().planar(), Vec2::new(4.0, 1.0));
        assert_eq!(reg.get(1).unwrap().planar(), Vec2::new(-5.0, 1.0));
    }

    #[test]
    fn test_phase_advances_by_velocity() {
        let mut reg = registry(&[(1.0, 1.0)]);
        let mut engine = WaveEngine::default();
        let params = WaveParams::new(20.0, 5.0, 0.12);
        let v = params.velocity() as f64;

        let mut last = engine.phase();
        for _ in 0..5 {
            engine.step(&mut reg, &params);
            assert!((engine.phase() - last - v).abs() < 1e-12);
            last = engine.phase();
        }
        assert_eq!(engine.steps(), 5);
    }

    #[test]
    fn test_step_uses_phase_before_advancing() {
        let mut reg = registry(&[(7.0, 1.0)]);
        let mut engine = WaveEngine::default();
        let params = WaveParams::default();
        engine.step(&mut reg, &params);
        let expected = sphere_height(Vec2::new(7.0, 1.0), 0.0, 20.0, 5.0);
        assert_eq!(reg.get(0).unwrap().position.y, expected);
    }

    proptest! {
        #[test]
        fn height_within_trough_and_amplitude(
            x in -1000.0f32..1000.0,
            z in -1000.0f32..1000.0,
            phase in -1000.0f64..1000.0,
            wave_length in 0.0f32..20.0,
            amplitude in 3.0f32..10.0,
        ) {
            let y = sphere_height(Vec2::new(x, z), phase, wave_length, amplitude);
            prop_assert!(y >= WAVE_TROUGH - 1e-4);
            prop_assert!(y <= amplitude + 1e-4);
        }
    }
}
