//! Simulation state: sphere registry, phase accumulator, live parameters
//!
//! Owned by the host for the lifetime of the page; mutated once per step.

use glam::{Vec2, Vec3};

use super::params::WaveParams;
use super::wave::WaveEngine;
use crate::scene::ObjectId;

/// A sphere whose height follows the wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Scene object this sphere drives
    pub object: ObjectId,
    /// World position; only `y` changes while animating
    pub position: Vec3,
}

impl Sphere {
    /// Ground-plane position (x, z)
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Insertion-ordered collection of animated spheres
#[derive(Debug, Clone, Default)]
pub struct SphereRegistry {
    spheres: Vec<Sphere>,
}

impl SphereRegistry {
    /// Register a sphere; it animates after every sphere added before it
    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    /// Number of registered spheres
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// True before any set has been placed
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Sphere at `index` in registration order
    pub fn get(&self, index: usize) -> Option<&Sphere> {
        self.spheres.get(index)
    }

    /// Iterate in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Sphere> {
        self.spheres.iter()
    }

    /// Iterate mutably in registration order, as the wave step does
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sphere> {
        self.spheres.iter_mut()
    }
}

/// Everything the animation driver advances
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// Spheres moved by the wave
    pub spheres: SphereRegistry,
    /// Phase accumulator
    pub wave: WaveEngine,
    /// Live channels, written by the parameter panel between ticks
    pub params: WaveParams,
}

impl SimulationState {
    /// Fresh state at phase 0 with no spheres
    pub fn new(params: WaveParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Run one simulation step with the current parameters
    pub fn step(&mut self) {
        self.wave.step(&mut self.spheres, &self.params);
    }
}
