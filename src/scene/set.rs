//! Tile + sphere sets
//!
//! A set is one perforated tile lying flat on the ground with a sphere
//! hovering above its hole. The sphere is registered with the simulation so
//! the wave can move it.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use super::graph::{MaterialId, MeshId, ObjectId, ObjectKind, SceneObject, SceneSink, Transform};
use crate::consts::SPHERE_START_Y;
use crate::geometry::{build_outline, extrude, place_holes_in_ring, sphere};
use crate::settings::{SphereConfig, TileConfig};
use crate::sim::{Sphere, SphereRegistry};

/// Objects created for one set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedSet {
    pub tile: ObjectId,
    pub sphere: ObjectId,
}

/// Creates sets, sharing materials and the sphere mesh between them
#[derive(Debug, Clone)]
pub struct SetPlacer {
    tile: TileConfig,
    /// Tile material per mesh group: [caps, walls]
    tile_materials: [MaterialId; 2],
    sphere_radius: f32,
    sphere_mesh: MeshId,
    sphere_material: MaterialId,
}

impl SetPlacer {
    /// Register the shared materials and sphere mesh with `sink`
    pub fn new<S: SceneSink>(sink: &mut S, tile: &TileConfig, sphere_config: &SphereConfig) -> Self {
        let top = sink.add_material(tile.top);
        let inside = sink.add_material(tile.inside);
        let segments = sphere_config.segments.max(3);
        let sphere_mesh = sink.add_mesh(sphere(sphere_config.radius, segments, segments));
        let sphere_material = sink.add_material(sphere_config.material);

        Self {
            tile: *tile,
            tile_materials: [top, inside],
            sphere_radius: sphere_config.radius,
            sphere_mesh,
            sphere_material,
        }
    }

    /// Place a tile at `(x, 0, z)` with a sphere at `(x, 2, z)`.
    ///
    /// Each tile gets its own freshly built outline with a single centered
    /// hole. The extrusion runs along local +z, so the tile is turned a
    /// quarter turn about x to lie in the ground plane.
    pub fn create_set<S: SceneSink>(
        &self,
        sink: &mut S,
        spheres: &mut SphereRegistry,
        x: f32,
        z: f32,
    ) -> PlacedSet {
        let mut outline = build_outline();
        place_holes_in_ring(&mut outline, 1, 0.0);
        let hole_centers = outline.hole_centers();
        let mesh = sink.add_mesh(extrude(&outline, &self.tile.profile));

        let tile = sink.add(SceneObject {
            kind: ObjectKind::Tile { hole_centers },
            mesh,
            materials: self.tile_materials.to_vec(),
            transform: Transform::from_translation(Vec3::new(x, 0.0, z))
                .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            cast_shadow: false,
            receive_shadow: false,
        });

        let position = Vec3::new(x, SPHERE_START_Y, z);
        let sphere = sink.add(SceneObject {
            kind: ObjectKind::Sphere {
                radius: self.sphere_radius,
            },
            mesh: self.sphere_mesh,
            materials: vec![self.sphere_material],
            transform: Transform::from_translation(position),
            cast_shadow: true,
            receive_shadow: true,
        });
        spheres.push(Sphere {
            object: sphere,
            position,
        });

        PlacedSet { tile, sphere }
    }

    /// Create one set per `(x, z)` placement, in order
    pub fn populate<S: SceneSink>(
        &self,
        sink: &mut S,
        spheres: &mut SphereRegistry,
        placements: &[[f32; 2]],
    ) -> Vec<PlacedSet> {
        placements
            .iter()
            .map(|&[x, z]| {
                log::debug!("Placing set at ({}, {})", x, z);
                self.create_set(sink, spheres, x, z)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SET_XS, SET_Z};
    use crate::scene::Scene;

    fn placer(scene: &mut Scene) -> SetPlacer {
        SetPlacer::new(scene, &TileConfig::default(), &SphereConfig::default())
    }

    #[test]
    fn test_create_set_places_tile_and_sphere() {
        let mut scene = Scene::default();
        let mut spheres = SphereRegistry::default();
        let placer = placer(&mut scene);

        let set = placer.create_set(&mut scene, &mut spheres, 4.0, 1.0);

        let tile = scene.object(set.tile).unwrap();
        assert_eq!(tile.transform.translation, Vec3::new(4.0, 0.0, 1.0));
        assert_eq!(tile.materials.len(), 2);
        assert!(!tile.cast_shadow && !tile.receive_shadow);
        match &tile.kind {
            ObjectKind::Tile { hole_centers } => {
                assert_eq!(hole_centers.len(), 1);
                assert!(hole_centers[0].length() < 1e-6);
            }
            other => panic!("expected tile, got {:?}", other),
        }

        let ball = scene.object(set.sphere).unwrap();
        assert_eq!(ball.transform.translation, Vec3::new(4.0, 2.0, 1.0));
        assert!(ball.cast_shadow && ball.receive_shadow);

        assert_eq!(spheres.len(), 1);
        let s = spheres.get(0).unwrap();
        assert_eq!(s.object, set.sphere);
        assert_eq!(s.position, Vec3::new(4.0, 2.0, 1.0));
    }

    #[test]
    fn test_tile_lies_flat() {
        let mut scene = Scene::default();
        let mut spheres = SphereRegistry::default();
        let set = placer(&mut scene).create_set(&mut scene, &mut spheres, 0.0, 0.0);

        let tile = scene.object(set.tile).unwrap();
        let mesh = scene.mesh(tile.mesh).unwrap();
        let m = tile.transform.matrix();
        for p in &mesh.positions {
            let w = m.transform_point3(*p);
            assert!(w.y <= 1e-5 && w.y >= -1.0 - 1e-5, "y {}", w.y);
            assert!(w.x.abs() <= 1.0 + 1e-5 && w.z.abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_default_row() {
        let mut scene = Scene::default();
        let mut spheres = SphereRegistry::default();
        let placements: Vec<[f32; 2]> = SET_XS.iter().map(|&x| [x, SET_Z]).collect();
        let sets = placer(&mut scene).populate(&mut scene, &mut spheres, &placements);

        assert_eq!(sets.len(), 8);
        assert_eq!(spheres.len(), 8);
        assert_eq!(scene.count_kind(|k| matches!(k, ObjectKind::Tile { .. })), 8);
        assert_eq!(scene.count_kind(|k| matches!(k, ObjectKind::Sphere { .. })), 8);
        for (sphere, &x) in spheres.iter().zip(SET_XS.iter()) {
            assert_eq!(sphere.position, Vec3::new(x, 2.0, 1.0));
        }
        // Eight tile meshes plus one shared sphere mesh
        assert_eq!(scene.meshes().len(), 9);
    }

    #[test]
    fn test_tiles_get_independent_outlines() {
        let mut scene = Scene::default();
        let mut spheres = SphereRegistry::default();
        let placer = placer(&mut scene);
        let a = placer.create_set(&mut scene, &mut spheres, 1.0, 1.0);
        let b = placer.create_set(&mut scene, &mut spheres, 7.0, 1.0);

        let tile_a = scene.object(a.tile).unwrap();
        let tile_b = scene.object(b.tile).unwrap();
        assert_ne!(tile_a.mesh, tile_b.mesh);
        assert_eq!(tile_a.kind, tile_b.kind);
    }
}
