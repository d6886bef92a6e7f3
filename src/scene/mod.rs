//! Scene assembly
//!
//! Builds the static scene once at startup: lights, the shadow-catching
//! floor, and one tile + sphere set per placement.

pub mod graph;
pub mod material;
pub mod set;

pub use graph::{
    Lighting, MaterialId, MeshId, ObjectId, ObjectKind, Scene, SceneObject, SceneSink, Transform,
};
pub use material::{AmbientLight, Color, Material, SpotLight};
pub use set::{PlacedSet, SetPlacer};

use glam::Vec3;

use crate::geometry::plane;
use crate::settings::SceneConfig;
use crate::sim::SimulationState;

/// Build the scene graph and the simulation state that animates it
pub fn build(config: &SceneConfig) -> (Scene, SimulationState) {
    let mut scene = Scene::new(Lighting {
        ambient: config.ambient,
        spot: config.spot,
    });
    let mut sim = SimulationState::new(config.wave);

    let floor_mesh = scene.add_mesh(plane(config.floor.size, config.floor.size));
    let floor_material = scene.add_material(Material::Shadow {
        opacity: config.floor.opacity,
    });
    scene.add(SceneObject {
        kind: ObjectKind::Floor,
        mesh: floor_mesh,
        materials: vec![floor_material],
        transform: Transform::from_translation(Vec3::new(0.0, config.floor.y, 0.0)),
        cast_shadow: false,
        receive_shadow: true,
    });

    let placer = SetPlacer::new(&mut scene, &config.tile, &config.sphere);
    let sets = placer.populate(&mut scene, &mut sim.spheres, &config.placements);

    log::info!(
        "Scene built: {} sets, {} objects, {} meshes",
        sets.len(),
        scene.objects().len(),
        scene.meshes().len()
    );
    (scene, sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_scene() {
        let (scene, sim) = build(&SceneConfig::default());

        assert_eq!(sim.spheres.len(), 8);
        assert_eq!(scene.count_kind(|k| matches!(k, ObjectKind::Tile { .. })), 8);
        assert_eq!(scene.count_kind(|k| matches!(k, ObjectKind::Sphere { .. })), 8);
        assert_eq!(scene.count_kind(|k| *k == ObjectKind::Floor), 1);

        // Every tile carries exactly one hole
        for (_, object) in scene.iter() {
            if let ObjectKind::Tile { hole_centers } = &object.kind {
                assert_eq!(hole_centers.len(), 1);
            }
        }

        assert_eq!(scene.lighting.spot.position, [0.0, 30.0, 0.0]);
        assert_eq!(sim.wave.phase(), 0.0);
    }

    #[test]
    fn test_floor_is_transparent_shadow_catcher() {
        let (scene, _) = build(&SceneConfig::default());
        let (_, floor) = scene
            .iter()
            .find(|(_, o)| o.kind == ObjectKind::Floor)
            .unwrap();
        assert_eq!(floor.transform.translation, Vec3::new(0.0, -10.0, 0.0));
        assert!(floor.receive_shadow);
        let material = scene.material(floor.materials[0]).unwrap();
        assert!(material.is_transparent());
    }

    #[test]
    fn test_step_moves_scene_spheres_after_sync() {
        let (mut scene, mut sim) = build(&SceneConfig::default());
        sim.step();
        scene.sync_spheres(&sim.spheres);

        for sphere in sim.spheres.iter() {
            let object = scene.object(sphere.object).unwrap();
            assert_eq!(object.transform.translation, sphere.position);
            assert!(sphere.position.y >= -3.0 - 1e-5 && sphere.position.y <= 5.0 + 1e-5);
            // Only the height is animated
            assert!(SceneConfig::default()
                .placements
                .iter()
                .any(|p| p[0] == sphere.position.x && p[1] == sphere.position.z));
        }
    }

    #[test]
    fn test_empty_placements() {
        let config = SceneConfig {
            placements: Vec::new(),
            ..Default::default()
        };
        let (scene, sim) = build(&config);
        assert!(sim.spheres.is_empty());
        assert_eq!(scene.objects().len(), 1);
    }
}
