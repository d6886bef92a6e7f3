//! GPU uniform data (must match shader.wgsl)
//!
//! Built from the scene on the CPU each frame, so everything here is plain
//! data and testable without a device.

use bytemuck::{Pod, Zeroable};

use super::camera::PerspectiveCamera;
use crate::scene::{Lighting, Material, ObjectKind, Scene, SceneObject};

/// Maximum number of shadow-casting spheres
pub const MAX_CASTERS: usize = 16;

/// Material kind codes read by the fragment shader
pub const KIND_BASIC: f32 = 0.0;
pub const KIND_PHYSICAL: f32 = 1.0;
pub const KIND_SHADOW: f32 = 2.0;

/// Per-frame scene data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4], // offset 0
    pub camera_pos: [f32; 4],     // offset 64
    /// Ambient rgb * intensity
    pub ambient: [f32; 4], // offset 80
    /// xyz position, w = cos(outer cone angle)
    pub spot_pos: [f32; 4], // offset 96
    /// xyz direction, w = cos(inner cone angle)
    pub spot_dir: [f32; 4], // offset 112
    /// rgb * intensity, w = 1 if the spot casts shadows
    pub spot_color: [f32; 4], // offset 128
    /// x = number of casters in use
    pub caster_count: [u32; 4], // offset 144
    /// xyz center, w radius
    pub casters: [[f32; 4]; MAX_CASTERS], // offset 160, 416 total
}

/// Per-draw object and material data, bound with a dynamic offset
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4], // offset 0
    /// Linear rgb, a = 1
    pub color: [f32; 4], // offset 64
    /// Linear rgb, w = reflectivity
    pub emissive: [f32; 4], // offset 80
    /// x = kind, y = metalness, z = roughness, w = opacity
    pub params: [f32; 4], // offset 96
    /// x = receives shadow, y = own caster index (-1 = none)
    pub flags: [f32; 4], // offset 112, 128 total
}

/// Shadow-casting spheres in scene order, capped at `MAX_CASTERS`
pub fn collect_casters(scene: &Scene) -> Vec<[f32; 4]> {
    let casters: Vec<[f32; 4]> = scene
        .objects()
        .iter()
        .filter(|o| o.cast_shadow)
        .filter_map(|o| match o.kind {
            ObjectKind::Sphere { radius } => Some(o.transform.translation.extend(radius).to_array()),
            _ => None,
        })
        .collect();
    if casters.len() > MAX_CASTERS {
        log::debug!("{} shadow casters, only the first {} are used", casters.len(), MAX_CASTERS);
    }
    casters.into_iter().take(MAX_CASTERS).collect()
}

impl Globals {
    pub fn new(lighting: &Lighting, camera: &PerspectiveCamera, casters: &[[f32; 4]]) -> Self {
        let spot = &lighting.spot;
        let ambient = lighting.ambient.color.to_linear() * lighting.ambient.intensity;
        let spot_color = spot.color.to_linear() * spot.intensity;
        let outer = spot.angle;
        let inner = outer * (1.0 - spot.penumbra.clamp(0.0, 1.0));

        let mut list = [[0.0; 4]; MAX_CASTERS];
        let count = casters.len().min(MAX_CASTERS);
        list[..count].copy_from_slice(&casters[..count]);

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            spot_pos: [spot.position[0], spot.position[1], spot.position[2], outer.cos()],
            spot_dir: spot.direction().extend(inner.cos()).to_array(),
            spot_color: spot_color
                .extend(if spot.cast_shadow { 1.0 } else { 0.0 })
                .to_array(),
            caster_count: [count as u32, 0, 0, 0],
            casters: list,
        }
    }
}

impl DrawUniform {
    /// Uniform for one mesh group of `object` drawn with `material`.
    /// `caster_index` is the object's slot in the caster list, if any.
    pub fn new(object: &SceneObject, material: &Material, caster_index: Option<usize>) -> Self {
        let (kind, color, emissive, metalness, roughness, reflectivity, opacity) = match *material {
            Material::Basic { color } => (KIND_BASIC, color.to_linear(), glam::Vec3::ZERO, 0.0, 1.0, 0.0, 1.0),
            Material::Physical {
                color,
                emissive,
                metalness,
                roughness,
                reflectivity,
            } => (
                KIND_PHYSICAL,
                color.to_linear(),
                emissive.to_linear(),
                metalness,
                roughness,
                reflectivity,
                1.0,
            ),
            Material::Shadow { opacity } => {
                (KIND_SHADOW, glam::Vec3::ZERO, glam::Vec3::ZERO, 0.0, 1.0, 0.0, opacity)
            }
        };

        Self {
            model: object.transform.matrix().to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
            emissive: emissive.extend(reflectivity).to_array(),
            params: [kind, metalness, roughness, opacity],
            flags: [
                if object.receive_shadow { 1.0 } else { 0.0 },
                caster_index.map_or(-1.0, |i| i as f32),
                0.0,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{self, Color};
    use crate::settings::{CameraConfig, SceneConfig};

    #[test]
    fn test_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<Globals>(), 416);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 128);
    }

    #[test]
    fn test_casters_are_the_spheres() {
        let (scene, sim) = scene::build(&SceneConfig::default());
        let casters = collect_casters(&scene);
        assert_eq!(casters.len(), 8);
        for (caster, sphere) in casters.iter().zip(sim.spheres.iter()) {
            assert_eq!(caster[0], sphere.position.x);
            assert_eq!(caster[2], sphere.position.z);
            assert_eq!(caster[3], 0.5);
        }
    }

    #[test]
    fn test_globals_from_default_scene() {
        let (scene, _) = scene::build(&SceneConfig::default());
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        let casters = collect_casters(&scene);
        let g = Globals::new(&scene.lighting, &camera, &casters);

        assert_eq!(g.caster_count[0], 8);
        assert_eq!(g.casters[8], [0.0; 4]);
        assert_eq!(g.spot_pos[1], 30.0);
        assert!((g.spot_pos[3] - 0.5).abs() < 1e-6);
        // No penumbra: inner and outer cones coincide
        assert!((g.spot_dir[3] - g.spot_pos[3]).abs() < 1e-6);
        assert_eq!(g.spot_dir[1], -1.0);
        assert_eq!(g.spot_color[3], 1.0);
    }

    #[test]
    fn test_draw_uniform_material_kinds() {
        let (scene, _) = scene::build(&SceneConfig::default());
        let floor = &scene.objects()[0];
        let shadow = DrawUniform::new(floor, &Material::Shadow { opacity: 0.08 }, None);
        assert_eq!(shadow.params, [KIND_SHADOW, 0.0, 1.0, 0.08]);
        assert_eq!(shadow.flags[0], 1.0);
        assert_eq!(shadow.flags[1], -1.0);

        let lit = DrawUniform::new(
            floor,
            &Material::Physical {
                color: Color::WHITE,
                emissive: Color::rgb(0xe0, 0x7c, 0xff),
                metalness: 0.2,
                roughness: 0.0,
                reflectivity: 1.0,
            },
            Some(3),
        );
        assert_eq!(lit.params[0], KIND_PHYSICAL);
        assert_eq!(lit.emissive[3], 1.0);
        assert_eq!(lit.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(lit.flags[1], 3.0);

        let basic = DrawUniform::new(floor, &Material::Basic { color: Color::WHITE }, None);
        assert_eq!(basic.params[0], KIND_BASIC);
        assert_eq!(basic.model[3][1], -10.0);
    }
}
