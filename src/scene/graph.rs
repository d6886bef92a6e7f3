//! Scene graph: mesh and material libraries plus placed objects

use glam::{Mat4, Quat, Vec2, Vec3};

use super::material::{AmbientLight, Material, SpotLight};
use crate::geometry::MeshData;
use crate::sim::SphereRegistry;

/// Index into the scene's mesh library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Index into the scene's material library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Index of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

/// Placement of an object in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position
    pub translation: Vec3,
    /// Orientation applied before translation
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Unrotated placement at `translation`
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Replace the rotation, keeping the position
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Model matrix: rotate, then translate
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// What an object is, for bookkeeping and shadow casting
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Extruded floor tile; hole centers kept for reference
    Tile { hole_centers: Vec<Vec2> },
    /// Animated sphere; casts a shadow of this radius
    Sphere { radius: f32 },
    /// Shadow-catching ground plane
    Floor,
}

/// A mesh placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// What this object represents
    pub kind: ObjectKind,
    /// Geometry drawn for this object
    pub mesh: MeshId,
    /// One material per mesh group, indexed by the group's material slot
    pub materials: Vec<MaterialId>,
    pub transform: Transform,
    /// Occludes the spot light for other surfaces
    pub cast_shadow: bool,
    /// Darkened where the spot light is occluded
    pub receive_shadow: bool,
}

/// Accepts meshes, materials and objects to display. Nothing is ever removed.
pub trait SceneSink {
    /// Store a mesh and return its id
    fn add_mesh(&mut self, mesh: MeshData) -> MeshId;
    /// Store a material and return its id
    fn add_material(&mut self, material: Material) -> MaterialId;
    /// Place an object and return its id
    fn add(&mut self, object: SceneObject) -> ObjectId;
}

/// Lights shared by the whole scene
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lighting {
    /// Uniform fill light
    pub ambient: AmbientLight,
    /// The single shadow-casting light
    pub spot: SpotLight,
}

/// In-memory scene graph
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<MeshData>,
    materials: Vec<Material>,
    objects: Vec<SceneObject>,
    /// Lights applied to every lit material
    pub lighting: Lighting,
}

impl Scene {
    /// Empty scene with the given lights
    pub fn new(lighting: Lighting) -> Self {
        Self {
            lighting,
            ..Default::default()
        }
    }

    /// All meshes, indexed by `MeshId`
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    /// Look up a mesh
    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0 as usize)
    }

    /// Look up a material
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    /// All placed objects in insertion order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Look up a placed object
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0 as usize)
    }

    /// Iterate (id, object) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId(i as u32), o))
    }

    /// Move an object; unknown ids are ignored
    pub fn set_translation(&mut self, id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(id.0 as usize) {
            object.transform.translation = translation;
        }
    }

    /// Copy simulated sphere positions onto their scene objects
    pub fn sync_spheres(&mut self, spheres: &SphereRegistry) {
        for sphere in spheres.iter() {
            self.set_translation(sphere.object, sphere.position);
        }
    }

    /// Count objects matching a predicate on their kind
    pub fn count_kind(&self, pred: impl Fn(&ObjectKind) -> bool) -> usize {
        self.objects.iter().filter(|o| pred(&o.kind)).count()
    }
}

impl SceneSink for Scene {
    fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    fn add(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() as u32 - 1)
    }
}
