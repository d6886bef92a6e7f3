//! Outline extrusion into solid tiles
//!
//! Caps go into material group 0, side and hole walls into group 1.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::mesh::MeshData;
use super::outline::{Outline, signed_area};
use super::triangulate::triangulate;

/// Material slot for the top and bottom caps
pub const CAP_MATERIAL: u32 = 0;
/// Material slot for outer and hole walls
pub const WALL_MATERIAL: u32 = 1;

const MIN_DEPTH: f32 = 1e-3;

/// Extrusion settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeProfile {
    /// Wall subdivisions along the depth axis
    pub steps: u32,
    /// Thickness along +z
    pub depth: f32,
    /// Bevelled edges (not generated, see `extrude`)
    pub bevel_enabled: bool,
}

impl Default for ExtrudeProfile {
    fn default() -> Self {
        Self {
            steps: 1,
            depth: 1.0,
            bevel_enabled: false,
        }
    }
}

impl ExtrudeProfile {
    /// Clamp into a buildable profile
    fn sanitized(&self) -> Self {
        let mut profile = *self;
        if profile.steps == 0 {
            log::warn!("Extrude profile with 0 steps, using 1");
            profile.steps = 1;
        }
        if !profile.depth.is_finite() || profile.depth < MIN_DEPTH {
            log::warn!("Extrude depth {} out of range, using {}", profile.depth, MIN_DEPTH);
            profile.depth = MIN_DEPTH;
        }
        if profile.bevel_enabled {
            log::warn!("Bevelled extrusion is not supported, building square edges");
            profile.bevel_enabled = false;
        }
        profile
    }
}

/// Orient a contour: counter-clockwise when `ccw`, clockwise otherwise
fn oriented(points: &[Vec2], ccw: bool) -> Vec<Vec2> {
    let mut pts = points.to_vec();
    if (signed_area(&pts) > 0.0) != ccw {
        pts.reverse();
    }
    pts
}

/// Extrude `outline` along +z.
///
/// The cap at z = 0 faces -z, the cap at z = depth faces +z. Walls are
/// flat-shaded with normals pointing away from the solid, so hole walls face
/// into the hole.
pub fn extrude(outline: &Outline, profile: &ExtrudeProfile) -> MeshData {
    let profile = profile.sanitized();
    let depth = profile.depth;

    let boundary = oriented(&outline.boundary, true);
    let holes: Vec<Vec<Vec2>> = outline
        .holes
        .iter()
        .map(|h| oriented(h.path.contour(), false))
        .collect();
    let hole_refs: Vec<&[Vec2]> = holes.iter().map(|h| h.as_slice()).collect();
    let tri = triangulate(&boundary, &hole_refs);

    let wall_quads: usize = std::iter::once(&boundary)
        .chain(holes.iter())
        .map(|c| c.len())
        .sum::<usize>()
        * profile.steps as usize;

    let mut mesh = MeshData::default();
    mesh.positions.reserve(tri.vertices.len() * 2 + wall_quads * 4);
    mesh.normals.reserve(tri.vertices.len() * 2 + wall_quads * 4);

    // Caps
    let cap_start = mesh.indices.len() as u32;
    let bottom = push_cap(&mut mesh, &tri.vertices, 0.0, Vec3::NEG_Z);
    for t in &tri.triangles {
        mesh.indices.extend_from_slice(&[bottom + t[0], bottom + t[2], bottom + t[1]]);
    }
    let top = push_cap(&mut mesh, &tri.vertices, depth, Vec3::Z);
    for t in &tri.triangles {
        mesh.indices.extend_from_slice(&[top + t[0], top + t[1], top + t[2]]);
    }
    mesh.close_group(cap_start, CAP_MATERIAL);

    // Walls
    let wall_start = mesh.indices.len() as u32;
    for contour in std::iter::once(&boundary).chain(holes.iter()) {
        push_walls(&mut mesh, contour, depth, profile.steps);
    }
    mesh.close_group(wall_start, WALL_MATERIAL);

    mesh
}

fn push_cap(mesh: &mut MeshData, vertices: &[Vec2], z: f32, normal: Vec3) -> u32 {
    let base = mesh.vertex_count() as u32;
    for v in vertices {
        mesh.push_vertex(v.extend(z), normal);
    }
    base
}

fn push_walls(mesh: &mut MeshData, contour: &[Vec2], depth: f32, steps: u32) {
    let n = contour.len();
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        let edge = b - a;
        if edge.length_squared() == 0.0 {
            continue;
        }
        // Right-hand perpendicular: outward for CCW boundaries, into CW holes
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize();

        for s in 0..steps {
            let z0 = depth * s as f32 / steps as f32;
            let z1 = depth * (s + 1) as f32 / steps as f32;
            let a0 = mesh.push_vertex(a.extend(z0), normal);
            let b0 = mesh.push_vertex(b.extend(z0), normal);
            let b1 = mesh.push_vertex(b.extend(z1), normal);
            let a1 = mesh.push_vertex(a.extend(z1), normal);
            mesh.push_quad(a0, b0, b1, a1);
        }
    }
}
