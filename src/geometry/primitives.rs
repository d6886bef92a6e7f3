//! Primitive meshes: UV sphere and horizontal plane

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use super::mesh::MeshData;

/// UV sphere centered at the origin.
///
/// `width_segments` slices around the vertical axis, `height_segments` from
/// pole to pole. Seam and pole vertices are duplicated so each ring has
/// `width_segments + 1` vertices.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut mesh = MeshData::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity((h + 1) as usize);

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let theta = v * PI;
        let mut row = Vec::with_capacity((w + 1) as usize);
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let phi = u * TAU;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            row.push(mesh.push_vertex(normal * radius, normal));
        }
        grid.push(row);
    }

    for iy in 0..h as usize {
        for ix in 0..w as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            // Pole rows collapse to a single triangle
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h as usize - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh.close_group(0, 0);
    mesh
}

/// Horizontal plane at y = 0 facing +y
pub fn plane(width: f32, depth: f32) -> MeshData {
    let (hw, hd) = (width * 0.5, depth * 0.5);
    let mut mesh = MeshData::default();
    let a = mesh.push_vertex(Vec3::new(-hw, 0.0, -hd), Vec3::Y);
    let b = mesh.push_vertex(Vec3::new(hw, 0.0, -hd), Vec3::Y);
    let c = mesh.push_vertex(Vec3::new(hw, 0.0, hd), Vec3::Y);
    let d = mesh.push_vertex(Vec3::new(-hw, 0.0, hd), Vec3::Y);
    mesh.indices.extend_from_slice(&[a, c, b, a, d, c]);
    mesh.close_group(0, 0);
    mesh
}
