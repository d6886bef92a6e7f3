//! Indexed triangle mesh with material groups

use glam::Vec3;

/// A contiguous run of indices drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshGroup {
    /// First index (into `MeshData::indices`)
    pub start: u32,
    /// Number of indices
    pub count: u32,
    /// Material slot used for this run
    pub material_index: u32,
}

/// CPU-side mesh geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub groups: Vec<MeshGroup>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex, returning its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    /// Append a quad as two triangles (a, b, c) and (a, c, d)
    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Close the indices added since `start` into a group for `material_index`
    pub fn close_group(&mut self, start: u32, material_index: u32) {
        let count = self.indices.len() as u32 - start;
        if count > 0 {
            self.groups.push(MeshGroup {
                start,
                count,
                material_index,
            });
        }
    }

    /// Indices belonging to a group
    pub fn group_indices(&self, group: &MeshGroup) -> &[u32] {
        let start = group.start as usize;
        &self.indices[start..start + group.count as usize]
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }
}
