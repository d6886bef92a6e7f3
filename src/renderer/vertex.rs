//! Vertex types for 3D mesh rendering

use bytemuck::{Pod, Zeroable};

use crate::geometry::MeshData;

/// Lit mesh vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Interleave a mesh's positions and normals
    pub fn from_mesh(mesh: &MeshData) -> Vec<Vertex> {
        mesh.positions
            .iter()
            .zip(mesh.normals.iter())
            .map(|(p, n)| Vertex::new(p.to_array(), n.to_array()))
            .collect()
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plane;

    #[test]
    fn test_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 24);
        assert_eq!(desc.attributes[1].offset, 12);
    }

    #[test]
    fn test_from_mesh_interleaves() {
        let mesh = plane(2.0, 2.0);
        let verts = Vertex::from_mesh(&mesh);
        assert_eq!(verts.len(), mesh.vertex_count());
        assert_eq!(verts[0].position, mesh.positions[0].to_array());
        assert_eq!(verts[0].normal, [0.0, 1.0, 0.0]);
    }
}
