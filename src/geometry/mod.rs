//! Procedural geometry
//!
//! Everything here is pure: the same inputs always produce the same meshes.
//! - Outlines are built in a local 2D plane (x, y)
//! - Extrusion sweeps along +z
//! - No rendering or platform dependencies

pub mod extrude;
pub mod mesh;
pub mod outline;
pub mod primitives;
pub mod triangulate;

pub use extrude::{CAP_MATERIAL, ExtrudeProfile, WALL_MATERIAL, extrude};
pub use mesh::{MeshData, MeshGroup};
pub use outline::{Hole, Outline, Path, add_hole, build_outline, place_holes_in_ring};
pub use primitives::{plane, sphere};
pub use triangulate::{Triangulation, triangulate};
