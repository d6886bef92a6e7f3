//! 2D outlines with circular holes
//!
//! An outline is a closed polygon boundary plus any number of hole loops cut
//! out of its interior. Tiles are built by extruding an outline.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::consts::{HOLE_RADIUS, HOLE_SEGMENTS, TILE_HALF_SIZE};
use crate::radians;

/// A pen-style sub-path: a start point followed by traced points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    /// Pen position set by `move_to` (not part of the traced loop)
    pub start: Vec2,
    /// Traced points, in order
    pub points: Vec<Vec2>,
    /// Connect the last traced point back to the first
    pub auto_close: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift the pen and place it at `point`
    pub fn move_to(&mut self, point: Vec2) {
        self.start = point;
    }

    /// Trace a circular arc around `center` from `start_angle` to `end_angle`
    /// using `segments` straight pieces.
    ///
    /// A full turn drops the duplicated end point, leaving a loop of exactly
    /// `segments` distinct points.
    pub fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, segments: u32) {
        let segments = segments.max(3);
        let sweep = end_angle - start_angle;
        let full_turn = (sweep.abs() - TAU).abs() < 1e-5;
        let count = if full_turn { segments } else { segments + 1 };

        self.points.reserve(count as usize);
        for i in 0..count {
            let t = start_angle + sweep * (i as f32 / segments as f32);
            self.points.push(center + Vec2::new(t.cos(), t.sin()) * radius);
        }
    }

    /// Closed loop of traced points (the start point is a pen move, not a vertex)
    pub fn contour(&self) -> &[Vec2] {
        &self.points
    }
}

/// A circular hole owned by one outline
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub path: Path,
    /// Center recorded for later reference
    pub center: Vec2,
    pub radius: f32,
}

/// A closed polygon boundary with holes
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Boundary points; the last connects back to the first when `auto_close`
    pub boundary: Vec<Vec2>,
    pub auto_close: bool,
    pub holes: Vec<Hole>,
}

impl Outline {
    pub fn new(boundary: Vec<Vec2>) -> Self {
        Self {
            boundary,
            auto_close: true,
            holes: Vec::new(),
        }
    }

    /// Centers of every hole, in insertion order
    pub fn hole_centers(&self) -> Vec<Vec2> {
        self.holes.iter().map(|h| h.center).collect()
    }

    /// Signed area of the boundary (positive when counter-clockwise)
    pub fn boundary_area(&self) -> f32 {
        signed_area(&self.boundary)
    }

    /// Whether a point lies strictly inside the boundary polygon
    pub fn boundary_contains(&self, p: Vec2) -> bool {
        let pts = &self.boundary;
        let mut inside = false;
        let mut j = pts.len().wrapping_sub(1);
        for i in 0..pts.len() {
            let (a, b) = (pts[i], pts[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Signed polygon area via the shoelace formula
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Build the square tile outline centered at the origin
pub fn build_outline() -> Outline {
    let s = TILE_HALF_SIZE;
    Outline::new(vec![
        Vec2::new(-s, s),
        Vec2::new(-s, -s),
        Vec2::new(s, -s),
        Vec2::new(s, s),
    ])
}

/// Punch a circular hole into `outline`
pub fn add_hole(outline: &mut Outline, center_x: f32, center_z: f32, radius: f32) {
    let center = Vec2::new(center_x, center_z);
    let mut path = Path::new();
    path.move_to(center);
    path.arc(center, radius, 0.0, TAU, HOLE_SEGMENTS);
    // Closure is flagged explicitly rather than inferred from endpoints
    path.auto_close = true;

    outline.holes.push(Hole { path, center, radius });
}

/// Distribute `count` holes evenly around a circle of `radius`.
///
/// The i-th hole sits at `360 / count * i` degrees, offset by
/// `(sin, cos) * 2 * radius` from the outline origin.
pub fn place_holes_in_ring(outline: &mut Outline, count: u32, radius: f32) {
    if count == 0 {
        return;
    }

    let step = 360.0 / count as f32;
    let distance = radius * 2.0;

    for i in 0..count {
        let angle = radians(step * i as f32);
        let x = angle.sin() * distance;
        let z = angle.cos() * distance;
        add_hole(outline, x, z, HOLE_RADIUS);
    }
}
