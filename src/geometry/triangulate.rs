//! Ear-clipping triangulation for polygons with holes
//!
//! Holes are stitched into the boundary with a zero-width bridge from each
//! hole's rightmost vertex to a visible boundary vertex, turning the outline
//! into one simple polygon that is then clipped ear by ear.

use glam::Vec2;

use super::outline::signed_area;

const EPSILON: f32 = 1e-7;

/// Triangulated polygon: input vertices (boundary first, then each hole)
/// and counter-clockwise triangles indexing into them.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<[u32; 3]>,
}

impl Triangulation {
    /// Total area covered by the triangles
    pub fn area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| self.vertices[i as usize]);
                (b - a).perp_dot(c - a) * 0.5
            })
            .sum()
    }
}

/// Triangulate `boundary` with `holes` cut out.
///
/// Vertex order in the result matches the input order, so callers can map
/// triangle indices back onto their own contours.
pub fn triangulate(boundary: &[Vec2], holes: &[&[Vec2]]) -> Triangulation {
    let mut vertices = boundary.to_vec();
    if boundary.len() < 3 {
        return Triangulation {
            vertices,
            triangles: Vec::new(),
        };
    }

    // Boundary runs counter-clockwise, holes clockwise
    let mut ring: Vec<u32> = (0..boundary.len() as u32).collect();
    if signed_area(boundary) < 0.0 {
        ring.reverse();
    }

    let mut hole_rings = Vec::with_capacity(holes.len());
    for hole in holes {
        let base = vertices.len() as u32;
        vertices.extend_from_slice(hole);
        if hole.len() < 3 {
            continue;
        }
        let mut idx: Vec<u32> = (base..base + hole.len() as u32).collect();
        if signed_area(hole) > 0.0 {
            idx.reverse();
        }
        hole_rings.push(idx);
    }

    // Bridge the rightmost holes first; bridges must also dodge holes still waiting
    hole_rings.sort_by(|a, b| rightmost_x(&vertices, b).total_cmp(&rightmost_x(&vertices, a)));
    for k in 0..hole_rings.len() {
        ring = bridge_hole(&vertices, ring, &hole_rings[k], &hole_rings[k + 1..]);
    }

    let triangles = clip_ears(&vertices, ring);
    Triangulation { vertices, triangles }
}

fn rightmost(vertices: &[Vec2], ring: &[u32]) -> usize {
    let mut best = 0;
    for (pos, &i) in ring.iter().enumerate() {
        if vertices[i as usize].x > vertices[ring[best] as usize].x {
            best = pos;
        }
    }
    best
}

fn rightmost_x(vertices: &[Vec2], ring: &[u32]) -> f32 {
    vertices[ring[rightmost(vertices, ring)] as usize].x
}

/// Splice `hole` into `ring` through a bridge from the hole's rightmost vertex.
///
/// The bridge goes to the closest ring vertex whose corner opens towards the
/// hole and whose segment crosses no edge of the ring, the hole or any
/// `pending` hole. Vertices already duplicated by earlier bridges are told
/// apart by their corners, so each copy only accepts holes in its own wedge.
fn bridge_hole(vertices: &[Vec2], ring: Vec<u32>, hole: &[u32], pending: &[Vec<u32>]) -> Vec<u32> {
    let m_pos = rightmost(vertices, hole);
    let m = vertices[hole[m_pos] as usize];
    let n = ring.len();

    let mut best: Option<(f32, usize)> = None;
    for pos in 0..n {
        let v = vertices[ring[pos] as usize];
        let dist = v.distance_squared(m);
        if best.is_some_and(|(d, _)| dist >= d) {
            continue;
        }
        if !corner_faces(vertices, &ring, pos, m) || !corner_faces(vertices, hole, m_pos, v) {
            continue;
        }
        let blocked = std::iter::once(ring.as_slice())
            .chain(std::iter::once(hole))
            .chain(pending.iter().map(|p| p.as_slice()))
            .any(|contour| segment_blocked(vertices, contour, m, v));
        if !blocked {
            best = Some((dist, pos));
        }
    }

    let bridge = match best {
        Some((_, pos)) => pos,
        None => {
            log::warn!("No visible boundary vertex for hole at {:?}; bridging to nearest", m);
            (0..n)
                .min_by(|&a, &b| {
                    let da = vertices[ring[a] as usize].distance_squared(m);
                    let db = vertices[ring[b] as usize].distance_squared(m);
                    da.total_cmp(&db)
                })
                .unwrap_or(0)
        }
    };

    let mut out = Vec::with_capacity(n + hole.len() + 2);
    out.extend_from_slice(&ring[..=bridge]);
    out.extend(hole[m_pos..].iter().chain(&hole[..m_pos]));
    out.push(hole[m_pos]);
    out.push(ring[bridge]);
    out.extend_from_slice(&ring[bridge + 1..]);
    out
}

/// Whether `target` lies inside the corner of `contour` at `pos`, on the
/// solid side (left of both edges for this winding)
fn corner_faces(vertices: &[Vec2], contour: &[u32], pos: usize, target: Vec2) -> bool {
    let n = contour.len();
    let prev = vertices[contour[(pos + n - 1) % n] as usize];
    let v = vertices[contour[pos] as usize];
    let next = vertices[contour[(pos + 1) % n] as usize];

    let after_prev = (v - prev).perp_dot(target - v) > 0.0;
    let before_next = (next - v).perp_dot(target - v) > 0.0;
    if (v - prev).perp_dot(next - v) >= 0.0 {
        after_prev && before_next
    } else {
        after_prev || before_next
    }
}

/// Whether segment `m`-`v` crosses an edge of `contour` or runs through one
/// of its vertices. Edges touching either endpoint don't count.
fn segment_blocked(vertices: &[Vec2], contour: &[u32], m: Vec2, v: Vec2) -> bool {
    let n = contour.len();
    (0..n).any(|i| {
        let a = vertices[contour[i] as usize];
        let b = vertices[contour[(i + 1) % n] as usize];
        if a == m || a == v || b == m || b == v {
            return false;
        }
        segments_cross(m, v, a, b) || on_segment(a, m, v)
    })
}

fn orientation(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Proper crossing: each segment strictly separates the other's endpoints
fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let straddles = |x: f32, y: f32| (x > 0.0 && y < 0.0) || (x < 0.0 && y > 0.0);
    straddles(orientation(p1, p2, q1), orientation(p1, p2, q2))
        && straddles(orientation(q1, q2, p1), orientation(q1, q2, p2))
}

/// Whether `p` lies strictly between `a` and `b` on their segment
fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    if orientation(a, b, p).abs() > EPSILON {
        return false;
    }
    let t = (p - a).dot(b - a);
    t > 0.0 && t < (b - a).length_squared()
}

fn clip_ears(vertices: &[Vec2], mut ring: Vec<u32>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut pos = 0;
    let mut misses = 0;
    let mut relaxed = false;

    while ring.len() > 3 {
        let n = ring.len();
        pos %= n;
        let prev = ring[(pos + n - 1) % n];
        let cur = ring[pos];
        let next = ring[(pos + 1) % n];
        let (a, b, c) = (vertices[prev as usize], vertices[cur as usize], vertices[next as usize]);
        let cross = (b - a).perp_dot(c - b);

        if cross.abs() <= EPSILON {
            // Collinear or spike: drop without emitting a triangle
            ring.remove(pos);
            misses = 0;
            continue;
        }

        if cross > 0.0 && (relaxed || !ring_intrudes(vertices, &ring, a, b, c)) {
            triangles.push([prev, cur, next]);
            ring.remove(pos);
            misses = 0;
            relaxed = false;
            continue;
        }

        pos += 1;
        misses += 1;
        if misses > n {
            if relaxed {
                log::warn!("Ear clipping gave up with {} vertices left", n);
                return triangles;
            }
            log::warn!("Ear clipping stalled with {} vertices left; relaxing", n);
            relaxed = true;
            misses = 0;
        }
    }

    if ring.len() == 3 {
        let [a, b, c] = [ring[0], ring[1], ring[2]].map(|i| vertices[i as usize]);
        if (b - a).perp_dot(c - a).abs() > EPSILON {
            triangles.push([ring[0], ring[1], ring[2]]);
        }
    }
    triangles
}

/// Whether any ring vertex other than the ear's own corners lies in the ear
fn ring_intrudes(vertices: &[Vec2], ring: &[u32], a: Vec2, b: Vec2, c: Vec2) -> bool {
    ring.iter().any(|&i| {
        let v = vertices[i as usize];
        v != a && v != b && v != c && point_in_triangle(v, a, b, c)
    })
}

/// Inclusive point-in-triangle test (works for either winding)
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::outline::{build_outline, place_holes_in_ring};

    fn circle(center: Vec2, radius: f32, segments: u32) -> Vec<Vec2> {
        (0..segments)
            .map(|i| {
                let t = i as f32 / segments as f32 * std::f32::consts::TAU;
                center + Vec2::new(t.cos(), t.sin()) * radius
            })
            .collect()
    }

    #[test]
    fn test_square_without_holes() {
        let outline = build_outline();
        let tri = triangulate(&outline.boundary, &[]);
        assert_eq!(tri.triangles.len(), 2);
        assert!((tri.area() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_clockwise_boundary_is_reoriented() {
        let cw = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(2.0, 2.0), Vec2::new(2.0, 0.0)];
        let tri = triangulate(&cw, &[]);
        assert_eq!(tri.triangles.len(), 2);
        assert!((tri.area() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_square_with_centered_hole() {
        let mut outline = build_outline();
        place_holes_in_ring(&mut outline, 1, 0.0);
        let hole = outline.holes[0].path.contour();
        let tri = triangulate(&outline.boundary, &[hole]);

        let expected = 4.0 - signed_area(hole).abs();
        assert!((tri.area() - expected).abs() < 1e-4, "area {}", tri.area());
        assert_eq!(tri.vertices.len(), 4 + hole.len());

        for t in &tri.triangles {
            let [a, b, c] = t.map(|i| tri.vertices[i as usize]);
            // Counter-clockwise and never inside the hole
            assert!((b - a).perp_dot(c - a) > 0.0);
            let centroid = (a + b + c) / 3.0;
            assert!(centroid.length() > 0.45);
        }
    }

    #[test]
    fn test_several_holes() {
        let boundary = [
            Vec2::new(-4.0, -2.0),
            Vec2::new(4.0, -2.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(-4.0, 2.0),
        ];
        let left = circle(Vec2::new(-2.0, 0.0), 0.5, 8);
        let right = circle(Vec2::new(2.0, 0.3), 0.7, 10);
        let tri = triangulate(&boundary, &[&left, &right]);

        let expected = 32.0 - signed_area(&left).abs() - signed_area(&right).abs();
        assert!((tri.area() - expected).abs() < 1e-3, "area {}", tri.area());
        for t in &tri.triangles {
            assert!(t.iter().all(|&i| (i as usize) < tri.vertices.len()));
        }
    }

    fn assert_covers(tri: &Triangulation, expected: f32) {
        assert!((tri.area() - expected).abs() < 1e-3, "area {} expected {}", tri.area(), expected);
        for t in &tri.triangles {
            let [a, b, c] = t.map(|i| tri.vertices[i as usize]);
            assert!((b - a).perp_dot(c - a) > 0.0, "flipped triangle {:?}", t);
        }
    }

    #[test]
    fn test_holes_sharing_a_bridge_corner() {
        let outline = build_outline();
        let top = circle(Vec2::new(0.0, 0.55), 0.2, 12);
        let right = circle(Vec2::new(0.55, 0.0), 0.2, 12);
        let tri = triangulate(&outline.boundary, &[&top, &right]);
        assert_covers(&tri, 4.0 - signed_area(&top).abs() - signed_area(&right).abs());
    }

    #[test]
    fn test_diamond_of_holes() {
        let outline = build_outline();
        let holes: Vec<Vec<Vec2>> = [(0.0, 0.55), (0.0, -0.55), (0.55, 0.0), (-0.55, 0.0)]
            .into_iter()
            .map(|(x, y)| circle(Vec2::new(x, y), 0.2, 12))
            .collect();
        let refs: Vec<&[Vec2]> = holes.iter().map(|h| h.as_slice()).collect();
        let tri = triangulate(&outline.boundary, &refs);

        let holes_area: f32 = holes.iter().map(|h| signed_area(h).abs()).sum();
        assert_covers(&tri, 4.0 - holes_area);
    }

    #[test]
    fn test_rings_of_small_holes() {
        let outline = build_outline();
        for count in 2..=8 {
            let holes: Vec<Vec<Vec2>> = (0..count)
                .map(|i| {
                    let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                    circle(Vec2::new(angle.sin(), angle.cos()) * 0.5, 0.15, 12)
                })
                .collect();
            let refs: Vec<&[Vec2]> = holes.iter().map(|h| h.as_slice()).collect();
            let tri = triangulate(&outline.boundary, &refs);

            let holes_area: f32 = holes.iter().map(|h| signed_area(h).abs()).sum();
            assert_covers(&tri, 4.0 - holes_area);
        }
    }

    #[test]
    fn test_degenerate_input() {
        let tri = triangulate(&[Vec2::ZERO, Vec2::X], &[]);
        assert!(tri.triangles.is_empty());
    }
}
