//! Polygon triangulation for PLY face lists.
//!
//! Polygons are split into `n - 2` triangles. Quads use the shorter
//! diagonal, larger polygons are ear-clipped in the plane of their Newell
//! normal, and anything that cannot be resolved from positions falls back
//! to a fan around the first vertex. Winding order is preserved.

use glam::{Vec2, Vec3};
use tracing::trace;

/// Number of triangles produced for a polygon with `n` corners.
pub fn polygon_triangle_count(n: usize) -> usize {
    n.saturating_sub(2)
}

/// Append the triangles of one polygon to `dst`.
///
/// `positions` is indexed by the polygon's vertex indices. Returns the
/// number of triangles written.
pub fn triangulate_polygon(indices: &[i32], positions: &[[f32; 3]], dst: &mut Vec<[i32; 3]>) -> usize {
    match indices.len() {
        0..=2 => 0,
        3 => {
            dst.push([indices[0], indices[1], indices[2]]);
            1
        }
        n => {
            let Some(points) = gather_positions(indices, positions) else {
                trace!("Polygon references vertices outside the position buffer, using fan");
                return triangulate_fan(indices, dst);
            };
            if n == 4 {
                split_quad(indices, &points, dst)
            } else {
                ear_clip(indices, &points, dst)
            }
        }
    }
}

/// Fan triangulation around the first corner.
pub fn triangulate_fan(indices: &[i32], dst: &mut Vec<[i32; 3]>) -> usize {
    let Some((&first, rest)) = indices.split_first() else {
        return 0;
    };
    let before = dst.len();
    dst.extend(rest.windows(2).map(|pair| [first, pair[0], pair[1]]));
    dst.len() - before
}

fn gather_positions(indices: &[i32], positions: &[[f32; 3]]) -> Option<Vec<Vec3>> {
    indices
        .iter()
        .map(|&i| {
            usize::try_from(i)
                .ok()
                .and_then(|i| positions.get(i))
                .map(|p| Vec3::from_array(*p))
        })
        .collect()
}

fn split_quad(indices: &[i32], points: &[Vec3], dst: &mut Vec<[i32; 3]>) -> usize {
    let d02 = points[0].distance_squared(points[2]);
    let d13 = points[1].distance_squared(points[3]);
    if d02 <= d13 {
        dst.push([indices[0], indices[1], indices[2]]);
        dst.push([indices[0], indices[2], indices[3]]);
    } else {
        dst.push([indices[0], indices[1], indices[3]]);
        dst.push([indices[1], indices[2], indices[3]]);
    }
    2
}

/// Newell's method; the result is not normalized.
fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Project onto the plane dropping the dominant normal axis, keeping the
/// polygon counter-clockwise in 2D.
fn project(points: &[Vec3], normal: Vec3) -> Vec<Vec2> {
    let abs = normal.abs();
    if abs.z >= abs.x && abs.z >= abs.y {
        let flip = normal.z < 0.0;
        points
            .iter()
            .map(|p| if flip { Vec2::new(p.y, p.x) } else { Vec2::new(p.x, p.y) })
            .collect()
    } else if abs.y >= abs.x {
        let flip = normal.y < 0.0;
        points
            .iter()
            .map(|p| if flip { Vec2::new(p.x, p.z) } else { Vec2::new(p.z, p.x) })
            .collect()
    } else {
        let flip = normal.x < 0.0;
        points
            .iter()
            .map(|p| if flip { Vec2::new(p.z, p.y) } else { Vec2::new(p.y, p.z) })
            .collect()
    }
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn ear_clip(indices: &[i32], points: &[Vec3], dst: &mut Vec<[i32; 3]>) -> usize {
    let normal = newell_normal(points);
    if normal.length_squared() <= f32::EPSILON * f32::EPSILON {
        trace!("Degenerate polygon normal, using fan");
        return triangulate_fan(indices, dst);
    }
    let flat = project(points, normal);

    let mut remaining: Vec<usize> = (0..indices.len()).collect();
    let mut written = 0;
    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let prev = remaining[(i + n - 1) % n];
            let cur = remaining[i];
            let next = remaining[(i + 1) % n];
            let (a, b, c) = (flat[prev], flat[cur], flat[next]);
            if cross(a, b, c) <= 0.0 {
                return false;
            }
            remaining
                .iter()
                .filter(|&&j| j != prev && j != cur && j != next)
                .all(|&j| !point_in_triangle(flat[j], a, b, c))
        });

        let Some(i) = ear else {
            trace!("No ear found in {} remaining corners, using fan", n);
            let rest: Vec<i32> = remaining.iter().map(|&j| indices[j]).collect();
            return written + triangulate_fan(&rest, dst);
        };

        let prev = remaining[(i + n - 1) % n];
        let next = remaining[(i + 1) % n];
        dst.push([indices[prev], indices[remaining[i]], indices[next]]);
        written += 1;
        remaining.remove(i);
    }

    dst.push([
        indices[remaining[0]],
        indices[remaining[1]],
        indices[remaining[2]],
    ]);
    written + 1
}
