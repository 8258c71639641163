//! # Corner Chamfer
//!
//! Cuts a corner off a mesh with a plane perpendicular to the corner
//! normal and fills the cut with triangles.

use super::MeshBuilder;
use config::constants::approx_zero;
use glam::DVec3;
use tracing::{debug, warn};

/// Intersection of the line through `a` and `b` with a plane, `None` when
/// the line is parallel to it.
fn line_plane_intersection(a: DVec3, b: DVec3, plane_point: DVec3, plane_normal: DVec3) -> Option<DVec3> {
    let direction = b - a;
    let denominator = direction.dot(plane_normal);
    if approx_zero(denominator) {
        return None;
    }
    let t = (plane_point - a).dot(plane_normal) / denominator;
    Some(a + direction * t)
}

fn push_unique(points: &mut Vec<DVec3>, p: DVec3, tolerance: f64) {
    if !points.iter().any(|q| q.distance(p) <= tolerance) {
        points.push(p);
    }
}

/// Keeps the corners of the cut outline: a point lying between two other
/// points on the line through them is where the plane crossed a face
/// diagonal, not a new corner.
fn outline_corners(points: Vec<DVec3>, tolerance: f64) -> Vec<DVec3> {
    let on_segment = |p: DVec3, a: DVec3, b: DVec3| {
        let ab = b - a;
        let length = ab.length();
        length > tolerance
            && (p - a).cross(ab).length() <= tolerance * length
            && (p - a).dot(p - b) < 0.0
    };
    points
        .iter()
        .enumerate()
        .filter(|&(i, &p)| {
            !points.iter().enumerate().any(|(j, &a)| {
                j != i
                    && points
                        .iter()
                        .enumerate()
                        .any(|(k, &b)| k != i && k != j && on_segment(p, a, b))
            })
        })
        .map(|(_, &p)| p)
        .collect()
}

impl MeshBuilder {
    /// Chamfers the mesh at `corner`.
    ///
    /// Every triangle with a vertex within `tolerance` of `corner` is cut by
    /// the plane through `corner - n * chamfer_distance` with normal `n`,
    /// where `n` is the normalized sum of the distinct incident face normals.
    /// The cut opening is filled with a fan around the new corner point.
    ///
    /// Returns the corners of the cut outline (deduplicated within
    /// `tolerance`) so they can be chamfered in turn. Points where the plane
    /// crosses a flat face between two corners are not returned.
    ///
    /// A `chamfer_distance` below `tolerance`, or a corner no triangle
    /// touches, leaves the builder unchanged and returns no points.
    /// Otherwise vertices are unshared and the normal and texture coordinate
    /// buffers are dropped; `to_mesh(true)` recomputes normals.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::DVec3;
    ///
    /// let mut builder = MeshBuilder::new(false, false);
    /// builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    ///
    /// // One new corner on each of the three box edges.
    /// let points = builder.chamfer_corner(DVec3::splat(0.5), 0.1, 1e-6);
    /// assert_eq!(points.len(), 3);
    ///
    /// let unchanged = builder.triangle_count();
    /// assert!(builder.chamfer_corner(DVec3::splat(-0.5), 1e-9, 1e-6).is_empty());
    /// assert_eq!(builder.triangle_count(), unchanged);
    /// ```
    pub fn chamfer_corner(&mut self, corner: DVec3, chamfer_distance: f64, tolerance: f64) -> Vec<DVec3> {
        if chamfer_distance.is_nan() || chamfer_distance < tolerance {
            debug!(chamfer_distance, tolerance, "Chamfer below tolerance skipped");
            return Vec::new();
        }

        let mut face_normals: Vec<DVec3> = Vec::new();
        for tri in self.triangle_indices.chunks_exact(3) {
            let p = [0, 1, 2].map(|k| self.positions[tri[k] as usize]);
            if p.iter().any(|v| v.distance(corner) <= tolerance) {
                if let Some(n) = (p[1] - p[0]).cross(p[2] - p[0]).try_normalize() {
                    push_unique(&mut face_normals, n, tolerance);
                }
            }
        }
        let Some(corner_normal) = face_normals.iter().sum::<DVec3>().try_normalize() else {
            warn!(?corner, "No usable triangle at chamfer corner");
            return Vec::new();
        };

        self.no_shared_vertices();
        self.normals = None;
        self.texture_coordinates = None;
        self.tangents = None;
        self.bitangents = None;

        let new_corner = corner - corner_normal * chamfer_distance;
        let corner_index = self.positions.len() as u32;
        self.positions.push(new_corner);

        let mut chamfer_points = Vec::new();
        let triangle_count = self.triangle_count();
        for t in 0..triangle_count {
            let base = 3 * t;
            let tri = [0, 1, 2].map(|k| self.triangle_indices[base + k]);
            let distances = tri.map(|i| self.positions[i as usize].distance(corner));

            // Rotate so that slot 0 holds the vertex nearest the corner.
            let nearest = (0..3)
                .min_by(|&a, &b| distances[a].total_cmp(&distances[b]))
                .unwrap_or(0);
            if distances[nearest] > tolerance {
                continue;
            }
            let [i0, i1, i2] = [0, 1, 2].map(|k| tri[(nearest + k) % 3]);
            let [p0, p1, p2] = [i0, i1, i2].map(|i| self.positions[i as usize]);

            let (Some(p01), Some(p02)) = (
                line_plane_intersection(p0, p1, new_corner, corner_normal),
                line_plane_intersection(p0, p2, new_corner, corner_normal),
            ) else {
                continue;
            };
            push_unique(&mut chamfer_points, p01, tolerance);
            push_unique(&mut chamfer_points, p02, tolerance);

            // The corner vertex moves onto the first cut edge; the rest of the
            // cut quad and the fan triangle are appended.
            self.positions[i0 as usize] = p01;
            let i02 = self.positions.len() as u32;
            self.positions.push(p02);
            self.triangle_indices
                .extend([i0, i2, i02, corner_index, i0, i02]);
        }

        self.no_shared_vertices();
        let chamfer_points = outline_corners(chamfer_points, tolerance);
        debug!(
            ?corner,
            chamfer_distance,
            points = chamfer_points.len(),
            triangles = self.triangle_count(),
            "Chamfered corner"
        );
        chamfer_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_corners_drop_points_between_corners() {
        let points = vec![
            DVec3::X,
            DVec3::new(0.5, 0.5, 0.0),
            DVec3::Y,
            DVec3::Z,
        ];
        assert_eq!(outline_corners(points, 1e-9), vec![DVec3::X, DVec3::Y, DVec3::Z]);
    }

    #[test]
    fn test_outline_corners_keep_end_points_of_a_line() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)];
        assert_eq!(outline_corners(points, 1e-9), vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)]);
    }
}
