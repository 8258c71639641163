//! # Sweeps
//!
//! Tubes along 3D paths, tori, straight extrusions and lofts.
//!
//! A tube places one ring of section points at every distinct path point.
//! Ring frames come from a rotation-minimising transport of an initial
//! perpendicular (double reflection), so the surface does not twist on
//! curved paths. On closed paths any rotation left over after one loop is
//! spread evenly along the path so the seam band matches the others. A
//! counter-clockwise section faces away from the path.

use super::revolve::distinct_points;
use super::MeshBuilder;
use crate::error::{ensure_divisions, ensure_positive, MeshError, MeshResult};
use config::constants::{EPSILON, MIN_THETA_DIV, PATH_POINT_EPSILON};
use glam::{DQuat, DVec2, DVec3};
use std::f64::consts::PI;
use tracing::debug;

/// Unit circle with `divisions` points, counter-clockwise from `+X`.
fn unit_circle(divisions: u32) -> Vec<DVec2> {
    (0..divisions)
        .map(|i| {
            let (sin, cos) = (2.0 * PI * i as f64 / divisions as f64).sin_cos();
            DVec2::new(cos, sin)
        })
        .collect()
}

/// Per-point normals of a 2D polyline, `(dy, -dx)` of the adjacent edges.
fn section_normals(section: &[DVec2], closed: bool) -> Vec<DVec2> {
    let n = section.len();
    let edge_normal = |a: DVec2, b: DVec2| {
        let d = b - a;
        DVec2::new(d.y, -d.x).normalize_or_zero()
    };

    (0..n)
        .map(|k| {
            let prev = if k > 0 {
                Some(edge_normal(section[k - 1], section[k]))
            } else if closed {
                Some(edge_normal(section[n - 1], section[0]))
            } else {
                None
            };
            let next = if k + 1 < n {
                Some(edge_normal(section[k], section[k + 1]))
            } else if closed {
                Some(edge_normal(section[k], section[0]))
            } else {
                None
            };
            (prev.unwrap_or(DVec2::ZERO) + next.unwrap_or(DVec2::ZERO)).normalize_or_zero()
        })
        .collect()
}

/// Path tangents: edge bisectors inside the path, edge directions at open
/// ends.
fn path_tangents(path: &[DVec3], closed: bool) -> Vec<DVec3> {
    let n = path.len();
    (0..n)
        .map(|i| {
            let incoming = if i > 0 {
                Some(path[i] - path[i - 1])
            } else if closed {
                Some(path[0] - path[n - 1])
            } else {
                None
            };
            let outgoing = if i + 1 < n {
                Some(path[i + 1] - path[i])
            } else if closed {
                Some(path[0] - path[i])
            } else {
                None
            };
            match (incoming, outgoing) {
                (Some(a), Some(b)) => {
                    let (a, b) = (a.normalize(), b.normalize());
                    // A full reversal has no bisector; follow the outgoing edge.
                    (a + b).try_normalize().unwrap_or(b)
                }
                (Some(d), None) | (None, Some(d)) => d.normalize(),
                (None, None) => DVec3::Z,
            }
        })
        .collect()
}

/// Carries reference vector `r` from `(p0, t0)` to `(p1, t1)` by double
/// reflection.
fn transport_step(r: DVec3, p0: DVec3, p1: DVec3, t0: DVec3, t1: DVec3) -> DVec3 {
    let v1 = p1 - p0;
    let c1 = v1.dot(v1);
    let r_l = r - v1 * (2.0 / c1 * v1.dot(r));
    let t_l = t0 - v1 * (2.0 / c1 * v1.dot(t0));
    let v2 = t1 - t_l;
    let c2 = v2.dot(v2);
    let r = if c2 < EPSILON {
        r_l
    } else {
        r_l - v2 * (2.0 / c2 * v2.dot(r_l))
    };
    // Re-orthogonalize against drift.
    (r - t1 * r.dot(t1)).normalize_or_zero()
}

/// Angle from `a` to `b` about `axis`, both perpendicular to it.
fn signed_angle(a: DVec3, b: DVec3, axis: DVec3) -> f64 {
    a.cross(b).dot(axis).atan2(a.dot(b))
}

/// Rotation-minimising reference vectors along a path.
///
/// On a closed path the frame carried around the loop generally comes back
/// rotated. That angle is removed in proportion to arc length, so the twist
/// rate is the same on every segment including the closing one.
fn transport_frames(path: &[DVec3], tangents: &[DVec3], closed: bool) -> Vec<DVec3> {
    let n = path.len();
    let mut frames = Vec::with_capacity(n);
    frames.push(tangents[0].any_orthonormal_vector());
    for i in 0..n - 1 {
        let r = transport_step(frames[i], path[i], path[i + 1], tangents[i], tangents[i + 1]);
        frames.push(r);
    }
    if !closed {
        return frames;
    }

    let returned = transport_step(frames[n - 1], path[n - 1], path[0], tangents[n - 1], tangents[0]);
    let mismatch = signed_angle(frames[0], returned, tangents[0]);
    let length: f64 = (0..n).map(|i| path[i].distance(path[(i + 1) % n])).sum();
    if mismatch.abs() < EPSILON || length < EPSILON {
        return frames;
    }
    debug!(mismatch, "Spreading closed path frame mismatch");

    let mut travelled = 0.0;
    for i in 1..n {
        travelled += path[i - 1].distance(path[i]);
        let rotation = DQuat::from_axis_angle(tangents[i], -mismatch * travelled / length);
        frames[i] = rotation * frames[i];
    }
    frames
}

impl MeshBuilder {
    /// Appends a tube of circular cross-section along a path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path points; consecutive duplicates are skipped
    /// * `diameter` - Tube diameter
    /// * `theta_div` - Divisions around the tube, at least 3
    /// * `is_closed` - Join the last path point back to the first
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::DVec3;
    ///
    /// let mut builder = MeshBuilder::new(true, true);
    /// let path = [DVec3::ZERO, DVec3::Z, DVec3::Z, DVec3::new(1.0, 0.0, 2.0)];
    /// builder.add_tube(&path, 0.2, 8, false).unwrap();
    /// // The repeated point is skipped: 3 rings, 2 bands of 8 quads.
    /// assert_eq!(builder.triangle_count(), 2 * 8 * 2);
    /// ```
    pub fn add_tube(&mut self, path: &[DVec3], diameter: f64, theta_div: u32, is_closed: bool) -> MeshResult<()> {
        ensure_positive("diameter", diameter)?;
        ensure_divisions("theta_div", theta_div, MIN_THETA_DIV)?;
        self.add_tube_with_section(path, &[diameter], &unit_circle(theta_div), is_closed, true)
    }

    /// Appends a tube with an arbitrary 2D cross-section.
    ///
    /// # Arguments
    ///
    /// * `path` - Path points; consecutive duplicates are skipped
    /// * `diameters` - One diameter for the whole path, or one per path
    ///   point; section coordinates are scaled by half the diameter
    /// * `section` - Cross-section points in the ring frame
    /// * `is_tube_closed` - Join the last path point back to the first
    /// * `is_section_closed` - Join the last section point back to the first
    pub fn add_tube_with_section(
        &mut self,
        path: &[DVec3],
        diameters: &[f64],
        section: &[DVec2],
        is_tube_closed: bool,
        is_section_closed: bool,
    ) -> MeshResult<()> {
        let min_section = if is_section_closed { 3 } else { 2 };
        if section.len() < min_section {
            return Err(MeshError::invalid_parameter(
                "section",
                format!("needs at least {min_section} points, got {}", section.len()),
            ));
        }
        if diameters.len() != 1 && diameters.len() != path.len() {
            return Err(MeshError::invalid_parameter(
                "diameters",
                format!(
                    "expected 1 or {} diameters, got {}",
                    path.len(),
                    diameters.len()
                ),
            ));
        }
        if let Some(d) = diameters.iter().find(|d| **d < 0.0 || !d.is_finite()) {
            return Err(MeshError::invalid_parameter(
                "diameters",
                format!("must be finite and non-negative, got {d}"),
            ));
        }

        // Keep each retained point paired with its diameter.
        let samples: Vec<(DVec3, f64)> = path
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, diameters[i.min(diameters.len() - 1)]))
            .collect();
        let mut samples = distinct_points(&samples, |a, b| a.0.distance(b.0));
        if is_tube_closed && samples.len() > 2 {
            if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
                if first.0.distance(last.0) < PATH_POINT_EPSILON {
                    samples.pop();
                }
            }
        }
        if samples.len() < path.len() {
            debug!(
                skipped = path.len() - samples.len(),
                "Skipped coincident path points"
            );
        }
        let min_points = if is_tube_closed { 3 } else { 2 };
        if samples.len() < min_points {
            return Err(MeshError::invalid_parameter(
                "path",
                format!(
                    "needs at least {min_points} distinct points, got {}",
                    samples.len()
                ),
            ));
        }

        let points: Vec<DVec3> = samples.iter().map(|s| s.0).collect();
        let tangents = path_tangents(&points, is_tube_closed);
        let frames = transport_frames(&points, &tangents, is_tube_closed);
        let normals_2d = section_normals(section, is_section_closed);

        let columns = section.len() + usize::from(is_section_closed);
        let rows = points.len() + usize::from(is_tube_closed);
        let index0 = self.vertex_count() as u32;

        for i in 0..rows {
            let k = i % points.len();
            let (center, radius) = (points[k], samples[k].1 / 2.0);
            let u = frames[k];
            let v = u.cross(tangents[k]);
            let tex_v = i as f64 / (rows - 1) as f64;

            for j in 0..columns {
                let s = section[j % section.len()];
                let n = normals_2d[j % section.len()];
                let position = center + (u * s.x + v * s.y) * radius;
                let normal = u * n.x + v * n.y;
                let uv = DVec2::new(j as f64 / (columns - 1) as f64, tex_v);
                self.add_node(position, normal, uv);
            }
        }

        self.add_rectangular_mesh_triangle_indices(index0, rows, columns, false)
    }

    /// Appends a torus around the Z axis, centered at the origin.
    ///
    /// # Arguments
    ///
    /// * `torus_diameter` - Diameter of the circle through the tube centers
    /// * `tube_diameter` - Diameter of the tube
    /// * `theta_div` - Divisions around the Z axis, at least 3
    /// * `phi_div` - Divisions around the tube, at least 3
    pub fn add_torus(
        &mut self,
        torus_diameter: f64,
        tube_diameter: f64,
        theta_div: u32,
        phi_div: u32,
    ) -> MeshResult<()> {
        ensure_positive("torus_diameter", torus_diameter)?;
        ensure_positive("tube_diameter", tube_diameter)?;
        ensure_divisions("theta_div", theta_div, MIN_THETA_DIV)?;
        ensure_divisions("phi_div", phi_div, MIN_THETA_DIV)?;

        let radius = torus_diameter / 2.0;
        let path: Vec<DVec3> = unit_circle(theta_div)
            .into_iter()
            .map(|p| DVec3::new(p.x, p.y, 0.0) * radius)
            .collect();
        self.add_tube_with_section(&path, &[tube_diameter], &unit_circle(phi_div), true, true)
    }

    /// Sweeps an open 2D section along the straight segment `p0 → p1`.
    ///
    /// Section `x` runs along `x_axis` (made perpendicular to the segment)
    /// and section `y` along `x_axis × (p1 - p0)`.
    pub fn add_extruded_geometry(
        &mut self,
        section: &[DVec2],
        x_axis: DVec3,
        p0: DVec3,
        p1: DVec3,
    ) -> MeshResult<()> {
        if section.len() < 2 {
            return Err(MeshError::invalid_parameter(
                "section",
                format!("needs at least 2 points, got {}", section.len()),
            ));
        }
        let direction = (p1 - p0)
            .try_normalize()
            .ok_or_else(|| MeshError::invalid_parameter("p1", "must differ from p0"))?;
        let x = (x_axis - direction * x_axis.dot(direction))
            .try_normalize()
            .ok_or_else(|| {
                MeshError::invalid_parameter("x_axis", "must not be parallel to the extrusion")
            })?;
        let y = x.cross(direction);
        let normals_2d = section_normals(section, false);
        let columns = section.len();
        let index0 = self.vertex_count() as u32;

        for (origin, tex_v) in [(p0, 0.0), (p1, 1.0)] {
            for (j, (s, n)) in section.iter().zip(&normals_2d).enumerate() {
                let uv = DVec2::new(j as f64 / (columns - 1) as f64, tex_v);
                self.add_node(origin + x * s.x + y * s.y, x * n.x + y * n.y, uv);
            }
        }
        self.add_rectangular_mesh_triangle_indices(index0, 2, columns, false)
    }

    /// Stitches consecutive polylines of equal length into a surface.
    pub fn add_lofted_geometry(&mut self, position_lists: &[Vec<DVec3>]) -> MeshResult<()> {
        let columns = position_lists.first().map_or(0, Vec::len);
        if position_lists.len() < 2 || columns < 2 {
            return Err(MeshError::invalid_parameter(
                "position_lists",
                "needs at least 2 polylines of at least 2 points",
            ));
        }
        if let Some(list) = position_lists.iter().find(|l| l.len() != columns) {
            return Err(MeshError::invalid_parameter(
                "position_lists",
                format!("all polylines need {columns} points, found {}", list.len()),
            ));
        }
        let points: Vec<DVec3> = position_lists.concat();
        self.add_rectangular_mesh(&points, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_frames_stay_perpendicular() {
        let path: Vec<DVec3> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.2;
                DVec3::new(t.cos(), t.sin(), 0.3 * t)
            })
            .collect();
        let tangents = path_tangents(&path, false);
        let frames = transport_frames(&path, &tangents, false);
        for (r, t) in frames.iter().zip(&tangents) {
            assert!(r.dot(*t).abs() < 1e-9);
            assert!((r.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_straight_path_does_not_twist() {
        let path = [DVec3::ZERO, DVec3::Z, DVec3::new(0.0, 0.0, 5.0)];
        let tangents = path_tangents(&path, false);
        let frames = transport_frames(&path, &tangents, false);
        assert!((frames[0] - frames[2]).length() < 1e-12);
    }

    /// Trefoil knot sampled at `n` points.
    fn trefoil(n: usize) -> Vec<DVec3> {
        (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                DVec3::new(
                    t.sin() + 2.0 * (2.0 * t).sin(),
                    t.cos() - 2.0 * (2.0 * t).cos(),
                    -(3.0 * t).sin(),
                )
            })
            .collect()
    }

    /// Twist of each segment `i -> i + 1`, wrapping at the end.
    fn segment_twists(path: &[DVec3], tangents: &[DVec3], frames: &[DVec3]) -> Vec<f64> {
        let n = path.len();
        (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                let carried = transport_step(frames[i], path[i], path[j], tangents[i], tangents[j]);
                signed_angle(carried, frames[j], tangents[j])
            })
            .collect()
    }

    #[test]
    fn test_closed_path_twist_is_spread_evenly() {
        let path = trefoil(60);
        let tangents = path_tangents(&path, true);

        // Transported once around the knot, the frame comes back well off.
        let open = transport_frames(&path, &tangents, false);
        let seam = segment_twists(&path, &tangents, &open)[59];
        assert!(seam.abs() > 1.0, "seam twist {seam}");

        let frames = transport_frames(&path, &tangents, true);
        let twists = segment_twists(&path, &tangents, &frames);
        let rates: Vec<f64> = twists
            .iter()
            .enumerate()
            .map(|(i, t)| t / path[i].distance(path[(i + 1) % 60]))
            .collect();
        for rate in &rates {
            assert!((rate - rates[0]).abs() < 1e-9, "{rate} vs {}", rates[0]);
        }
        assert!(twists.iter().all(|t| t.abs() < 0.1));
        for (r, t) in frames.iter().zip(&tangents) {
            assert!(r.dot(*t).abs() < 1e-9);
            assert!((r.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_planar_loop_frames_are_untouched() {
        let path: Vec<DVec3> = unit_circle(16).iter().map(|p| p.extend(0.0)).collect();
        let tangents = path_tangents(&path, true);
        assert_eq!(
            transport_frames(&path, &tangents, true),
            transport_frames(&path, &tangents, false)
        );
    }

    #[test]
    fn test_section_normals_of_circle_are_radial() {
        let circle = unit_circle(12);
        for (p, n) in circle.iter().zip(section_normals(&circle, true)) {
            assert!((*p - n).length() < 1e-12);
        }
    }
}
