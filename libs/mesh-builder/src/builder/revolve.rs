//! # Surfaces of Revolution
//!
//! A 2D profile `(x, y)` is revolved around an axis: `x` is the distance
//! along the axis from its origin and `y` the radius. Cylinders, cones,
//! arrows and pipes are all profiles.
//!
//! Every profile segment gets its own pair of rings, so normals are smooth
//! around the axis but flat along the profile. A profile segment running in
//! `+x` at positive radius faces away from the axis.

use super::MeshBuilder;
use crate::error::{ensure_divisions, ensure_non_negative, ensure_positive, MeshError, MeshResult};
use config::constants::{approx_zero, EPSILON, MIN_THETA_DIV, PATH_POINT_EPSILON};
use glam::{DVec2, DVec3};
use std::f64::consts::PI;
use tracing::debug;

/// Drops consecutive points closer than [`PATH_POINT_EPSILON`].
pub(crate) fn distinct_points<T: Copy>(points: &[T], distance: impl Fn(T, T) -> f64) -> Vec<T> {
    let mut result: Vec<T> = Vec::with_capacity(points.len());
    for &p in points {
        match result.last() {
            Some(&last) if distance(last, p) < PATH_POINT_EPSILON => {}
            _ => result.push(p),
        }
    }
    result
}

/// Orthonormal pair `(u, v)` perpendicular to `axis` with `v = u × axis`.
pub(crate) fn ring_frame(axis: DVec3) -> (DVec3, DVec3) {
    let u = axis.any_orthonormal_vector();
    (u, u.cross(axis))
}

impl MeshBuilder {
    /// Revolves a profile around an axis.
    ///
    /// # Arguments
    ///
    /// * `profile` - Points `(distance along axis, radius)`
    /// * `axis_origin` - Point on the axis where `x = 0`
    /// * `axis_direction` - Axis direction, need not be unit length
    /// * `theta_div` - Divisions around the axis, at least 3
    ///
    /// Consecutive coincident profile points are skipped; at least two
    /// distinct points must remain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::{DVec2, DVec3};
    ///
    /// // Open cylinder of radius 1 and height 2 around Z.
    /// let mut builder = MeshBuilder::new(true, false);
    /// let profile = [DVec2::new(0.0, 1.0), DVec2::new(2.0, 1.0)];
    /// builder.add_revolved_geometry(&profile, DVec3::ZERO, DVec3::Z, 8).unwrap();
    /// assert_eq!(builder.triangle_count(), 16);
    /// ```
    pub fn add_revolved_geometry(
        &mut self,
        profile: &[DVec2],
        axis_origin: DVec3,
        axis_direction: DVec3,
        theta_div: u32,
    ) -> MeshResult<()> {
        ensure_divisions("theta_div", theta_div, MIN_THETA_DIV)?;
        let axis = axis_direction.try_normalize().ok_or_else(|| {
            MeshError::invalid_parameter("axis_direction", "must be a non-zero vector")
        })?;
        let points = distinct_points(profile, |a, b| a.distance(b));
        if points.len() < 2 {
            return Err(MeshError::invalid_parameter(
                "profile",
                format!("needs at least 2 distinct points, got {}", points.len()),
            ));
        }
        if points.len() < profile.len() {
            debug!(
                skipped = profile.len() - points.len(),
                "Skipped coincident profile points"
            );
        }

        let (u, v) = ring_frame(axis);
        let columns = theta_div as usize + 1;
        let ring: Vec<DVec3> = (0..columns)
            .map(|j| {
                let (sin, cos) = (2.0 * PI * j as f64 / theta_div as f64).sin_cos();
                u * cos + v * sin
            })
            .collect();

        let total_length: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let mut travelled = 0.0;

        for segment in points.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let tangent = b - a;
            // Outward profile normal in (axial, radial) coordinates.
            let profile_normal = DVec2::new(-tangent.y, tangent.x).normalize_or_zero();
            let v_start = travelled / total_length;
            travelled += tangent.length();
            let v_end = travelled / total_length;

            let index0 = self.vertex_count() as u32;
            for (p, tex_v) in [(a, v_start), (b, v_end)] {
                for (j, w) in ring.iter().enumerate() {
                    let position = axis_origin + axis * p.x + *w * p.y;
                    let normal = axis * profile_normal.x + *w * profile_normal.y;
                    let uv = DVec2::new(j as f64 / theta_div as f64, tex_v);
                    self.add_node(position, normal, uv);
                }
            }
            self.add_rectangular_mesh_triangle_indices(index0, 2, columns, false)?;
        }
        Ok(())
    }

    /// Appends a cylinder between two points.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::DVec3;
    ///
    /// let mut builder = MeshBuilder::new(true, true);
    /// builder.add_cylinder(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0), 1.0, 12, true).unwrap();
    /// // Side plus two caps, one pair of rings each.
    /// assert_eq!(builder.triangle_count(), 3 * 2 * 12);
    /// ```
    pub fn add_cylinder(
        &mut self,
        p1: DVec3,
        p2: DVec3,
        diameter: f64,
        theta_div: u32,
        cap_ends: bool,
    ) -> MeshResult<()> {
        ensure_positive("diameter", diameter)?;
        let (direction, length) = axis_between(p1, p2)?;
        let r = diameter / 2.0;

        let mut profile = Vec::with_capacity(4);
        if cap_ends {
            profile.push(DVec2::ZERO);
        }
        profile.push(DVec2::new(0.0, r));
        profile.push(DVec2::new(length, r));
        if cap_ends {
            profile.push(DVec2::new(length, 0.0));
        }
        self.add_revolved_geometry(&profile, p1, direction, theta_div)
    }

    /// Appends a cone or truncated cone.
    ///
    /// # Arguments
    ///
    /// * `origin` - Center of the base
    /// * `direction` - Axis direction from base to top
    /// * `base_radius` / `top_radius` - Radii, not both zero
    /// * `height` - Must be positive
    /// * `base_cap` / `top_cap` - Close the ends with discs
    /// * `theta_div` - Divisions around the axis
    #[allow(clippy::too_many_arguments)]
    pub fn add_cone(
        &mut self,
        origin: DVec3,
        direction: DVec3,
        base_radius: f64,
        top_radius: f64,
        height: f64,
        base_cap: bool,
        top_cap: bool,
        theta_div: u32,
    ) -> MeshResult<()> {
        ensure_non_negative("base_radius", base_radius)?;
        ensure_non_negative("top_radius", top_radius)?;
        ensure_positive("height", height)?;
        if approx_zero(base_radius + top_radius) {
            return Err(MeshError::invalid_parameter(
                "base_radius",
                "base and top radius cannot both be zero",
            ));
        }

        let mut profile = Vec::with_capacity(4);
        if base_cap {
            profile.push(DVec2::ZERO);
        }
        profile.push(DVec2::new(0.0, base_radius));
        profile.push(DVec2::new(height, top_radius));
        if top_cap {
            profile.push(DVec2::new(height, 0.0));
        }
        self.add_revolved_geometry(&profile, origin, direction, theta_div)
    }

    /// Appends an arrow from `p1` to `p2`.
    ///
    /// The shaft has the given diameter; the head is twice as wide and
    /// `head_length` diameters long.
    pub fn add_arrow(
        &mut self,
        p1: DVec3,
        p2: DVec3,
        diameter: f64,
        head_length: f64,
        theta_div: u32,
    ) -> MeshResult<()> {
        ensure_positive("diameter", diameter)?;
        ensure_positive("head_length", head_length)?;
        let (direction, length) = axis_between(p1, p2)?;
        let head = diameter * head_length;
        if head > length {
            return Err(MeshError::invalid_parameter(
                "head_length",
                format!("head ({head}) is longer than the arrow ({length})"),
            ));
        }

        let r = diameter / 2.0;
        let profile = [
            DVec2::ZERO,
            DVec2::new(0.0, r),
            DVec2::new(length - head, r),
            DVec2::new(length - head, 2.0 * r),
            DVec2::new(length, 0.0),
        ];
        self.add_revolved_geometry(&profile, p1, direction, theta_div)
    }

    /// Appends a pipe (a cylinder with a coaxial hole) between two points.
    ///
    /// An `inner_diameter` of zero gives a solid capped cylinder.
    pub fn add_pipe(
        &mut self,
        p1: DVec3,
        p2: DVec3,
        inner_diameter: f64,
        outer_diameter: f64,
        theta_div: u32,
    ) -> MeshResult<()> {
        ensure_non_negative("inner_diameter", inner_diameter)?;
        ensure_positive("outer_diameter", outer_diameter)?;
        if inner_diameter >= outer_diameter {
            return Err(MeshError::invalid_parameter(
                "inner_diameter",
                format!("must be smaller than outer diameter {outer_diameter}, got {inner_diameter}"),
            ));
        }
        let (direction, length) = axis_between(p1, p2)?;
        let (ri, ro) = (inner_diameter / 2.0, outer_diameter / 2.0);

        let profile = [
            DVec2::new(0.0, ri),
            DVec2::new(0.0, ro),
            DVec2::new(length, ro),
            DVec2::new(length, ri),
            DVec2::new(0.0, ri),
        ];
        // A zero inner radius would add a degenerate inner ring.
        let profile = if ri > 0.0 { &profile[..] } else { &profile[..4] };
        self.add_revolved_geometry(profile, p1, direction, theta_div)
    }
}

/// Unit direction and distance from `p1` to `p2`.
fn axis_between(p1: DVec3, p2: DVec3) -> MeshResult<(DVec3, f64)> {
    let d = p2 - p1;
    let length = d.length();
    if length < EPSILON {
        return Err(MeshError::invalid_parameter(
            "p2",
            "end points must be distinct",
        ));
    }
    Ok((d / length, length))
}
