//! # Sphere Primitive
//!
//! Latitude/longitude spheres and ellipsoids.
//!
//! ## Tessellation
//!
//! - `phi_div` rings from the north pole (`+Z`) to the south pole, at polar
//!   angle `phi = PI * i / (phi_div - 1)`; the first and last ring collapse
//!   onto the poles
//! - `theta_div + 1` vertices per ring, the last one repeating the first
//!   direction so the texture seam can wrap
//! - `2 * theta_div * (phi_div - 1)` triangles; the pole triangles are
//!   degenerate

use super::{push_grid_indices, MeshBuilder};
use crate::error::{ensure_divisions, ensure_positive, MeshResult};
use config::constants::{MIN_PHI_DIV, MIN_THETA_DIV};
use glam::{DVec2, DVec3};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// Unit-sphere directions, texture coordinates and triangle indices for one
/// pair of division counts. Immutable once built.
#[derive(Debug)]
pub(crate) struct UnitSphereData {
    theta_div: u32,
    phi_div: u32,
    directions: Vec<DVec3>,
    texture_coordinates: Vec<DVec2>,
    indices: Vec<u32>,
}

/// Shared handle to a unit-sphere template.
pub(crate) type UnitSphere = Arc<UnitSphereData>;

impl UnitSphereData {
    fn build(theta_div: u32, phi_div: u32) -> Self {
        let columns = theta_div as usize + 1;
        let rows = phi_div as usize;
        let mut directions = Vec::with_capacity(rows * columns);
        let mut texture_coordinates = Vec::with_capacity(rows * columns);

        for i in 0..rows {
            let v = i as f64 / (rows - 1) as f64;
            let (sin_phi, cos_phi) = (PI * v).sin_cos();
            for j in 0..columns {
                let u = j as f64 / theta_div as f64;
                let (sin_theta, cos_theta) = (2.0 * PI * u).sin_cos();
                directions.push(DVec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi));
                texture_coordinates.push(DVec2::new(u, v));
            }
        }

        let mut indices = Vec::with_capacity(6 * theta_div as usize * (rows - 1));
        push_grid_indices(&mut indices, 0, rows, columns, false);

        debug!(theta_div, phi_div, vertices = directions.len(), "Built unit sphere template");
        Self {
            theta_div,
            phi_div,
            directions,
            texture_coordinates,
            indices,
        }
    }
}

impl MeshBuilder {
    /// Returns the unit-sphere template for the given divisions, building it
    /// on first use.
    pub(super) fn unit_sphere(&mut self, theta_div: u32, phi_div: u32) -> UnitSphere {
        match &self.unit_sphere {
            Some(t) if t.theta_div == theta_div && t.phi_div == phi_div => Arc::clone(t),
            _ => {
                let template = Arc::new(UnitSphereData::build(theta_div, phi_div));
                self.unit_sphere = Some(Arc::clone(&template));
                template
            }
        }
    }

    /// Appends a sphere.
    ///
    /// # Arguments
    ///
    /// * `center` - Sphere center
    /// * `radius` - Must be positive
    /// * `theta_div` - Divisions around the Z axis, at least 3
    /// * `phi_div` - Rings from pole to pole, at least 2
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::DVec3;
    ///
    /// let mut builder = MeshBuilder::new(true, true);
    /// builder.add_sphere(DVec3::ZERO, 1.0, 4, 3).unwrap();
    /// assert_eq!(builder.triangle_count(), 16);
    /// assert_eq!(builder.triangle_indices().len(), 48);
    /// ```
    pub fn add_sphere(&mut self, center: DVec3, radius: f64, theta_div: u32, phi_div: u32) -> MeshResult<()> {
        ensure_positive("radius", radius)?;
        self.add_ellipsoid(center, radius, radius, radius, theta_div, phi_div)
    }

    /// Appends a sphere using the configured default divisions.
    pub fn add_default_sphere(&mut self, center: DVec3, radius: f64) -> MeshResult<()> {
        let (theta_div, phi_div) = (self.config.default_theta_div, self.config.default_phi_div);
        self.add_sphere(center, radius, theta_div, phi_div)
    }

    /// Appends an axis-aligned ellipsoid with semi-axes `rx`, `ry`, `rz`.
    ///
    /// Normals are the exact ellipsoid normals, not the scaled sphere ones.
    pub fn add_ellipsoid(
        &mut self,
        center: DVec3,
        rx: f64,
        ry: f64,
        rz: f64,
        theta_div: u32,
        phi_div: u32,
    ) -> MeshResult<()> {
        ensure_positive("rx", rx)?;
        ensure_positive("ry", ry)?;
        ensure_positive("rz", rz)?;
        ensure_divisions("theta_div", theta_div, MIN_THETA_DIV)?;
        ensure_divisions("phi_div", phi_div, MIN_PHI_DIV)?;

        let template = self.unit_sphere(theta_div, phi_div);
        let radii = DVec3::new(rx, ry, rz);
        let index0 = self.vertex_count() as u32;

        for (d, uv) in template.directions.iter().zip(&template.texture_coordinates) {
            let normal = (*d / radii).normalize_or_zero();
            self.add_node(center + *d * radii, normal, *uv);
        }
        self.triangle_indices
            .extend(template.indices.iter().map(|i| i + index0));
        Ok(())
    }
}
