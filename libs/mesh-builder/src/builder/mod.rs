//! # Mesh Builder
//!
//! Appends triangulated geometry into flat, parallel buffers and freezes
//! them into a [`MeshGeometry3D`].
//!
//! ## Buffer Invariants
//!
//! After every public call:
//! - `triangle_indices.len() % 3 == 0`
//! - every index is `< positions.len()`
//! - every present attribute buffer has one entry per position
//!
//! Operations validate their parameters before touching any buffer, so a
//! failed call leaves the builder unchanged.
//!
//! ## Winding
//!
//! Triangles are counter-clockwise when seen from outside. Grid-based
//! surfaces (sphere, tube, revolve, loft) are stitched by
//! [`MeshBuilder::add_rectangular_mesh_triangle_indices`], whose front side
//! is `row_direction × column_direction`.
//!
//! ## Example
//!
//! ```rust
//! use mesh_builder::MeshBuilder;
//! use glam::DVec3;
//!
//! let mut builder = MeshBuilder::new(true, true);
//! builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
//! builder.add_sphere(DVec3::new(2.0, 0.0, 0.0), 0.5, 16, 8).unwrap();
//!
//! let mesh = builder.to_mesh(false).unwrap();
//! assert_eq!(mesh.normals().unwrap().len(), mesh.vertex_count());
//! ```

mod chamfer;
mod cube;
mod revolve;
mod sphere;
mod tube;


pub use cube::BoxFaces;

use crate::buffers::{self, triangles};
use crate::error::{MeshError, MeshResult};
use crate::helper::{calculate_normals, calculate_tangents, normalize_in_place, weld_map};
use crate::mesh::MeshGeometry3D;
use config::constants::{GlobalConfig, EPSILON, MAX_TRIANGLES, MAX_VERTICES};
use glam::{DVec2, DVec3};
use sphere::UnitSphere;
use std::collections::HashMap;
use tracing::debug;

/// Procedural mesh builder over flat buffers.
///
/// Normals and texture coordinates are generated by the primitives only
/// when requested at construction. Tangents are produced on demand by
/// [`MeshBuilder::compute_tangents`].
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    positions: Vec<DVec3>,
    triangle_indices: Vec<u32>,
    normals: Option<Vec<DVec3>>,
    texture_coordinates: Option<Vec<DVec2>>,
    tangents: Option<Vec<DVec3>>,
    bitangents: Option<Vec<DVec3>>,
    config: GlobalConfig,
    /// Unit-sphere tessellation reused by `add_sphere` / `add_ellipsoid`.
    unit_sphere: Option<UnitSphere>,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl MeshBuilder {
    /// Creates an empty builder.
    ///
    /// # Arguments
    ///
    /// * `generate_normals` - Keep a per-vertex normal buffer
    /// * `generate_texture_coordinates` - Keep a per-vertex UV buffer
    pub fn new(generate_normals: bool, generate_texture_coordinates: bool) -> Self {
        Self::with_config(
            GlobalConfig::default(),
            generate_normals,
            generate_texture_coordinates,
        )
    }

    /// Creates an empty builder with explicit tolerance and default divisions.
    pub fn with_config(
        config: GlobalConfig,
        generate_normals: bool,
        generate_texture_coordinates: bool,
    ) -> Self {
        Self {
            positions: Vec::new(),
            triangle_indices: Vec::new(),
            normals: generate_normals.then(Vec::new),
            texture_coordinates: generate_texture_coordinates.then(Vec::new),
            tangents: None,
            bitangents: None,
            config,
            unit_sphere: None,
        }
    }

    /// Builder configuration.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Flat triangle indices.
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    /// Per-vertex normals, if generated.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Per-vertex texture coordinates, if generated.
    pub fn texture_coordinates(&self) -> Option<&[DVec2]> {
        self.texture_coordinates.as_deref()
    }

    /// Per-vertex tangents, if computed.
    pub fn tangents(&self) -> Option<&[DVec3]> {
        self.tangents.as_deref()
    }

    /// Per-vertex bitangents, if computed.
    pub fn bitangents(&self) -> Option<&[DVec3]> {
        self.bitangents.as_deref()
    }

    /// Returns true if the builder keeps a normal buffer.
    #[inline]
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Returns true if the builder keeps a texture coordinate buffer.
    #[inline]
    pub fn has_texture_coordinates(&self) -> bool {
        self.texture_coordinates.is_some()
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    /// Returns true if no triangle has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangle_indices.is_empty()
    }

    // =========================================================================
    // LOW-LEVEL APPENDS
    // =========================================================================

    /// Appends one vertex and returns its index.
    ///
    /// `normal` and `texture` are stored only when the builder keeps the
    /// matching buffer. Tangent buffers, if any, are dropped since they no
    /// longer cover every vertex.
    pub fn add_node(&mut self, position: DVec3, normal: DVec3, texture: DVec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        if let Some(normals) = self.normals.as_mut() {
            normals.push(normal);
        }
        if let Some(uvs) = self.texture_coordinates.as_mut() {
            uvs.push(texture);
        }
        self.tangents = None;
        self.bitangents = None;
        index
    }

    /// Appends a triangle with its own three vertices and a flat normal.
    pub fn add_triangle(&mut self, p0: DVec3, p1: DVec3, p2: DVec3) {
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        let i0 = self.add_node(p0, normal, DVec2::ZERO);
        let i1 = self.add_node(p1, normal, DVec2::X);
        let i2 = self.add_node(p2, normal, DVec2::Y);
        self.triangle_indices.extend([i0, i1, i2]);
    }

    /// Appends a quad `p0 p1 p2 p3` (counter-clockwise) as two triangles.
    pub fn add_quad(&mut self, p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3) {
        let normal = (p1 - p0).cross(p3 - p0).normalize_or_zero();
        let i0 = self.add_node(p0, normal, DVec2::ZERO);
        let i1 = self.add_node(p1, normal, DVec2::X);
        let i2 = self.add_node(p2, normal, DVec2::ONE);
        let i3 = self.add_node(p3, normal, DVec2::Y);
        self.triangle_indices.extend([i0, i1, i2, i2, i3, i0]);
    }

    /// Appends a triangle over existing vertices.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if any index is not a current vertex. Nothing is
    /// appended in that case.
    pub fn add_triangle_indices(&mut self, i0: u32, i1: u32, i2: u32) -> MeshResult<()> {
        let count = self.positions.len();
        if let Some(&bad) = [i0, i1, i2].iter().find(|&&i| i as usize >= count) {
            return Err(MeshError::index_out_of_range(bad as usize, count));
        }
        self.triangle_indices.extend([i0, i1, i2]);
        Ok(())
    }

    /// Appends a convex planar polygon as a triangle fan around its first
    /// point.
    ///
    /// Texture coordinates are the polygon's planar projection scaled to the
    /// unit square.
    pub fn add_polygon(&mut self, points: &[DVec3]) -> MeshResult<()> {
        if points.len() < 3 {
            return Err(MeshError::invalid_parameter(
                "points",
                format!("polygon needs at least 3 points, got {}", points.len()),
            ));
        }

        // Newell's method tolerates slightly non-planar input.
        let mut normal = DVec3::ZERO;
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            normal += DVec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        let normal = normal.normalize_or_zero();
        let uvs = planar_texture_coordinates(points, normal);

        let index0 = self.positions.len() as u32;
        for (p, uv) in points.iter().zip(uvs) {
            self.add_node(*p, normal, uv);
        }
        for i in 1..points.len() as u32 - 1 {
            self.triangle_indices.extend([index0, index0 + i, index0 + i + 1]);
        }
        Ok(())
    }

    /// Appends a triangle fan: `positions[0]` is the hub.
    ///
    /// Missing normals default to the fan's first face normal, missing
    /// texture coordinates to zero.
    pub fn add_triangle_fan(
        &mut self,
        positions: &[DVec3],
        normals: Option<&[DVec3]>,
        texture_coordinates: Option<&[DVec2]>,
    ) -> MeshResult<()> {
        let index0 = self.add_vertex_run(positions, normals, texture_coordinates)?;
        for i in 1..positions.len() as u32 - 1 {
            self.triangle_indices.extend([index0, index0 + i, index0 + i + 1]);
        }
        Ok(())
    }

    /// Appends a triangle strip. Every other triangle is flipped so that the
    /// whole strip keeps the winding of its first triangle.
    pub fn add_triangle_strip(
        &mut self,
        positions: &[DVec3],
        normals: Option<&[DVec3]>,
        texture_coordinates: Option<&[DVec2]>,
    ) -> MeshResult<()> {
        let index0 = self.add_vertex_run(positions, normals, texture_coordinates)?;
        for i in 0..positions.len() as u32 - 2 {
            let (a, b, c) = (index0 + i, index0 + i + 1, index0 + i + 2);
            if i % 2 == 0 {
                self.triangle_indices.extend([a, b, c]);
            } else {
                self.triangle_indices.extend([b, a, c]);
            }
        }
        Ok(())
    }

    /// Validates and appends the vertices of a fan or strip.
    fn add_vertex_run(
        &mut self,
        positions: &[DVec3],
        normals: Option<&[DVec3]>,
        texture_coordinates: Option<&[DVec2]>,
    ) -> MeshResult<u32> {
        if positions.len() < 3 {
            return Err(MeshError::invalid_parameter(
                "positions",
                format!("at least 3 positions required, got {}", positions.len()),
            ));
        }
        buffers::validate_parallel("normals", normals, positions.len())?;
        buffers::validate_parallel("texture_coordinates", texture_coordinates, positions.len())?;

        let face_normal = (positions[1] - positions[0])
            .cross(positions[2] - positions[0])
            .normalize_or_zero();
        let index0 = self.positions.len() as u32;
        for (i, p) in positions.iter().enumerate() {
            let n = normals.map_or(face_normal, |n| n[i]);
            let uv = texture_coordinates.map_or(DVec2::ZERO, |t| t[i]);
            self.add_node(*p, n, uv);
        }
        Ok(index0)
    }

    /// Appends a `rows × columns` grid of points given row by row.
    ///
    /// Normals are the smooth normals of the grid itself; texture
    /// coordinates run from 0 to 1 across columns (u) and rows (v).
    pub fn add_rectangular_mesh(&mut self, points: &[DVec3], columns: usize) -> MeshResult<()> {
        if columns < 2 || points.len() % columns != 0 || points.len() / columns < 2 {
            return Err(MeshError::invalid_parameter(
                "points",
                format!(
                    "{} points do not form a grid with {columns} columns and at least 2 rows",
                    points.len()
                ),
            ));
        }
        let rows = points.len() / columns;
        let index0 = self.positions.len() as u32;

        let mut local_indices = Vec::with_capacity((rows - 1) * (columns - 1) * 6);
        push_grid_indices(&mut local_indices, 0, rows, columns, false);
        let normals = calculate_normals(points, &local_indices)?;

        for (k, p) in points.iter().enumerate() {
            let (i, j) = (k / columns, k % columns);
            let uv = DVec2::new(
                j as f64 / (columns - 1) as f64,
                i as f64 / (rows - 1) as f64,
            );
            self.add_node(*p, normals[k], uv);
        }
        push_grid_indices(&mut self.triangle_indices, index0, rows, columns, false);
        Ok(())
    }

    /// Stitches an existing `rows × columns` vertex grid starting at
    /// `index0` into triangles.
    ///
    /// Vertex `(i, j)` is `index0 + i * columns + j`. Each grid cell becomes
    /// two triangles. With `is_columns_closed` the last column is also
    /// joined to the first.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for fewer than 2 rows or columns; `IndexOutOfRange`
    /// if the grid extends past the current vertices.
    pub fn add_rectangular_mesh_triangle_indices(
        &mut self,
        index0: u32,
        rows: usize,
        columns: usize,
        is_columns_closed: bool,
    ) -> MeshResult<()> {
        if rows < 2 || columns < 2 {
            return Err(MeshError::invalid_parameter(
                "rows",
                format!("grid needs at least 2x2 vertices, got {rows}x{columns}"),
            ));
        }
        let end = index0 as usize + rows * columns;
        if end > self.positions.len() {
            return Err(MeshError::index_out_of_range(end - 1, self.positions.len()));
        }
        push_grid_indices(&mut self.triangle_indices, index0, rows, columns, is_columns_closed);
        Ok(())
    }

    // =========================================================================
    // COMBINATION AND TRANSFORMS
    // =========================================================================

    /// Appends the contents of another builder, offsetting its indices.
    pub fn append(&mut self, other: &MeshBuilder) -> MeshResult<()> {
        self.append_buffers(
            &other.positions,
            &other.triangle_indices,
            other.normals.as_deref(),
            other.texture_coordinates.as_deref(),
        )
    }

    /// Appends a finished mesh, offsetting its indices.
    pub fn append_mesh(&mut self, mesh: &MeshGeometry3D) -> MeshResult<()> {
        self.append_buffers(
            mesh.positions(),
            mesh.triangle_indices(),
            mesh.normals(),
            mesh.texture_coordinates(),
        )
    }

    /// Appends raw buffers.
    ///
    /// Every attribute buffer this builder keeps must be supplied; extra
    /// attribute buffers are ignored.
    pub fn append_buffers(
        &mut self,
        positions: &[DVec3],
        triangle_indices: &[u32],
        normals: Option<&[DVec3]>,
        texture_coordinates: Option<&[DVec2]>,
    ) -> MeshResult<()> {
        buffers::validate_indices(triangle_indices, positions.len())?;
        buffers::validate_parallel("normals", normals, positions.len())?;
        buffers::validate_parallel("texture_coordinates", texture_coordinates, positions.len())?;
        if self.normals.is_some() && normals.is_none() {
            return Err(MeshError::IncompatibleBuffers(
                "appended geometry has no normals".into(),
            ));
        }
        if self.texture_coordinates.is_some() && texture_coordinates.is_none() {
            return Err(MeshError::IncompatibleBuffers(
                "appended geometry has no texture coordinates".into(),
            ));
        }

        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(positions);
        if let (Some(dst), Some(src)) = (self.normals.as_mut(), normals) {
            dst.extend_from_slice(src);
        }
        if let (Some(dst), Some(src)) = (self.texture_coordinates.as_mut(), texture_coordinates) {
            dst.extend_from_slice(src);
        }
        self.triangle_indices
            .extend(triangle_indices.iter().map(|i| i + offset));
        self.tangents = None;
        self.bitangents = None;
        Ok(())
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: DVec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Scales every vertex about the origin.
    ///
    /// Normals are transformed by the inverse scale and renormalized, so they
    /// stay perpendicular to the surface under non-uniform scaling. A negative
    /// determinant flips the triangle winding to keep faces outward.
    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) -> MeshResult<()> {
        for (name, s) in [("sx", sx), ("sy", sy), ("sz", sz)] {
            if s.abs() < EPSILON || !s.is_finite() {
                return Err(MeshError::invalid_parameter(
                    name,
                    format!("scale factor must be finite and non-zero, got {s}"),
                ));
            }
        }
        let factor = DVec3::new(sx, sy, sz);
        for p in &mut self.positions {
            *p *= factor;
        }
        if let Some(normals) = self.normals.as_mut() {
            for n in normals.iter_mut() {
                *n /= factor;
            }
            normalize_in_place(normals);
        }
        for buffer in [self.tangents.as_mut(), self.bitangents.as_mut()].into_iter().flatten() {
            for t in buffer.iter_mut() {
                *t *= factor;
            }
            normalize_in_place(buffer);
        }
        if sx * sy * sz < 0.0 {
            for tri in self.triangle_indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
        Ok(())
    }

    /// Splits every triangle into four through its edge midpoints.
    ///
    /// Midpoints are shared between the two triangles of an edge; attributes
    /// are interpolated.
    pub fn subdivide_linear(&mut self) {
        let old_indices = std::mem::take(&mut self.triangle_indices);
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut indices = Vec::with_capacity(old_indices.len() * 4);

        for [a, b, c] in triangles(&old_indices) {
            let ab = self.midpoint(&mut midpoints, a, b);
            let bc = self.midpoint(&mut midpoints, b, c);
            let ca = self.midpoint(&mut midpoints, c, a);
            indices.extend([a, ab, ca, ab, b, bc, ca, bc, c, ab, bc, ca]);
        }

        self.triangle_indices = indices;
    }

    fn midpoint(&mut self, cache: &mut HashMap<(u32, u32), u32>, a: u32, b: u32) -> u32 {
        let key = (a.min(b), a.max(b));
        if let Some(&m) = cache.get(&key) {
            return m;
        }
        let (ia, ib) = (a as usize, b as usize);
        let index = self.positions.len() as u32;
        self.positions.push(self.positions[ia].lerp(self.positions[ib], 0.5));
        if let Some(normals) = self.normals.as_mut() {
            normals.push(normals[ia].lerp(normals[ib], 0.5).normalize_or_zero());
        }
        if let Some(uvs) = self.texture_coordinates.as_mut() {
            uvs.push(uvs[ia].lerp(uvs[ib], 0.5));
        }
        for buffer in [self.tangents.as_mut(), self.bitangents.as_mut()].into_iter().flatten() {
            buffer.push(buffer[ia].lerp(buffer[ib], 0.5).normalize_or_zero());
        }
        cache.insert(key, index);
        index
    }

    /// Checks the buffers against the global vertex and triangle limits.
    pub fn check_limits(&self) -> MeshResult<()> {
        if self.vertex_count() > MAX_VERTICES {
            return Err(MeshError::TooManyVertices {
                count: self.vertex_count(),
                max: MAX_VERTICES,
            });
        }
        if self.triangle_count() > MAX_TRIANGLES {
            return Err(MeshError::TooManyTriangles {
                count: self.triangle_count(),
                max: MAX_TRIANGLES,
            });
        }
        Ok(())
    }

    // =========================================================================
    // VERTEX SHARING
    // =========================================================================

    /// Merges vertices whose positions lie within `tolerance`.
    ///
    /// The first vertex of each merged group keeps its attributes. Triangles
    /// left with a repeated vertex, such as the pole caps of a sphere, are
    /// removed.
    pub fn weld_vertices(&mut self, tolerance: f64) {
        let before = self.positions.len();
        let map = weld_map(&self.positions, tolerance);

        self.positions = map.gather(&self.positions);
        for buffer in [
            self.normals.as_mut(),
            self.tangents.as_mut(),
            self.bitangents.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            *buffer = map.gather(buffer.as_slice());
        }
        if let Some(uvs) = self.texture_coordinates.as_mut() {
            *uvs = map.gather(uvs.as_slice());
        }
        let collapsed = map.apply_and_compact(&mut self.triangle_indices);

        debug!(
            before,
            after = self.positions.len(),
            collapsed,
            tolerance,
            "Welded coincident vertices"
        );
    }

    /// Merges vertices within the configured tolerance.
    pub fn weld(&mut self) {
        self.weld_vertices(self.config.tolerance);
    }

    /// Gives every triangle its own three vertices.
    pub fn no_shared_vertices(&mut self) {
        let indices = std::mem::take(&mut self.triangle_indices);
        let gather = |i: &u32| *i as usize;

        self.positions = indices.iter().map(|i| self.positions[gather(i)]).collect();
        for buffer in [
            self.normals.as_mut(),
            self.tangents.as_mut(),
            self.bitangents.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            *buffer = indices.iter().map(|i| buffer[gather(i)]).collect();
        }
        if let Some(uvs) = self.texture_coordinates.as_mut() {
            *uvs = indices.iter().map(|i| uvs[gather(i)]).collect();
        }
        self.triangle_indices = (0..indices.len() as u32).collect();
    }

    // =========================================================================
    // FINALIZATION
    // =========================================================================

    /// Computes tangents and bitangents from normals and texture coordinates.
    ///
    /// Missing normals are computed from the geometry first.
    ///
    /// # Errors
    ///
    /// `IncompatibleBuffers` if the builder has no texture coordinates.
    pub fn compute_tangents(&mut self) -> MeshResult<()> {
        let uvs = self.texture_coordinates.as_deref().ok_or_else(|| {
            MeshError::IncompatibleBuffers("tangents require texture coordinates".into())
        })?;
        let computed;
        let normals = match self.normals.as_deref() {
            Some(normals) => normals,
            None => {
                computed = calculate_normals(&self.positions, &self.triangle_indices)?;
                &computed
            }
        };
        let (tangents, bitangents) =
            calculate_tangents(&self.positions, normals, uvs, &self.triangle_indices)?;
        self.tangents = Some(tangents);
        self.bitangents = Some(bitangents);
        Ok(())
    }

    /// Freezes the buffers into an immutable mesh.
    ///
    /// When `generate_normals` is set and the builder keeps no normals,
    /// per-vertex normals are computed from the area-weighted face normals of
    /// the incident triangles.
    pub fn to_mesh(&self, generate_normals: bool) -> MeshResult<MeshGeometry3D> {
        let mut mesh = MeshGeometry3D::new(self.positions.clone(), self.triangle_indices.clone())?;

        match &self.normals {
            Some(normals) => mesh = mesh.with_normals(normals.clone())?,
            None if generate_normals => {
                mesh = mesh.with_normals(calculate_normals(&self.positions, &self.triangle_indices)?)?
            }
            None => {}
        }
        if let Some(uvs) = &self.texture_coordinates {
            mesh = mesh.with_texture_coordinates(uvs.clone())?;
        }
        if let (Some(t), Some(b)) = (&self.tangents, &self.bitangents) {
            mesh = mesh.with_tangents(t.clone(), b.clone())?;
        }

        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            normals = mesh.normals().is_some(),
            texture_coordinates = mesh.texture_coordinates().is_some(),
            "Finalized mesh"
        );
        Ok(mesh)
    }
}

/// Pushes the triangles of a `rows × columns` vertex grid.
pub(crate) fn push_grid_indices(
    indices: &mut Vec<u32>,
    index0: u32,
    rows: usize,
    columns: usize,
    is_columns_closed: bool,
) {
    let cols = columns as u32;
    let cells = if is_columns_closed { cols } else { cols - 1 };
    for i in 0..rows as u32 - 1 {
        let row = index0 + i * cols;
        for j in 0..cells {
            let a = row + j;
            let b = row + (j + 1) % cols;
            let c = a + cols;
            let d = b + cols;
            indices.extend([a, c, d, d, b, a]);
        }
    }
}

/// Projects points onto their plane and maps them into the unit square.
fn planar_texture_coordinates(points: &[DVec3], normal: DVec3) -> Vec<DVec2> {
    let u_axis = (points[1] - points[0]).normalize_or_zero();
    let v_axis = normal.cross(u_axis);
    let projected: Vec<DVec2> = points
        .iter()
        .map(|p| {
            let d = *p - points[0];
            DVec2::new(d.dot(u_axis), d.dot(v_axis))
        })
        .collect();

    let (min, max) = projected.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    );
    let extent = (max - min).max(DVec2::splat(EPSILON));
    projected.iter().map(|p| (*p - min) / extent).collect()
}
