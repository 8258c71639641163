//! # Mesh Data Structure
//!
//! Immutable triangle mesh snapshot produced by [`MeshBuilder::to_mesh`]
//! and consumed read-only by display and export layers.
//!
//! [`MeshBuilder::to_mesh`]: crate::MeshBuilder::to_mesh

use crate::bounds::Bounds;
use crate::buffers::{self, flatten_vec2_f32, flatten_vec3_f32};
use crate::error::{MeshError, MeshResult};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// A finished triangle mesh: positions, triangle indices and optional
/// per-vertex attribute buffers.
///
/// Every attribute buffer that is present has exactly one entry per
/// position. The constructors check this, and deserialization goes through
/// the same checks, so a `MeshGeometry3D` always satisfies the buffer
/// invariants.
///
/// # Example
///
/// ```rust
/// use mesh_builder::MeshGeometry3D;
/// use glam::DVec3;
///
/// let mesh = MeshGeometry3D::new(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y],
///     vec![0, 1, 2],
/// ).unwrap();
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMesh")]
pub struct MeshGeometry3D {
    positions: Vec<DVec3>,
    triangle_indices: Vec<u32>,
    normals: Option<Vec<DVec3>>,
    texture_coordinates: Option<Vec<DVec2>>,
    tangents: Option<Vec<DVec3>>,
    bitangents: Option<Vec<DVec3>>,
}

/// Unchecked wire form of [`MeshGeometry3D`].
#[derive(Deserialize)]
struct RawMesh {
    positions: Vec<DVec3>,
    triangle_indices: Vec<u32>,
    #[serde(default)]
    normals: Option<Vec<DVec3>>,
    #[serde(default)]
    texture_coordinates: Option<Vec<DVec2>>,
    #[serde(default)]
    tangents: Option<Vec<DVec3>>,
    #[serde(default)]
    bitangents: Option<Vec<DVec3>>,
}

impl TryFrom<RawMesh> for MeshGeometry3D {
    type Error = MeshError;

    fn try_from(raw: RawMesh) -> MeshResult<Self> {
        let mut mesh = Self::new(raw.positions, raw.triangle_indices)?;
        if let Some(normals) = raw.normals {
            mesh = mesh.with_normals(normals)?;
        }
        if let Some(uvs) = raw.texture_coordinates {
            mesh = mesh.with_texture_coordinates(uvs)?;
        }
        match (raw.tangents, raw.bitangents) {
            (Some(t), Some(b)) => mesh.with_tangents(t, b),
            (None, None) => Ok(mesh),
            _ => Err(MeshError::IncompatibleBuffers(
                "tangents and bitangents must be given together".into(),
            )),
        }
    }
}

impl MeshGeometry3D {
    /// Creates a mesh from positions and indices, validating the indices.
    pub fn new(positions: Vec<DVec3>, triangle_indices: Vec<u32>) -> MeshResult<Self> {
        buffers::validate_indices(&triangle_indices, positions.len())?;
        Ok(Self {
            positions,
            triangle_indices,
            normals: None,
            texture_coordinates: None,
            tangents: None,
            bitangents: None,
        })
    }

    /// Attaches per-vertex normals.
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> MeshResult<Self> {
        buffers::validate_parallel("normals", Some(normals.as_slice()), self.positions.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    /// Attaches per-vertex texture coordinates.
    pub fn with_texture_coordinates(mut self, uvs: Vec<DVec2>) -> MeshResult<Self> {
        buffers::validate_parallel(
            "texture_coordinates",
            Some(uvs.as_slice()),
            self.positions.len(),
        )?;
        self.texture_coordinates = Some(uvs);
        Ok(self)
    }

    /// Attaches per-vertex tangents and bitangents.
    pub fn with_tangents(
        mut self,
        tangents: Vec<DVec3>,
        bitangents: Vec<DVec3>,
    ) -> MeshResult<Self> {
        let count = self.positions.len();
        buffers::validate_parallel("tangents", Some(tangents.as_slice()), count)?;
        buffers::validate_parallel("bitangents", Some(bitangents.as_slice()), count)?;
        self.tangents = Some(tangents);
        self.bitangents = Some(bitangents);
        Ok(self)
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangle_indices.is_empty()
    }

    /// Vertex positions.
    #[inline]
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Flat triangle indices.
    #[inline]
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    /// Per-vertex normals, if present.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Per-vertex texture coordinates, if present.
    pub fn texture_coordinates(&self) -> Option<&[DVec2]> {
        self.texture_coordinates.as_deref()
    }

    /// Per-vertex tangents, if present.
    pub fn tangents(&self) -> Option<&[DVec3]> {
        self.tangents.as_deref()
    }

    /// Per-vertex bitangents, if present.
    pub fn bitangents(&self) -> Option<&[DVec3]> {
        self.bitangents.as_deref()
    }

    /// Iterates the triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        buffers::triangles(&self.triangle_indices)
    }

    /// Returns the three corner positions of triangle `index`.
    pub fn triangle_positions(&self, index: usize) -> [DVec3; 3] {
        let base = index * 3;
        [
            self.positions[self.triangle_indices[base] as usize],
            self.positions[self.triangle_indices[base + 1] as usize],
            self.positions[self.triangle_indices[base + 2] as usize],
        ]
    }

    /// Computes the axis-aligned bounding box, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions)
    }

    /// Total surface area.
    pub fn area(&self) -> f64 {
        (0..self.triangle_count())
            .map(|i| {
                let [a, b, c] = self.triangle_positions(i);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum()
    }

    /// Decomposes the mesh into its raw buffers
    /// `(positions, indices, normals, texture_coordinates)`.
    pub fn into_parts(
        self,
    ) -> (
        Vec<DVec3>,
        Vec<u32>,
        Option<Vec<DVec3>>,
        Option<Vec<DVec2>>,
    ) {
        (
            self.positions,
            self.triangle_indices,
            self.normals,
            self.texture_coordinates,
        )
    }

    /// Exports positions as a flattened f32 array for GPU upload.
    pub fn positions_f32(&self) -> Vec<f32> {
        flatten_vec3_f32(&self.positions)
    }

    /// Exports triangle indices for GPU upload.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.triangle_indices.clone()
    }

    /// Exports normals as a flattened f32 array.
    pub fn normals_f32(&self) -> Option<Vec<f32>> {
        self.normals.as_deref().map(flatten_vec3_f32)
    }

    /// Exports texture coordinates as a flattened f32 array.
    pub fn texture_coordinates_f32(&self) -> Option<Vec<f32>> {
        self.texture_coordinates.as_deref().map(flatten_vec2_f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshGeometry3D {
        MeshGeometry3D::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]).unwrap()
    }

    #[test]
    fn test_mesh_new_validates_indices() {
        let err = MeshGeometry3D::new(vec![DVec3::ZERO], vec![0, 1, 2]).unwrap_err();
        assert_eq!(err, MeshError::index_out_of_range(1, 1));
    }

    #[test]
    fn test_mesh_rejects_mismatched_normals() {
        let err = triangle().with_normals(vec![DVec3::Z; 2]).unwrap_err();
        assert!(matches!(err, MeshError::BufferLengthMismatch { buffer: "normals", .. }));
    }

    #[test]
    fn test_mesh_counts_and_area() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!((mesh.area() - 0.5).abs() < 1e-12);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_mesh_bounds() {
        let bounds = triangle().bounds().unwrap();
        assert_eq!(bounds.min, DVec3::ZERO);
        assert_eq!(bounds.max, DVec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_mesh_f32_exports() {
        let mesh = triangle().with_normals(vec![DVec3::Z; 3]).unwrap();
        assert_eq!(mesh.positions_f32().len(), 9);
        assert_eq!(mesh.indices_u32(), vec![0, 1, 2]);
        assert_eq!(mesh.normals_f32().unwrap()[2], 1.0f32);
        assert!(mesh.texture_coordinates_f32().is_none());
    }

    #[test]
    fn test_mesh_json_round_trip() {
        let mesh = triangle()
            .with_normals(vec![DVec3::Z; 3])
            .unwrap()
            .with_texture_coordinates(vec![DVec2::ZERO, DVec2::X, DVec2::Y])
            .unwrap();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: MeshGeometry3D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_index() {
        let json = r#"{"positions":[[0,0,0],[1,0,0],[0,1,0]],"triangle_indices":[0,1,7]}"#;
        let err = serde_json::from_str::<MeshGeometry3D>(json).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_short_attribute_buffers() {
        let json = r#"{"positions":[[0,0,0],[1,0,0],[0,1,0]],"triangle_indices":[0,1,2],"normals":[[0,0,1]]}"#;
        let err = serde_json::from_str::<MeshGeometry3D>(json).unwrap_err();
        assert!(err.to_string().contains("'normals'"), "{err}");

        let json = r#"{"positions":[[0,0,0],[1,0,0],[0,1,0]],"triangle_indices":[0,1,2],"tangents":[[1,0,0],[1,0,0],[1,0,0]]}"#;
        assert!(serde_json::from_str::<MeshGeometry3D>(json).is_err());
    }
}
