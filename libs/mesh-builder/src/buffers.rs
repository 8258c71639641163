//! # Buffers
//!
//! Flat, growable arrays that back every mesh: 3D vectors for positions,
//! normals and tangents, 2D vectors for texture coordinates and `u32`
//! triangle indices consumed three at a time.
//!
//! All geometry calculations use f64 internally. Export to f32 only happens
//! at the display boundary (see the `*_f32` helpers).

use crate::error::{MeshError, MeshResult};
use glam::{DVec2, DVec3};

/// Ordered buffer of 3D points or vectors.
pub type Vector3Buffer = Vec<DVec3>;

/// Ordered buffer of 2D texture coordinates.
pub type Vector2Buffer = Vec<DVec2>;

/// Triangle index buffer (3 indices per triangle).
pub type IndexBuffer = Vec<u32>;

/// Iterates an index buffer as `[i0, i1, i2]` triangles.
///
/// A trailing incomplete triangle is ignored; use [`validate_indices`] to
/// reject such buffers.
///
/// # Example
///
/// ```rust
/// use mesh_builder::buffers::triangles;
///
/// let indices = [0, 1, 2, 2, 1, 3];
/// let tris: Vec<[u32; 3]> = triangles(&indices).collect();
/// assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
/// ```
#[inline]
pub fn triangles(indices: &[u32]) -> impl Iterator<Item = [u32; 3]> + '_ {
    indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}

/// Checks the index-buffer invariants against a vertex count.
///
/// Every index must address an existing vertex and the length must be a
/// multiple of three.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> MeshResult<()> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IncompleteTriangle(indices.len()));
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(MeshError::index_out_of_range(index as usize, vertex_count)),
        None => Ok(()),
    }
}

/// Checks that an optional per-vertex buffer has one entry per position.
pub fn validate_parallel<T>(
    buffer: &'static str,
    values: Option<&[T]>,
    vertex_count: usize,
) -> MeshResult<()> {
    match values {
        Some(values) if values.len() != vertex_count => Err(MeshError::BufferLengthMismatch {
            buffer,
            expected: vertex_count,
            actual: values.len(),
        }),
        _ => Ok(()),
    }
}

/// Flattens 3D vectors into `[x, y, z, x, y, z, ...]` for GPU upload.
pub fn flatten_vec3_f32(values: &[DVec3]) -> Vec<f32> {
    let mut result = Vec::with_capacity(values.len() * 3);
    for v in values {
        result.push(v.x as f32);
        result.push(v.y as f32);
        result.push(v.z as f32);
    }
    result
}

/// Flattens 2D vectors into `[u, v, u, v, ...]` for GPU upload.
pub fn flatten_vec2_f32(values: &[DVec2]) -> Vec<f32> {
    let mut result = Vec::with_capacity(values.len() * 2);
    for v in values {
        result.push(v.x as f32);
        result.push(v.y as f32);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangles_ignores_trailing_indices() {
        let tris: Vec<_> = triangles(&[0, 1, 2, 3]).collect();
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_validate_indices() {
        assert!(validate_indices(&[0, 1, 2], 3).is_ok());
        assert_eq!(
            validate_indices(&[0, 1, 3], 3),
            Err(MeshError::index_out_of_range(3, 3))
        );
        assert_eq!(
            validate_indices(&[0, 1], 3),
            Err(MeshError::IncompleteTriangle(2))
        );
    }

    #[test]
    fn test_validate_parallel() {
        let normals = vec![DVec3::Z; 2];
        assert!(validate_parallel("normals", Some(normals.as_slice()), 2).is_ok());
        assert!(validate_parallel::<DVec3>("normals", None, 2).is_ok());
        assert!(matches!(
            validate_parallel("normals", Some(normals.as_slice()), 3),
            Err(MeshError::BufferLengthMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_flatten() {
        assert_eq!(
            flatten_vec3_f32(&[DVec3::new(1.0, 2.0, 3.0)]),
            vec![1.0f32, 2.0, 3.0]
        );
        assert_eq!(flatten_vec2_f32(&[DVec2::new(0.5, 0.25)]), vec![0.5f32, 0.25]);
    }
}
