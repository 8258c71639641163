//! # Normals and Tangents
//!
//! Per-vertex normal and tangent-frame computation over flat buffers.

use crate::buffers::{self, triangles};
use crate::error::MeshResult;
use config::constants::{EPSILON, PARALLEL_THRESHOLD};
use glam::{DVec2, DVec3};
use rayon::prelude::*;

/// Computes per-vertex normals by summing the face normals of all incident
/// triangles and normalizing the sum.
///
/// Face normals are left unnormalized before summing
/// (`cross(v1 - v0, v2 - v0)`), so larger triangles weigh more. A vertex
/// with no incident triangles, or only degenerate ones, gets a zero normal.
///
/// # Errors
///
/// Fails when `indices` holds a partial triangle or addresses a vertex past
/// the end of `positions`.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::calculate_normals;
/// use glam::DVec3;
///
/// let positions = [DVec3::ZERO, DVec3::X, DVec3::Y];
/// let normals = calculate_normals(&positions, &[0, 1, 2]).unwrap();
/// assert_eq!(normals, vec![DVec3::Z; 3]);
/// assert!(calculate_normals(&positions, &[0, 1, 5]).is_err());
/// ```
pub fn calculate_normals(positions: &[DVec3], indices: &[u32]) -> MeshResult<Vec<DVec3>> {
    buffers::validate_indices(indices, positions.len())?;
    let mut normals = vec![DVec3::ZERO; positions.len()];

    for [i0, i1, i2] in triangles(indices) {
        let v0 = positions[i0 as usize];
        let v1 = positions[i1 as usize];
        let v2 = positions[i2 as usize];
        let normal = (v1 - v0).cross(v2 - v0);

        normals[i0 as usize] += normal;
        normals[i1 as usize] += normal;
        normals[i2 as usize] += normal;
    }

    normalize_in_place(&mut normals);
    Ok(normals)
}

/// Normalizes every vector of the buffer to unit length, in place.
///
/// Vectors shorter than [`EPSILON`] are left unchanged. Large buffers are
/// processed on the rayon thread pool.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::normalize_in_place;
/// use glam::DVec3;
///
/// let mut v = vec![DVec3::new(3.0, 0.0, 4.0), DVec3::ZERO];
/// normalize_in_place(&mut v);
/// assert_eq!(v, vec![DVec3::new(0.6, 0.0, 0.8), DVec3::ZERO]);
/// ```
pub fn normalize_in_place(vectors: &mut [DVec3]) {
    if vectors.len() >= PARALLEL_THRESHOLD {
        vectors.par_iter_mut().for_each(normalize_one);
    } else {
        vectors.iter_mut().for_each(normalize_one);
    }
}

#[inline]
fn normalize_one(v: &mut DVec3) {
    let length = v.length();
    if length > EPSILON {
        *v /= length;
    }
}

/// Computes per-vertex tangents and bitangents from texture coordinates.
///
/// Accumulates the UV-space derivative of every triangle into its vertices,
/// then Gram-Schmidt orthogonalizes the tangent against the vertex normal.
/// Triangles with a degenerate UV mapping are skipped.
///
/// Returns `(tangents, bitangents)`, one entry per position. Fails when an
/// index is out of range or a normal or texture-coordinate buffer does not
/// hold one entry per position.
pub fn calculate_tangents(
    positions: &[DVec3],
    normals: &[DVec3],
    texture_coordinates: &[DVec2],
    indices: &[u32],
) -> MeshResult<(Vec<DVec3>, Vec<DVec3>)> {
    buffers::validate_indices(indices, positions.len())?;
    buffers::validate_parallel("normals", Some(normals), positions.len())?;
    buffers::validate_parallel("texture_coordinates", Some(texture_coordinates), positions.len())?;

    let mut tan1 = vec![DVec3::ZERO; positions.len()];
    let mut tan2 = vec![DVec3::ZERO; positions.len()];

    for [i0, i1, i2] in triangles(indices) {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        let e1 = positions[i1] - positions[i0];
        let e2 = positions[i2] - positions[i0];
        let d1 = texture_coordinates[i1] - texture_coordinates[i0];
        let d2 = texture_coordinates[i2] - texture_coordinates[i0];

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for i in [i0, i1, i2] {
            tan1[i] += sdir;
            tan2[i] += tdir;
        }
    }

    let mut tangents = Vec::with_capacity(positions.len());
    let mut bitangents = Vec::with_capacity(positions.len());
    for ((n, t), t2) in normals.iter().zip(&tan1).zip(&tan2) {
        let tangent = (*t - *n * n.dot(*t)).normalize_or_zero();
        let handedness = if n.cross(*t).dot(*t2) < 0.0 { -1.0 } else { 1.0 };
        tangents.push(tangent);
        bitangents.push(n.cross(tangent) * handedness);
    }

    Ok((tangents, bitangents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vectors(rng: &mut StdRng, n: usize) -> Vec<DVec3> {
        let mut result = Vec::with_capacity(n);
        while result.len() < n {
            let v = DVec3::new(
                rng.gen_range(-100.0..100.0),
                rng.gen_range(-100.0..100.0),
                rng.gen_range(-100.0..100.0),
            );
            if v.length() > 1e-3 {
                result.push(v);
            }
        }
        result
    }

    #[test]
    fn normalize_in_place_yields_unit_vectors_in_original_direction() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for n in [1, 3, 7, 11, 101, 1001, 10003, 101233] {
            let original = random_vectors(&mut rng, n);
            let mut normalized = original.clone();
            normalize_in_place(&mut normalized);

            assert_eq!(normalized.len(), n);
            for (o, r) in original.iter().zip(&normalized) {
                assert_abs_diff_eq!(r.length(), 1.0, epsilon = 4e-4);
                let expected = o.normalize();
                assert!((expected - *r).length() < 4e-4, "n={n}: {o} -> {r}");
            }
        }
    }

    #[test]
    fn normalize_in_place_leaves_zero_vectors() {
        let mut v = vec![DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)];
        normalize_in_place(&mut v);
        assert_eq!(v, vec![DVec3::ZERO, DVec3::Y]);
    }

    #[test]
    fn calculate_normals_sums_area_weighted_faces() {
        // Two triangles sharing vertices 0 and 1: a large one in XY and a small one in XZ.
        let positions = [
            DVec3::ZERO,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        ];
        let indices = [0, 1, 2, 0, 3, 1];
        let normals = calculate_normals(&positions, &indices).unwrap();

        // Face normals: (0,0,4) and (0,2,0); shared vertices get their normalized sum.
        let expected = DVec3::new(0.0, 2.0, 4.0).normalize();
        assert!((normals[0] - expected).length() < 1e-12);
        assert!((normals[1] - expected).length() < 1e-12);
        assert!((normals[2] - DVec3::Z).length() < 1e-12);
        assert!((normals[3] - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn calculate_normals_isolated_vertex_is_zero() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::splat(5.0)];
        let normals = calculate_normals(&positions, &[0, 1, 2]).unwrap();
        assert_eq!(normals[3], DVec3::ZERO);
    }

    #[test]
    fn calculate_tangents_follow_u_direction() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::Y];
        let normals = [DVec3::Z; 3];
        let uvs = [DVec2::ZERO, DVec2::X, DVec2::Y];
        let (tangents, bitangents) = calculate_tangents(&positions, &normals, &uvs, &[0, 1, 2]).unwrap();
        for (t, b) in tangents.iter().zip(&bitangents) {
            assert!((*t - DVec3::X).length() < 1e-12);
            assert!((*b - DVec3::Y).length() < 1e-12);
        }
    }

    #[test]
    fn calculate_normals_rejects_bad_indices() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::Y];
        assert_eq!(
            calculate_normals(&positions, &[0, 1, 5]).unwrap_err(),
            MeshError::IndexOutOfRange { index: 5, count: 3 }
        );
        assert_eq!(
            calculate_normals(&positions, &[0, 1]).unwrap_err(),
            MeshError::IncompleteTriangle(2)
        );
    }

    #[test]
    fn calculate_tangents_rejects_short_buffers() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::Y];
        let normals = [DVec3::Z; 3];
        let uvs = [DVec2::ZERO, DVec2::X];
        let err = calculate_tangents(&positions, &normals, &uvs, &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, MeshError::BufferLengthMismatch { .. }));

        let uvs = [DVec2::ZERO, DVec2::X, DVec2::Y];
        let err = calculate_tangents(&positions, &normals, &uvs, &[0, 1, 3]).unwrap_err();
        assert_eq!(err, MeshError::IndexOutOfRange { index: 3, count: 3 });
    }
}
