//! # Edge Queries
//!
//! Edge extraction over flat index buffers. Edges are identified by vertex
//! index, so two triangles only share an edge when they share both vertices.

use crate::bounds::Bounds;
use crate::buffers::{self, triangles};
use crate::error::{MeshError, MeshResult};
use glam::DVec3;
use std::collections::HashMap;

/// Undirected edge key.
#[inline]
fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Directed edges of every triangle, grouped by undirected edge in first-seen
/// order. Each entry holds the edge as first seen and the faces using it.
fn edge_table(indices: &[u32]) -> Vec<([u32; 2], Vec<usize>)> {
    let mut lookup: HashMap<(u32, u32), usize> = HashMap::new();
    let mut table: Vec<([u32; 2], Vec<usize>)> = Vec::new();

    for (face, [i0, i1, i2]) in triangles(indices).enumerate() {
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let slot = *lookup.entry(edge_key(a, b)).or_insert_with(|| {
                table.push(([a, b], Vec::with_capacity(2)));
                table.len() - 1
            });
            table[slot].1.push(face);
        }
    }

    table
}

/// Returns the axis-aligned bounds of a position buffer.
pub fn bounds(positions: &[DVec3]) -> Option<Bounds> {
    Bounds::from_points(positions)
}

/// Returns every distinct undirected edge, in first-seen order.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::find_edges;
///
/// // Two triangles sharing the diagonal 0-2.
/// let edges = find_edges(&[0, 1, 2, 0, 2, 3]);
/// assert_eq!(edges.len(), 5);
/// ```
pub fn find_edges(indices: &[u32]) -> Vec<[u32; 2]> {
    edge_table(indices).into_iter().map(|(edge, _)| edge).collect()
}

/// Returns the edges used by exactly one triangle, oriented as in that
/// triangle.
///
/// A closed manifold mesh with shared vertices has no border edges.
pub fn find_border_edges(indices: &[u32]) -> Vec<[u32; 2]> {
    edge_table(indices)
        .into_iter()
        .filter(|(_, faces)| faces.len() == 1)
        .map(|(edge, _)| edge)
        .collect()
}

/// Returns the edges shared by two triangles whose face normals differ by
/// more than `min_angle_degrees`.
///
/// Edges used by one triangle or by more than two are not reported, nor are
/// edges next to a degenerate triangle. Fails on an index past the end of
/// `positions` or a partial triangle.
pub fn find_sharp_edges(
    positions: &[DVec3],
    indices: &[u32],
    min_angle_degrees: f64,
) -> MeshResult<Vec<[u32; 2]>> {
    buffers::validate_indices(indices, positions.len())?;
    let face_normals: Vec<DVec3> = triangles(indices)
        .map(|[i0, i1, i2]| {
            let v0 = positions[i0 as usize];
            (positions[i1 as usize] - v0)
                .cross(positions[i2 as usize] - v0)
                .normalize_or_zero()
        })
        .collect();
    let cos_limit = min_angle_degrees.to_radians().cos();

    Ok(edge_table(indices)
        .into_iter()
        .filter_map(|(edge, faces)| match faces.as_slice() {
            &[f0, f1] => {
                let (n0, n1) = (face_normals[f0], face_normals[f1]);
                let degenerate = n0 == DVec3::ZERO || n1 == DVec3::ZERO;
                (!degenerate && n0.dot(n1) < cos_limit).then_some(edge)
            }
            _ => None,
        })
        .collect())
}

/// Checks that a position/index pair forms a well-formed mesh: complete
/// triangles, every index in range and every position finite.
pub fn validate(positions: &[DVec3], indices: &[u32]) -> MeshResult<()> {
    buffers::validate_indices(indices, positions.len())?;
    if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
        return Err(MeshError::invalid_parameter(
            "positions",
            format!("position {i} is not finite"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square in XY split along 0-2, plus a flap folded up along 2-3.
    fn folded() -> (Vec<DVec3>, Vec<u32>) {
        let positions = vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::Y,
            DVec3::new(0.5, 1.0, 1.0),
        ];
        (positions, vec![0, 1, 2, 0, 2, 3, 3, 2, 4])
    }

    #[test]
    fn test_find_edges_is_unique() {
        let (_, indices) = folded();
        let edges = find_edges(&indices);
        assert_eq!(edges.len(), 7);
        assert_eq!(edges[0], [0, 1]);
    }

    #[test]
    fn test_border_edges_keep_triangle_orientation() {
        let (_, indices) = folded();
        let border = find_border_edges(&indices);
        assert_eq!(border, vec![[0, 1], [1, 2], [3, 0], [2, 4], [4, 3]]);
    }

    #[test]
    fn test_sharp_edges() {
        let (positions, indices) = folded();
        assert_eq!(find_sharp_edges(&positions, &indices, 30.0).unwrap(), vec![[2, 3]]);
        assert!(find_sharp_edges(&positions, &indices, 120.0).unwrap().is_empty());
    }

    #[test]
    fn test_sharp_edges_rejects_bad_indices() {
        let (positions, _) = folded();
        assert_eq!(
            find_sharp_edges(&positions, &[0, 1, 2, 2, 1, 9], 30.0).unwrap_err(),
            MeshError::IndexOutOfRange { index: 9, count: 5 }
        );
    }

    #[test]
    fn test_validate() {
        let (mut positions, indices) = folded();
        assert!(validate(&positions, &indices).is_ok());
        assert!(matches!(
            validate(&positions[..3], &indices),
            Err(MeshError::IndexOutOfRange { .. })
        ));
        positions[4].z = f64::NAN;
        assert!(matches!(
            validate(&positions, &indices),
            Err(MeshError::InvalidParameter { name: "positions", .. })
        ));
    }
}
