//! # Vertex Welding
//!
//! Merges vertices whose positions coincide within a tolerance. Lookup uses
//! a uniform grid with cell size equal to the tolerance, so each query only
//! inspects the 27 surrounding cells.

use config::constants::EPSILON;
use glam::DVec3;
use std::collections::HashMap;

/// Vertex remapping produced by [`weld_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldMap {
    /// New index of every original vertex.
    pub remap: Vec<u32>,
    /// Original index of every kept vertex, in output order.
    pub kept: Vec<usize>,
}

impl WeldMap {
    /// Number of vertices after welding.
    pub fn vertex_count(&self) -> usize {
        self.kept.len()
    }

    /// Gathers the kept entries of a per-vertex buffer.
    pub fn gather<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.kept.iter().map(|&i| values[i]).collect()
    }

    /// Rewrites an index buffer in place.
    pub fn apply(&self, indices: &mut [u32]) {
        for index in indices {
            *index = self.remap[*index as usize];
        }
    }

    /// Rewrites an index buffer and drops the triangles that collapsed onto
    /// a repeated vertex. Returns the number of triangles dropped.
    pub fn apply_and_compact(&self, indices: &mut Vec<u32>) -> usize {
        self.apply(indices);
        let before = indices.len() / 3;
        let kept: Vec<u32> = indices
            .chunks_exact(3)
            .filter(|t| t[0] != t[1] && t[1] != t[2] && t[2] != t[0])
            .flatten()
            .copied()
            .collect();
        *indices = kept;
        before - indices.len() / 3
    }
}

/// Computes which vertices to merge.
///
/// Vertices are visited in order; each one maps onto the earliest kept
/// vertex within `tolerance`, or is kept itself. The first occurrence therefore
/// supplies the attributes of a merged vertex.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::weld_map;
/// use glam::DVec3;
///
/// let positions = [DVec3::ZERO, DVec3::X, DVec3::new(1e-12, 0.0, 0.0)];
/// let map = weld_map(&positions, 1e-8);
/// assert_eq!(map.remap, vec![0, 1, 0]);
/// assert_eq!(map.kept, vec![0, 1]);
/// ```
pub fn weld_map(positions: &[DVec3], tolerance: f64) -> WeldMap {
    let cell_size = tolerance.max(EPSILON);
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap = Vec::with_capacity(positions.len());
    let mut kept: Vec<usize> = Vec::new();

    for (i, &p) in positions.iter().enumerate() {
        let cell = grid_cell(p, cell_size);
        let existing = neighbours(cell)
            .filter_map(|key| grid.get(&key))
            .flatten()
            .copied()
            .filter(|&k| positions[kept[k as usize]].distance(p) <= tolerance)
            .min();

        match existing {
            Some(k) => remap.push(k),
            None => {
                let k = kept.len() as u32;
                kept.push(i);
                grid.entry(cell).or_default().push(k);
                remap.push(k);
            }
        }
    }

    WeldMap { remap, kept }
}

fn grid_cell(p: DVec3, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

fn neighbours((x, y, z): (i64, i64, i64)) -> impl Iterator<Item = (i64, i64, i64)> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (x + dx, y + dy, z + dz)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_across_cell_boundary() {
        // Straddles a grid line at x = 0.
        let positions = [DVec3::new(-1e-9, 0.0, 0.0), DVec3::new(1e-9, 0.0, 0.0)];
        let map = weld_map(&positions, 1e-8);
        assert_eq!(map.remap, vec![0, 0]);
        assert_eq!(map.vertex_count(), 1);
    }

    #[test]
    fn test_weld_keeps_distinct_points() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::Y];
        let map = weld_map(&positions, 1e-8);
        assert_eq!(map.remap, vec![0, 1, 2]);
    }

    #[test]
    fn test_weld_prefers_earliest_kept_vertex() {
        // The last point is within tolerance of both kept points; the one in
        // the lower grid cell was kept second.
        let positions = [
            DVec3::new(1.2, 0.0, 0.0),
            DVec3::new(-0.6, 0.0, 0.0),
            DVec3::new(0.3, 0.0, 0.0),
        ];
        let map = weld_map(&positions, 1.0);
        assert_eq!(map.kept, vec![0, 1]);
        assert_eq!(map.remap, vec![0, 1, 0]);
    }

    #[test]
    fn test_gather_and_apply() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::ZERO, DVec3::Y];
        let map = weld_map(&positions, 1e-8);
        assert_eq!(map.gather(&positions), vec![DVec3::ZERO, DVec3::X, DVec3::Y]);

        let mut indices = vec![0, 1, 3, 2, 3, 1];
        map.apply(&mut indices);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 1]);
    }

    #[test]
    fn test_apply_and_compact_drops_collapsed_triangles() {
        let positions = [DVec3::ZERO, DVec3::X, DVec3::ZERO, DVec3::Y];
        let map = weld_map(&positions, 1e-8);
        let mut indices = vec![0, 1, 3, 0, 2, 1, 2, 3, 1];
        assert_eq!(map.apply_and_compact(&mut indices), 1);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 1]);
    }
}
