//! # Contours
//!
//! Plane/mesh intersection: per-triangle contour segments, stitching of
//! segments into polylines, and cutting a mesh with a plane.
//!
//! ## Plane classification
//!
//! A vertex is classified by its signed distance `dot(v - point, normal)`.
//! Vertices with distance exactly `0` count as lying **above** the plane.
//! A triangle emits a segment only if it has vertices on both sides, and a
//! segment shorter than [`EPSILON`] (a triangle touching the plane at a
//! single vertex) is dropped. An edge lying in the plane is therefore
//! reported once, by the triangle on the negative side.

use crate::buffers;
use crate::error::MeshResult;
use crate::mesh::MeshGeometry3D;
use config::constants::EPSILON;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::slice::ChunksExact;
use tracing::debug;

// =============================================================================
// SEGMENTS
// =============================================================================

/// One edge of the intersection between a triangle and a plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourSegment {
    /// First end point
    pub start: DVec3,
    /// Second end point
    pub end: DVec3,
}

impl ContourSegment {
    /// Creates a segment.
    pub fn new(start: DVec3, end: DVec3) -> Self {
        Self { start, end }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Lazy, one-shot iterator over the contour segments of a triangle buffer.
///
/// Each call to `next` advances over triangles until one crosses the plane.
#[derive(Debug, Clone)]
pub struct ContourSegments<'a> {
    positions: &'a [DVec3],
    triangles: ChunksExact<'a, u32>,
    plane_point: DVec3,
    plane_normal: DVec3,
}

impl<'a> ContourSegments<'a> {
    /// Creates the iterator over raw buffers.
    ///
    /// Fails when `indices` holds a partial triangle or addresses a vertex
    /// past the end of `positions`.
    pub fn new(
        positions: &'a [DVec3],
        indices: &'a [u32],
        plane_point: DVec3,
        plane_normal: DVec3,
    ) -> MeshResult<Self> {
        buffers::validate_indices(indices, positions.len())?;
        Ok(Self::new_unchecked(positions, indices, plane_point, plane_normal))
    }

    /// Buffers of a [`MeshGeometry3D`] are valid by construction.
    fn new_unchecked(
        positions: &'a [DVec3],
        indices: &'a [u32],
        plane_point: DVec3,
        plane_normal: DVec3,
    ) -> Self {
        Self {
            positions,
            triangles: indices.chunks_exact(3),
            plane_point,
            plane_normal,
        }
    }
}

impl Iterator for ContourSegments<'_> {
    type Item = ContourSegment;

    fn next(&mut self) -> Option<Self::Item> {
        for tri in self.triangles.by_ref() {
            let p = [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ];
            let d = p.map(|v| (v - self.plane_point).dot(self.plane_normal));
            if let Some(segment) = intersect_triangle(&p, &d) {
                return Some(segment);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.triangles.size_hint().1)
    }
}

/// Returns the contour segments where a plane cuts the triangles of `mesh`.
///
/// # Arguments
///
/// * `mesh` - The mesh to intersect
/// * `plane_point` - Any point on the plane
/// * `plane_normal` - Plane normal (need not be unit length)
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::get_contour_segments;
/// use mesh_builder::MeshBuilder;
/// use glam::DVec3;
///
/// let mut builder = MeshBuilder::new(false, false);
/// builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
/// let mesh = builder.to_mesh(false).unwrap();
///
/// let count = get_contour_segments(&mesh, DVec3::ZERO, DVec3::Z).count();
/// assert_eq!(count, 8); // two triangles per side face
/// ```
pub fn get_contour_segments(
    mesh: &MeshGeometry3D,
    plane_point: DVec3,
    plane_normal: DVec3,
) -> ContourSegments<'_> {
    ContourSegments::new_unchecked(
        mesh.positions(),
        mesh.triangle_indices(),
        plane_point,
        plane_normal,
    )
}

#[inline]
fn is_above(distance: f64) -> bool {
    distance >= 0.0
}

fn intersect_triangle(p: &[DVec3; 3], d: &[f64; 3]) -> Option<ContourSegment> {
    let above = d.map(is_above);
    if above[0] == above[1] && above[1] == above[2] {
        return None;
    }

    let mut crossings = [DVec3::ZERO; 2];
    let mut count = 0;
    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        if above[i] != above[j] {
            let t = d[i] / (d[i] - d[j]);
            crossings[count] = p[i].lerp(p[j], t);
            count += 1;
        }
    }

    let segment = ContourSegment::new(crossings[0], crossings[1]);
    if segment.length() < EPSILON {
        return None;
    }
    Some(segment)
}

// =============================================================================
// SEGMENT COMBINATION
// =============================================================================

/// Chains segments whose end points coincide within `tolerance` into
/// polylines.
///
/// Each segment is used exactly once. A chain grows at its tail until no
/// unused segment touches it or it closes on its start point, then grows at
/// its head. When several unused segments touch the open end, the one with
/// the lowest input position wins. Closed polylines repeat their first point
/// as their last point.
///
/// Branching input (more than two segment ends meeting at one point) only
/// arises from non-manifold meshes; the result is then well-formed but which
/// branch each chain follows depends on input order.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::{combine_segments, ContourSegment};
/// use glam::DVec3;
///
/// let segments = vec![
///     ContourSegment::new(DVec3::ZERO, DVec3::X),
///     ContourSegment::new(DVec3::Y, DVec3::ZERO),
///     ContourSegment::new(DVec3::X, DVec3::Y),
/// ];
/// let contours = combine_segments(segments, 1e-9);
/// assert_eq!(contours.len(), 1);
/// assert_eq!(contours[0].len(), 4);
/// assert_eq!(contours[0].first(), contours[0].last());
/// ```
pub fn combine_segments(
    segments: impl IntoIterator<Item = ContourSegment>,
    tolerance: f64,
) -> Vec<Vec<DVec3>> {
    let segments: Vec<ContourSegment> = segments.into_iter().collect();
    let index = EndpointIndex::new(&segments, tolerance);
    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        used[i] = true;

        let mut chain = VecDeque::from([segments[i].start, segments[i].end]);
        let mut closed = false;

        while let Some(&tail) = chain.back() {
            if chain.len() > 2 && tail.distance(chain[0]) <= tolerance {
                closed = true;
                break;
            }
            match index.find(&segments, &used, tail) {
                Some((j, next)) => {
                    used[j] = true;
                    chain.push_back(next);
                }
                None => break,
            }
        }

        if closed {
            let first = chain[0];
            if let Some(last) = chain.back_mut() {
                *last = first;
            }
        } else {
            while let Some(&head) = chain.front() {
                match index.find(&segments, &used, head) {
                    Some((j, previous)) => {
                        used[j] = true;
                        chain.push_front(previous);
                    }
                    None => break,
                }
            }
        }

        contours.push(Vec::from(chain));
    }

    debug!(
        segments = segments.len(),
        contours = contours.len(),
        "Combined contour segments"
    );
    contours
}

/// Uniform grid over segment end points for tolerance lookups.
struct EndpointIndex {
    cell_size: f64,
    tolerance: f64,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl EndpointIndex {
    fn new(segments: &[ContourSegment], tolerance: f64) -> Self {
        let cell_size = tolerance.max(EPSILON);
        let mut cells: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            cells.entry(cell_key(segment.start, cell_size)).or_default().push(i);
            let end_key = cell_key(segment.end, cell_size);
            if end_key != cell_key(segment.start, cell_size) {
                cells.entry(end_key).or_default().push(i);
            }
        }
        Self {
            cell_size,
            tolerance,
            cells,
        }
    }

    /// Finds the lowest-numbered unused segment with an end point within
    /// tolerance of `point`, returning it and its other end point.
    fn find(
        &self,
        segments: &[ContourSegment],
        used: &[bool],
        point: DVec3,
    ) -> Option<(usize, DVec3)> {
        let (cx, cy, cz) = cell_key(point, self.cell_size);
        let mut best: Option<(usize, DVec3)> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &j in candidates {
                        if used[j] || best.is_some_and(|(b, _)| b <= j) {
                            continue;
                        }
                        let segment = &segments[j];
                        if segment.start.distance(point) <= self.tolerance {
                            best = Some((j, segment.end));
                        } else if segment.end.distance(point) <= self.tolerance {
                            best = Some((j, segment.start));
                        }
                    }
                }
            }
        }

        best
    }
}

#[inline]
fn cell_key(p: DVec3, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

// =============================================================================
// CUT
// =============================================================================

/// Cuts a mesh with a plane, keeping the part on the positive side.
///
/// Triangles entirely above the plane are kept, triangles entirely below are
/// dropped, and straddling triangles are clipped. New vertices on a cut
/// edge are shared between the two triangles using that edge. Normals and
/// texture coordinates are interpolated when present.
///
/// # Example
///
/// ```rust
/// use mesh_builder::helper::cut;
/// use mesh_builder::MeshBuilder;
/// use glam::DVec3;
///
/// let mut builder = MeshBuilder::new(false, false);
/// builder.add_box(DVec3::ZERO, 2.0, 2.0, 2.0).unwrap();
/// let mesh = builder.to_mesh(false).unwrap();
///
/// let top = cut(&mesh, DVec3::ZERO, DVec3::Z).unwrap();
/// let bounds = top.bounds().unwrap();
/// assert!(bounds.min.z.abs() < 1e-12);
/// assert!((bounds.max.z - 1.0).abs() < 1e-12);
/// ```
pub fn cut(
    mesh: &MeshGeometry3D,
    plane_point: DVec3,
    plane_normal: DVec3,
) -> MeshResult<MeshGeometry3D> {
    let mut clipper = Clipper::new(mesh, plane_point, plane_normal);
    for [i0, i1, i2] in mesh.triangles() {
        clipper.clip_triangle([i0, i1, i2]);
    }
    clipper.finish()
}

/// Accumulates the output buffers of [`cut`].
struct Clipper<'a> {
    mesh: &'a MeshGeometry3D,
    distances: Vec<f64>,
    remap: Vec<Option<u32>>,
    edge_vertices: HashMap<(u32, u32), u32>,
    positions: Vec<DVec3>,
    normals: Option<Vec<DVec3>>,
    uvs: Option<Vec<DVec2>>,
    indices: Vec<u32>,
}

impl<'a> Clipper<'a> {
    fn new(mesh: &'a MeshGeometry3D, plane_point: DVec3, plane_normal: DVec3) -> Self {
        let distances = mesh
            .positions()
            .iter()
            .map(|v| (*v - plane_point).dot(plane_normal))
            .collect();
        Self {
            mesh,
            distances,
            remap: vec![None; mesh.vertex_count()],
            edge_vertices: HashMap::new(),
            positions: Vec::new(),
            normals: mesh.normals().map(|_| Vec::new()),
            uvs: mesh.texture_coordinates().map(|_| Vec::new()),
            indices: Vec::new(),
        }
    }

    fn clip_triangle(&mut self, tri: [u32; 3]) {
        let above = tri.map(|i| is_above(self.distances[i as usize]));
        if !above.iter().any(|&a| a) {
            return;
        }
        if above.iter().all(|&a| a) {
            for i in tri {
                let v = self.existing_vertex(i);
                self.indices.push(v);
            }
            return;
        }

        // Sutherland-Hodgman against a single plane yields 3 or 4 vertices.
        let mut polygon: Vec<u32> = Vec::with_capacity(4);
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let (above_a, above_b) = (above[k], above[(k + 1) % 3]);
            if above_a {
                polygon.push(self.existing_vertex(a));
            }
            if above_a != above_b {
                polygon.push(self.edge_vertex(a, b));
            }
        }

        for k in 1..polygon.len() - 1 {
            let (a, b, c) = (polygon[0], polygon[k], polygon[k + 1]);
            if a != b && b != c && a != c {
                self.indices.extend([a, b, c]);
            }
        }
    }

    fn existing_vertex(&mut self, index: u32) -> u32 {
        if let Some(mapped) = self.remap[index as usize] {
            return mapped;
        }
        let i = index as usize;
        let mapped = self.push_vertex(
            self.mesh.positions()[i],
            self.mesh.normals().map(|n| n[i]),
            self.mesh.texture_coordinates().map(|t| t[i]),
        );
        self.remap[i] = Some(mapped);
        mapped
    }

    fn edge_vertex(&mut self, a: u32, b: u32) -> u32 {
        let key = (a.min(b), a.max(b));
        if let Some(&v) = self.edge_vertices.get(&key) {
            return v;
        }
        let (ia, ib) = (key.0 as usize, key.1 as usize);
        let (da, db) = (self.distances[ia], self.distances[ib]);
        let t = da / (da - db);

        let position = self.mesh.positions()[ia].lerp(self.mesh.positions()[ib], t);
        let normal = self
            .mesh
            .normals()
            .map(|n| n[ia].lerp(n[ib], t).normalize_or_zero());
        let uv = self
            .mesh
            .texture_coordinates()
            .map(|uv| uv[ia].lerp(uv[ib], t));

        let v = if t.abs() < EPSILON {
            self.existing_vertex(key.0)
        } else if (1.0 - t).abs() < EPSILON {
            self.existing_vertex(key.1)
        } else {
            self.push_vertex(position, normal, uv)
        };
        self.edge_vertices.insert(key, v);
        v
    }

    fn push_vertex(&mut self, position: DVec3, normal: Option<DVec3>, uv: Option<DVec2>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        if let (Some(normals), Some(n)) = (self.normals.as_mut(), normal) {
            normals.push(n);
        }
        if let (Some(uvs), Some(uv)) = (self.uvs.as_mut(), uv) {
            uvs.push(uv);
        }
        index
    }

    fn finish(self) -> MeshResult<MeshGeometry3D> {
        debug!(
            triangles_in = self.mesh.triangle_count(),
            triangles_out = self.indices.len() / 3,
            "Cut mesh with plane"
        );
        let mut result = MeshGeometry3D::new(self.positions, self.indices)?;
        if let Some(normals) = self.normals {
            result = result.with_normals(normals)?;
        }
        if let Some(uvs) = self.uvs {
            result = result.with_texture_coordinates(uvs)?;
        }
        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;

    fn triangle(a: DVec3, b: DVec3, c: DVec3) -> MeshGeometry3D {
        MeshGeometry3D::new(vec![a, b, c], vec![0, 1, 2]).unwrap()
    }

    #[test]
    fn test_straddling_triangle_yields_one_segment() {
        let mesh = triangle(
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(2.0, 0.0, 1.0),
            DVec3::new(0.0, 2.0, 1.0),
        );
        let segments: Vec<_> = get_contour_segments(&mesh, DVec3::ZERO, DVec3::Z).collect();
        assert_eq!(segments.len(), 1);
        let s = segments[0];
        assert!(s.start.z.abs() < 1e-12 && s.end.z.abs() < 1e-12);
        assert!((s.length() - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_on_one_side_yields_nothing() {
        let mesh = triangle(DVec3::Z, DVec3::new(1.0, 0.0, 2.0), DVec3::new(0.0, 1.0, 3.0));
        assert_eq!(get_contour_segments(&mesh, DVec3::ZERO, DVec3::Z).count(), 0);
        assert_eq!(get_contour_segments(&mesh, DVec3::ZERO, -DVec3::Z).count(), 0);
    }

    #[test]
    fn test_on_plane_vertex_counts_as_above() {
        // Vertex 0 lies on the plane; the other two are above: no crossing.
        let mesh = triangle(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), DVec3::new(0.0, 1.0, 1.0));
        assert_eq!(get_contour_segments(&mesh, DVec3::ZERO, DVec3::Z).count(), 0);
    }

    #[test]
    fn test_touching_vertex_segment_is_dropped() {
        // Vertex 0 on the plane, the others below: both crossings land on vertex 0.
        let mesh = triangle(
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, -1.0),
            DVec3::new(0.0, 1.0, -1.0),
        );
        assert_eq!(get_contour_segments(&mesh, DVec3::ZERO, DVec3::Z).count(), 0);
    }

    #[test]
    fn test_iterator_is_lazy_over_many_triangles() {
        let positions = vec![
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
            DVec3::new(5.0, 5.0, 5.0),
        ];
        let indices = [0, 1, 2, 1, 2, 3, 0, 2, 1];
        let mut iter = ContourSegments::new(&positions, &indices, DVec3::ZERO, DVec3::Z).unwrap();
        assert!(iter.next().is_some());
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_segments_over_raw_buffers_reject_bad_indices() {
        let positions = [DVec3::new(0.0, 0.0, -1.0), DVec3::X, DVec3::Y];
        let err = ContourSegments::new(&positions, &[0, 1, 3], DVec3::ZERO, DVec3::Z).unwrap_err();
        assert_eq!(err, MeshError::IndexOutOfRange { index: 3, count: 3 });
        let err = ContourSegments::new(&positions, &[0, 1], DVec3::ZERO, DVec3::Z).unwrap_err();
        assert_eq!(err, MeshError::IncompleteTriangle(2));
    }

    #[test]
    fn test_combine_open_chain_extends_both_ends() {
        let p = [
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
        ];
        // Middle segment first so the chain must grow at its head too.
        let segments = vec![
            ContourSegment::new(p[1], p[2]),
            ContourSegment::new(p[3], p[2]),
            ContourSegment::new(p[0], p[1]),
        ];
        let contours = combine_segments(segments, 1e-9);
        assert_eq!(contours, vec![vec![p[0], p[1], p[2], p[3]]]);
    }

    #[test]
    fn test_combine_within_tolerance() {
        let segments = vec![
            ContourSegment::new(DVec3::ZERO, DVec3::X),
            ContourSegment::new(DVec3::new(1.0 + 1e-8, 0.0, 0.0), DVec3::Y),
        ];
        assert_eq!(combine_segments(segments.clone(), 1e-6).len(), 1);
        assert_eq!(combine_segments(segments, 1e-10).len(), 2);
    }

    #[test]
    fn test_combine_uses_every_segment_once() {
        let square = [DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y];
        let mut segments: Vec<_> = (0..4)
            .map(|i| ContourSegment::new(square[i], square[(i + 1) % 4]))
            .collect();
        segments.push(ContourSegment::new(DVec3::splat(10.0), DVec3::splat(11.0)));

        let contours = combine_segments(segments, 1e-9);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].len(), 5);
        assert_eq!(contours[0][0], contours[0][4]);
        assert_eq!(contours[1], vec![DVec3::splat(10.0), DVec3::splat(11.0)]);
    }

    #[test]
    fn test_combine_empty() {
        assert!(combine_segments(Vec::new(), 1e-9).is_empty());
    }

    #[test]
    fn test_cut_keeps_positive_side() {
        let mesh = triangle(
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(2.0, 0.0, 1.0),
            DVec3::new(0.0, 2.0, 1.0),
        );
        let top = cut(&mesh, DVec3::ZERO, DVec3::Z).unwrap();
        // One vertex below: the clipped polygon is a quad.
        assert_eq!(top.triangle_count(), 2);
        assert_eq!(top.vertex_count(), 4);
        assert!(top.positions().iter().all(|p| p.z >= -1e-12));

        let bottom = cut(&mesh, DVec3::ZERO, -DVec3::Z).unwrap();
        assert_eq!(bottom.triangle_count(), 1);
        assert!(bottom.positions().iter().all(|p| p.z <= 1e-12));
        assert!((top.area() + bottom.area() - mesh.area()).abs() < 1e-12);
    }

    #[test]
    fn test_cut_interpolates_attributes() {
        let mesh = triangle(
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        )
        .with_normals(vec![DVec3::Y; 3])
        .unwrap()
        .with_texture_coordinates(vec![DVec2::ZERO, DVec2::ONE, DVec2::ONE])
        .unwrap();

        let bottom = cut(&mesh, DVec3::ZERO, -DVec3::Z).unwrap();
        assert_eq!(bottom.vertex_count(), 3);
        let uvs = bottom.texture_coordinates().unwrap();
        assert_eq!(uvs[1], DVec2::splat(0.5));
        assert_eq!(bottom.normals().unwrap()[2], DVec3::Y);
    }
}
