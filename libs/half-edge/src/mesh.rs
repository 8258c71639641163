//! Half-edge mesh with incremental twin resolution.
//!
//! Faces are added one at a time. Each new half-edge looks up its unordered
//! vertex pair in the map of unpaired half-edges: a hit becomes its twin,
//! a miss leaves it pending. An edge whose pair is already complete is
//! non-manifold.

use crate::error::{TopologyError, TopologyResult};
use glam::DVec3;
use mesh_builder::MeshGeometry3D;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Unique identifier for vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

/// Unique identifier for half-edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId(pub u32);

/// Unique identifier for faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u32);

/// Half-edge record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Starting vertex
    pub origin: VertexId,
    /// Next half-edge around the face
    pub next: HalfEdgeId,
    /// Opposite half-edge, `None` on a boundary
    pub twin: Option<HalfEdgeId>,
    /// Face this half-edge bounds
    pub face: FaceId,
}

/// Unordered vertex pair.
type EdgeKey = (u32, u32);

fn edge_key(a: usize, b: usize) -> EdgeKey {
    let (a, b) = (a as u32, b as u32);
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Half-edge mesh over a fixed vertex set.
///
/// # Example
///
/// ```rust
/// use half_edge::HalfEdgeMesh;
/// use glam::DVec3;
///
/// let mut mesh = HalfEdgeMesh::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ONE]);
/// mesh.add_face(&[0, 1, 2]).unwrap();
/// mesh.add_face(&[2, 1, 3]).unwrap();
/// assert_eq!(mesh.edge_count(), 5);
/// assert_eq!(mesh.boundary_half_edges().len(), 4);
/// assert!(mesh.add_face(&[0, 1, 3]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    positions: Vec<DVec3>,
    half_edges: Vec<HalfEdge>,
    /// First half-edge of each face.
    faces: Vec<HalfEdgeId>,
    outgoing: Vec<Vec<HalfEdgeId>>,
    pending: HashMap<EdgeKey, HalfEdgeId>,
    paired: HashSet<EdgeKey>,
}

impl HalfEdgeMesh {
    /// Creates a mesh with the given vertices and no faces.
    pub fn new(positions: Vec<DVec3>) -> Self {
        let outgoing = vec![Vec::new(); positions.len()];
        Self {
            positions,
            half_edges: Vec::new(),
            faces: Vec::new(),
            outgoing,
            pending: HashMap::new(),
            paired: HashSet::new(),
        }
    }

    /// Builds the topology of a triangle mesh, one face per triangle.
    ///
    /// Vertices are taken as-is; weld the mesh first if coincident
    /// positions should share edges.
    pub fn from_mesh(mesh: &MeshGeometry3D) -> TopologyResult<Self> {
        let mut result = Self::new(mesh.positions().to_vec());
        for [a, b, c] in mesh.triangles() {
            result.add_face(&[a as usize, b as usize, c as usize])?;
        }
        debug!(
            vertices = result.vertex_count(),
            faces = result.face_count(),
            boundary = result.pending.len(),
            "Built half-edge mesh"
        );
        Ok(result)
    }

    /// Adds a face given its vertex indices in winding order.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::FaceTooSmall`] for fewer than 3 indices
    /// - [`TopologyError::InvalidVertex`] for an index out of range
    /// - [`TopologyError::DegenerateFace`] for a repeated vertex
    /// - [`TopologyError::NonManifoldEdge`] when the face repeats an existing
    ///   face, or an edge already joins two faces
    /// - [`TopologyError::InconsistentWinding`] when an edge already exists
    ///   in the same direction
    ///
    /// The mesh is unchanged when an error is returned.
    pub fn add_face(&mut self, indices: &[usize]) -> TopologyResult<FaceId> {
        if let Err(err) = self.check_face(indices) {
            debug!(%err, ?indices, "Rejected face");
            return Err(err);
        }

        let n = indices.len();
        let start = self.half_edges.len() as u32;
        let face = FaceId(self.faces.len() as u32);
        self.faces.push(HalfEdgeId(start));

        for (k, &a) in indices.iter().enumerate() {
            let id = HalfEdgeId(start + k as u32);
            let key = edge_key(a, indices[(k + 1) % n]);
            let twin = self.pending.remove(&key);
            match twin {
                Some(t) => {
                    self.half_edges[t.0 as usize].twin = Some(id);
                    self.paired.insert(key);
                }
                None => {
                    self.pending.insert(key, id);
                }
            }
            self.half_edges.push(HalfEdge {
                origin: VertexId(a as u32),
                next: HalfEdgeId(start + ((k + 1) % n) as u32),
                twin,
                face,
            });
            self.outgoing[a].push(id);
        }
        Ok(face)
    }

    fn check_face(&self, indices: &[usize]) -> TopologyResult<()> {
        if indices.len() < 3 {
            return Err(TopologyError::FaceTooSmall(indices.len()));
        }
        let count = self.positions.len();
        for (k, &i) in indices.iter().enumerate() {
            if i >= count {
                return Err(TopologyError::InvalidVertex { index: i, count });
            }
            if indices[..k].contains(&i) {
                return Err(TopologyError::DegenerateFace(i));
            }
        }

        if self.existing_face(indices).is_some() {
            return Err(TopologyError::NonManifoldEdge {
                from: indices[0],
                to: indices[1],
            });
        }

        let n = indices.len();
        for (k, &from) in indices.iter().enumerate() {
            let to = indices[(k + 1) % n];
            let key = edge_key(from, to);
            if self.paired.contains(&key) {
                return Err(TopologyError::NonManifoldEdge { from, to });
            }
            if let Some(&h) = self.pending.get(&key) {
                if self.he(h).origin.0 as usize == from {
                    return Err(TopologyError::InconsistentWinding { from, to });
                }
            }
        }
        Ok(())
    }

    /// Face with the same vertex cycle as `indices`, in any rotation.
    fn existing_face(&self, indices: &[usize]) -> Option<FaceId> {
        let (from, to) = (indices[0], indices[1]);
        let start = self.outgoing[from]
            .iter()
            .copied()
            .find(|&h| self.he(self.he(h).next).origin.0 as usize == to)?;
        let mut h = start;
        for &v in indices {
            if self.he(h).origin.0 as usize != v {
                return None;
            }
            h = self.he(h).next;
        }
        (h == start).then_some(self.he(start).face)
    }

    /// Half-edge by id, for ids produced by this mesh.
    fn he(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.0 as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct edges, paired or boundary.
    pub fn edge_count(&self) -> usize {
        self.paired.len() + self.pending.len()
    }

    /// `V - E + F`, counting every vertex whether or not a face uses it.
    pub fn euler_characteristic(&self) -> i64 {
        self.vertex_count() as i64 - self.edge_count() as i64 + self.face_count() as i64
    }

    /// True when every half-edge has a twin.
    pub fn is_closed(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn position(&self, vertex: VertexId) -> TopologyResult<DVec3> {
        self.positions
            .get(vertex.0 as usize)
            .copied()
            .ok_or(TopologyError::InvalidVertex {
                index: vertex.0 as usize,
                count: self.positions.len(),
            })
    }

    /// Gets a half-edge by ID
    pub fn half_edge(&self, id: HalfEdgeId) -> TopologyResult<&HalfEdge> {
        self.half_edges
            .get(id.0 as usize)
            .ok_or(TopologyError::InvalidHalfEdge(id))
    }

    pub fn origin(&self, id: HalfEdgeId) -> TopologyResult<VertexId> {
        Ok(self.half_edge(id)?.origin)
    }

    pub fn destination(&self, id: HalfEdgeId) -> TopologyResult<VertexId> {
        let next = self.half_edge(id)?.next;
        Ok(self.he(next).origin)
    }

    pub fn next(&self, id: HalfEdgeId) -> TopologyResult<HalfEdgeId> {
        Ok(self.half_edge(id)?.next)
    }

    /// Previous half-edge around the same face.
    pub fn prev(&self, id: HalfEdgeId) -> TopologyResult<HalfEdgeId> {
        let mut current = self.half_edge(id)?.next;
        loop {
            let next = self.he(current).next;
            if next == id {
                return Ok(current);
            }
            current = next;
        }
    }

    pub fn twin(&self, id: HalfEdgeId) -> TopologyResult<Option<HalfEdgeId>> {
        Ok(self.half_edge(id)?.twin)
    }

    /// Face bounded by a half-edge.
    pub fn face_of(&self, id: HalfEdgeId) -> TopologyResult<FaceId> {
        Ok(self.half_edge(id)?.face)
    }

    pub fn is_boundary(&self, id: HalfEdgeId) -> TopologyResult<bool> {
        Ok(self.half_edge(id)?.twin.is_none())
    }

    /// All half-edges without a twin, in creation order.
    pub fn boundary_half_edges(&self) -> Vec<HalfEdgeId> {
        (0..self.half_edges.len() as u32)
            .map(HalfEdgeId)
            .filter(|&h| self.he(h).twin.is_none())
            .collect()
    }

    /// Half-edges of a face in winding order, starting at its first edge.
    pub fn face_half_edges(&self, face: FaceId) -> TopologyResult<Vec<HalfEdgeId>> {
        let start = *self
            .faces
            .get(face.0 as usize)
            .ok_or(TopologyError::InvalidFace(face))?;
        let mut result = vec![start];
        let mut current = self.he(start).next;
        while current != start {
            result.push(current);
            current = self.he(current).next;
        }
        Ok(result)
    }

    pub fn face_vertices(&self, face: FaceId) -> TopologyResult<Vec<VertexId>> {
        Ok(self
            .face_half_edges(face)?
            .into_iter()
            .map(|h| self.he(h).origin)
            .collect())
    }

    /// Faces sharing an edge with `face`, in edge order without repeats.
    pub fn adjacent_faces(&self, face: FaceId) -> TopologyResult<Vec<FaceId>> {
        let mut result: Vec<FaceId> = Vec::new();
        for h in self.face_half_edges(face)? {
            if let Some(t) = self.he(h).twin {
                let other = self.he(t).face;
                if !result.contains(&other) {
                    result.push(other);
                }
            }
        }
        Ok(result)
    }

    pub fn outgoing_half_edges(&self, vertex: VertexId) -> TopologyResult<&[HalfEdgeId]> {
        self.outgoing
            .get(vertex.0 as usize)
            .map(Vec::as_slice)
            .ok_or(TopologyError::InvalidVertex {
                index: vertex.0 as usize,
                count: self.positions.len(),
            })
    }

    /// Vertices sharing an edge with `vertex`, sorted.
    pub fn vertex_neighbors(&self, vertex: VertexId) -> TopologyResult<Vec<VertexId>> {
        let mut result = Vec::new();
        for &h in self.outgoing_half_edges(vertex)? {
            result.push(self.destination(h)?);
            // A boundary edge ending here has no outgoing twin to find it by.
            let incoming = self.prev(h)?;
            if self.he(incoming).twin.is_none() {
                result.push(self.he(incoming).origin);
            }
        }
        result.sort_unstable();
        result.dedup();
        Ok(result)
    }
}
