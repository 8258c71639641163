//! Topology errors for the half-edge mesh.

use crate::mesh::{FaceId, HalfEdgeId};
use thiserror::Error;

/// Errors raised while building or querying a half-edge mesh.
///
/// A rejected `add_face` leaves the mesh unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Invalid vertex index {index} (mesh has {count} vertices)")]
    InvalidVertex { index: usize, count: usize },

    #[error("Invalid half-edge reference: {0:?}")]
    InvalidHalfEdge(HalfEdgeId),

    #[error("Invalid face reference: {0:?}")]
    InvalidFace(FaceId),

    #[error("Face needs at least 3 vertices, got {0}")]
    FaceTooSmall(usize),

    #[error("Face uses vertex {0} more than once")]
    DegenerateFace(usize),

    #[error("Edge {from}-{to} already joins two faces")]
    NonManifoldEdge { from: usize, to: usize },

    #[error("Edge {from}->{to} already exists in the same direction")]
    InconsistentWinding { from: usize, to: usize },
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;
