//! # Half-Edge
//!
//! Index-based half-edge topology for polygon meshes.
//!
//! Vertices are fixed at construction. Faces are added in winding order and
//! twins are paired as soon as both sides of an edge exist, so adjacency
//! queries work at any point during construction.
//!
//! ## Usage
//!
//! ```rust
//! use half_edge::HalfEdgeMesh;
//! use mesh_builder::MeshBuilder;
//! use glam::DVec3;
//!
//! let mut builder = MeshBuilder::new(false, false);
//! builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
//! let mesh = builder.to_mesh(false).unwrap();
//!
//! let topology = HalfEdgeMesh::from_mesh(&mesh).unwrap();
//! assert!(topology.is_closed());
//! assert_eq!(topology.euler_characteristic(), 2);
//! ```

pub mod error;
pub mod mesh;

pub use error::{TopologyError, TopologyResult};
pub use mesh::{FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, VertexId};

#[cfg(test)]
mod tests;
