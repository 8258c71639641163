//! # Mesh Builder
//!
//! Procedural triangle mesh construction and geometry post-processing.
//! Produces flat position/index/normal/texture buffers for a display layer.
//!
//! ## Architecture
//!
//! ```text
//! MeshBuilder (add_* calls) → MeshGeometry3D (snapshot) → helper (normals, contours, edges)
//! ```
//!
//! ## Primitives
//!
//! - **Box**: per-face vertices when normals or texture coordinates are kept
//! - **Sphere / Ellipsoid**: latitude/longitude grid from a cached template
//! - **Surfaces of revolution**: cylinder, cone, arrow, pipe
//! - **Sweeps**: tube, torus, extruded and lofted surfaces
//! - **Chamfer**: planar cut of a mesh corner
//!
//! ## Usage
//!
//! ```rust
//! use mesh_builder::MeshBuilder;
//! use glam::DVec3;
//!
//! let mut builder = MeshBuilder::new(true, true);
//! builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
//! let mesh = builder.to_mesh(false).unwrap();
//! assert_eq!(mesh.positions().len(), 24);
//! assert_eq!(mesh.triangle_indices().len(), 36);
//! ```

pub mod bounds;
pub mod buffers;
pub mod builder;
pub mod error;
pub mod helper;
pub mod mesh;

pub use bounds::Bounds;
pub use builder::{BoxFaces, MeshBuilder};
pub use error::{MeshError, MeshResult};
pub use mesh::MeshGeometry3D;
