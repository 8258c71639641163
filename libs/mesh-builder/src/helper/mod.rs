//! # Mesh Geometry Helper
//!
//! Post-processing over assembled flat buffers: normals and tangents,
//! bounds and edge queries, plane contours and cuts, vertex welding.
//!
//! All functions are pure; they read their inputs and return new data,
//! except [`normalize_in_place`] which rewrites the given buffer.

mod contour;
mod edges;
mod normals;
mod weld;

pub use contour::{combine_segments, cut, get_contour_segments, ContourSegment, ContourSegments};
pub use edges::{bounds, find_border_edges, find_edges, find_sharp_edges, validate};
pub use normals::{calculate_normals, calculate_tangents, normalize_in_place};
pub use weld::{weld_map, WeldMap};
