//! # Mesh Errors
//!
//! Error types for mesh construction and post-processing.
//!
//! ## Error Policy
//!
//! - Parameters are validated before any buffer is touched, so a failed call
//!   leaves the builder exactly as it was
//! - Degenerate geometry (zero-length edges, coincident path points) is not
//!   an error; it is skipped with an epsilon check

use thiserror::Error;

/// Errors that can occur during mesh generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// A geometric parameter is outside its valid domain.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// A triangle references a vertex that does not exist.
    #[error("Vertex index {index} out of range (vertex count: {count})")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of vertices available
        count: usize,
    },

    /// An index buffer whose length is not a multiple of three.
    #[error("Index buffer length {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// A per-vertex buffer does not match the position buffer length.
    #[error("Buffer '{buffer}' has {actual} entries, expected {expected}")]
    BufferLengthMismatch {
        /// Name of the mismatched buffer
        buffer: &'static str,
        /// Number of positions
        expected: usize,
        /// Number of entries found
        actual: usize,
    },

    /// Two meshes disagree on which per-vertex buffers they carry.
    #[error("Cannot combine meshes: {0}")]
    IncompatibleBuffers(String),

    /// Too many vertices
    #[error("Too many vertices: {count} (max: {max})")]
    TooManyVertices {
        /// Vertex count reached
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// Too many triangles
    #[error("Too many triangles: {count} (max: {max})")]
    TooManyTriangles {
        /// Triangle count reached
        count: usize,
        /// Configured limit
        max: usize,
    },
}

impl MeshError {
    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }
}

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// Rejects a division count below `min`.
pub(crate) fn ensure_divisions(name: &'static str, value: u32, min: u32) -> MeshResult<()> {
    if value < min {
        return Err(MeshError::invalid_parameter(
            name,
            format!("must be at least {min}, got {value}"),
        ));
    }
    Ok(())
}

/// Rejects a non-positive or non-finite length.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> MeshResult<()> {
    if value <= 0.0 || !value.is_finite() {
        return Err(MeshError::invalid_parameter(
            name,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

/// Rejects a negative or non-finite length.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> MeshResult<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(MeshError::invalid_parameter(
            name,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::invalid_parameter("theta_div", "must be at least 3, got 2");
        assert!(err.to_string().contains("theta_div"));

        let err = MeshError::index_out_of_range(9, 4);
        assert_eq!(
            err.to_string(),
            "Vertex index 9 out of range (vertex count: 4)"
        );
    }

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure_divisions("theta_div", 3, 3).is_ok());
        assert!(ensure_divisions("theta_div", 2, 3).is_err());
        assert!(ensure_positive("radius", 1.0).is_ok());
        assert!(ensure_positive("radius", 0.0).is_err());
        assert!(ensure_positive("radius", f64::NAN).is_err());
        assert!(ensure_non_negative("radius", 0.0).is_ok());
        assert!(ensure_non_negative("radius", -1.0).is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }
}
