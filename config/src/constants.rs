//! # Configuration Constants
//!
//! Centralized constants for the mesh toolkit. All tolerances, tessellation
//! parameters and safety limits are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Default and minimum tessellation divisions
//! - **Limits**: Maximum values for safety bounds
//! - **Runtime**: Validated configuration snapshot (`GlobalConfig`)

use thiserror::Error;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Vectors shorter than this are treated as zero-length, which is how the
/// normal and frame computations detect degenerate input.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Distance below which two consecutive path or profile points are
/// considered the same point.
///
/// Tube sweeps and revolved surfaces skip the second point of such a pair,
/// since a zero-length segment has no direction to orient a ring with.
///
/// # Example
///
/// ```rust
/// use config::constants::{EPSILON, PATH_POINT_EPSILON};
/// assert!(PATH_POINT_EPSILON > EPSILON);
/// ```
pub const PATH_POINT_EPSILON: f64 = 1e-9;

/// Epsilon for vertex deduplication.
///
/// Default tolerance used when welding nearly-identical vertices.
///
/// # Example
///
/// ```rust
/// use config::constants::VERTEX_MERGE_EPSILON;
///
/// fn vertices_should_merge(v1: [f64; 3], v2: [f64; 3]) -> bool {
///     let dx = v1[0] - v2[0];
///     let dy = v1[1] - v2[1];
///     let dz = v1[2] - v2[2];
///     (dx * dx + dy * dy + dz * dz).sqrt() < VERTEX_MERGE_EPSILON
/// }
///
/// assert!(vertices_should_merge([0.0; 3], [1e-9, 0.0, 0.0]));
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

/// Default endpoint-matching tolerance when chaining contour segments.
pub const CONTOUR_TOLERANCE: f64 = 1e-6;

/// Default tolerance for corner chamfering.
///
/// A chamfer distance below this value leaves the mesh untouched, and
/// vertices closer than this to the corner are treated as the corner.
pub const CHAMFER_TOLERANCE: f64 = 1e-6;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Minimum number of divisions around an axis (sphere, tube, revolve).
///
/// Fewer than three points cannot enclose any area.
pub const MIN_THETA_DIV: u32 = 3;

/// Minimum number of latitude rings for a sphere (the two poles).
pub const MIN_PHI_DIV: u32 = 2;

/// Default number of divisions around an axis.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_THETA_DIV, MIN_THETA_DIV};
/// assert!(DEFAULT_THETA_DIV >= MIN_THETA_DIV);
/// ```
pub const DEFAULT_THETA_DIV: u32 = 20;

/// Default number of latitude rings.
pub const DEFAULT_PHI_DIV: u32 = 10;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of vertices in a single mesh.
///
/// Safety limit to prevent memory exhaustion from runaway tessellation
/// parameters.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_VERTICES;
///
/// let vertex_count = 1000;
/// assert!(vertex_count < MAX_VERTICES);
/// ```
pub const MAX_VERTICES: usize = 10_000_000;

/// Maximum number of triangles in a single mesh.
pub const MAX_TRIANGLES: usize = 10_000_000;

/// Buffer length above which per-element vector work is split across
/// the rayon thread pool.
pub const PARALLEL_THRESHOLD: usize = 16_384;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Checks if a value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

// =============================================================================
// GLOBAL CONFIG
// =============================================================================

/// Immutable snapshot of configuration settings shared by the builder and
/// the geometry helpers.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    /// Distance under which two points are considered coincident.
    pub tolerance: f64,
    /// Division count around an axis when the caller does not pick one.
    pub default_theta_div: u32,
    /// Latitude ring count when the caller does not pick one.
    pub default_phi_div: u32,
}

impl GlobalConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// tolerance and default divisions.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(1.0e-6, 24, 12).expect("valid config");
    /// assert_eq!(cfg.default_theta_div, 24);
    /// ```
    pub fn new(
        tolerance: f64,
        default_theta_div: u32,
        default_phi_div: u32,
    ) -> Result<Self, ConfigError> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if default_theta_div < MIN_THETA_DIV {
            return Err(ConfigError::InvalidThetaDiv(default_theta_div));
        }
        if default_phi_div < MIN_PHI_DIV {
            return Err(ConfigError::InvalidPhiDiv(default_phi_div));
        }
        Ok(Self {
            tolerance,
            default_theta_div,
            default_phi_div,
        })
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tolerance: VERTEX_MERGE_EPSILON,
            default_theta_div: DEFAULT_THETA_DIV,
            default_phi_div: DEFAULT_PHI_DIV,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero, negative or not finite.
    #[error("tolerance must be positive: {0}")]
    InvalidTolerance(f64),
    /// Raised when the default theta division count cannot form a ring.
    #[error("default_theta_div must be >= 3: {0}")]
    InvalidThetaDiv(u32),
    /// Raised when the default phi division count cannot reach both poles.
    #[error("default_phi_div must be >= 2: {0}")]
    InvalidPhiDiv(u32),
}
