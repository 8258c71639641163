//! # Config Crate
//!
//! Centralized configuration constants for the mesh toolkit.
//! Tolerances, tessellation defaults and safety limits are defined here so
//! that the builder, the geometry helpers and the half-edge mesh agree on
//! what "coincident" and "degenerate" mean.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{EPSILON, DEFAULT_THETA_DIV, MIN_THETA_DIV};
//!
//! // Use EPSILON for floating-point comparisons
//! let value: f64 = 0.00000000001; // 1e-11, smaller than EPSILON (1e-10)
//! let is_zero = value.abs() < EPSILON;
//! assert!(is_zero);
//!
//! // Fall back to the default resolution when the caller gives none
//! let requested: Option<u32> = None;
//! let theta_div = requested.unwrap_or(DEFAULT_THETA_DIV);
//! assert!(theta_div >= MIN_THETA_DIV);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Validated Overrides**: `GlobalConfig` rejects out-of-domain values

pub mod constants;
