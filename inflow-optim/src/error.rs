//! Error types for the Nelder-Mead optimizer.
//!
//! Library errors are `thiserror` enums with helper methods for
//! categorization, in the same shape as the other crates of the workspace.

use thiserror::Error;

/// Errors that can occur while setting up a Nelder-Mead minimization.
#[derive(Debug, Error)]
pub enum OptimError {
    /// The starting point has no coordinates.
    #[error("starting point is empty")]
    EmptyStart,

    /// Bounds were provided for a different number of variables.
    #[error("bounds dimension mismatch: expected {expected}, got {got}")]
    BoundsMismatch {
        /// Dimension of the starting point
        expected: usize,
        /// Number of bound pairs provided
        got: usize,
    },

    /// A lower bound exceeds its corresponding upper bound.
    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds {
        /// Index of the invalid bound pair
        index: usize,
        /// The lower bound value
        lower: f64,
        /// The upper bound value
        upper: f64,
    },

    /// A tolerance is negative or not finite.
    #[error("invalid tolerance: {value} (must be finite and >= 0)")]
    InvalidTolerance {
        /// The rejected tolerance
        value: f64,
    },
}

/// A specialized `Result` type for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimError>;

impl OptimError {
    /// Returns `true` if this is a bounds-related error.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            OptimError::BoundsMismatch { .. } | OptimError::InvalidBounds { .. }
        )
    }

    /// Returns `true` if this is a configuration-related error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, OptimError::InvalidTolerance { .. })
    }
}
