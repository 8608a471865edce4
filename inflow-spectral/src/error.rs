//! Error types for spectral synthesis.

use inflow_optim::OptimError;
use thiserror::Error;

/// Errors that can occur while building or measuring a turbulent field.
#[derive(Debug, Error)]
pub enum SpectralError {
    /// A parameter matrix does not have the expected 3x3 shape.
    #[error("{name} must be 3x3, got {rows}x{cols}")]
    NotThreeByThree {
        /// Name of the matrix
        name: &'static str,
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// An entry that must be strictly positive is not.
    #[error("{name}[{row},{col}] must be > 0, got {value}")]
    NonPositive {
        /// Name of the matrix
        name: &'static str,
        /// Row of the entry
        row: usize,
        /// Column of the entry
        col: usize,
        /// Offending value
        value: f64,
    },

    /// The covariance tensor is not symmetric.
    #[error("covariance is not symmetric at [{row},{col}]")]
    AsymmetricCovariance {
        /// Row of the first mismatch
        row: usize,
        /// Column of the first mismatch
        col: usize,
    },

    /// Energy discretization resolution is not positive.
    #[error("energy resolution dEd must be > 0, got {0}")]
    InvalidResolution(f64),

    /// Cutoff energy fraction is outside (0, 1).
    #[error("cutoff fraction finalE must be in (0, 1), got {0}")]
    InvalidCutoff(f64),

    /// Tolerated fraction of non-realizable modes is outside [0, 1].
    #[error("infeasible fraction threshold must be in [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// The adaptive 1D sampler did not reach the energy threshold.
    #[error(
        "spectral sampling along axis {axis} did not reach energy {target:.4} after {steps} steps (reached {reached:.4})"
    )]
    SamplingDiverged {
        /// Axis being sampled
        axis: usize,
        /// Number of steps taken
        steps: usize,
        /// Lowest cumulative energy reached
        reached: f64,
        /// Energy threshold
        target: f64,
    },

    /// Too many modes are still outside the realizability domain.
    #[error("{fraction:.3} of the modes are not realizable (allowed {allowed:.3})")]
    RealizabilityNotReached {
        /// Fraction of infeasible modes
        fraction: f64,
        /// Configured threshold
        allowed: f64,
    },

    /// A turbulent field without modes cannot be measured.
    #[error("turbulent field has no modes")]
    EmptyField,

    /// The local optimizer rejected its setup.
    #[error("optimizer error: {0}")]
    Optimizer(#[from] OptimError),
}

/// A specialized `Result` type for spectral synthesis.
pub type Result<T> = std::result::Result<T, SpectralError>;

impl SpectralError {
    /// Returns `true` if the error comes from invalid caller parameters.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            SpectralError::NotThreeByThree { .. }
                | SpectralError::NonPositive { .. }
                | SpectralError::AsymmetricCovariance { .. }
                | SpectralError::InvalidResolution(_)
                | SpectralError::InvalidCutoff(_)
                | SpectralError::InvalidThreshold(_)
        )
    }

    /// Returns `true` if the error is a numerical non-convergence.
    pub fn is_convergence_error(&self) -> bool {
        matches!(
            self,
            SpectralError::SamplingDiverged { .. } | SpectralError::RealizabilityNotReached { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(SpectralError::InvalidCutoff(1.5).is_parameter_error());
        assert!(!SpectralError::InvalidCutoff(1.5).is_convergence_error());

        let err = SpectralError::RealizabilityNotReached {
            fraction: 0.2,
            allowed: 0.05,
        };
        assert!(err.is_convergence_error());
        assert_eq!(
            err.to_string(),
            "0.200 of the modes are not realizable (allowed 0.050)"
        );
    }
}
