//! Derivative-free local minimization.
//!
//! A Nelder-Mead simplex minimizer, with optional box constraints, used by the
//! inflow generator wherever a closed form is unavailable: the amplitude
//! fallback of the spectral synthesizer and the exponential fit of integral
//! length scales.
//!
//! # Example
//!
//! ```rust
//! use inflow_optim::{nelder_mead, NelderMeadConfigBuilder};
//! use ndarray::array;
//!
//! let config = NelderMeadConfigBuilder::new().tol(1e-8).build().expect("invalid config");
//! let report = nelder_mead(
//!     |x| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2),
//!     &array![0.0, 0.0],
//!     &config,
//! )
//! .expect("optimization should run");
//!
//! assert!((report.x[0] - 3.0).abs() < 1e-3);
//! ```
#![warn(missing_docs)]

pub mod error;
pub use error::{OptimError, Result};

/// Nelder-Mead simplex implementation.
pub mod nelder_mead;
pub use nelder_mead::{NelderMeadConfig, NelderMeadConfigBuilder, NelderMeadReport, nelder_mead};
