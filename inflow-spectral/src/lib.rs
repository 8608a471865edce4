//! Spectral synthesis of divergence-free synthetic turbulence.
//!
//! The generator discretizes a separable von Karman spectrum on an adaptive
//! wavenumber lattice, moves every lattice mode into the realizability
//! domain, solves the amplitude pair of each mode in closed form and rescales
//! the result toward the target covariance and integral length scales.
//!
//! # Example
//!
//! ```rust,no_run
//! use inflow_spectral::{SpectralParameters, SpectralSynthesizer, SynthesisConfigBuilder};
//! use ndarray::array;
//!
//! let params = SpectralParameters::new(
//!     array![[1.0, 0.0, 0.0], [0.0, 0.5625, 0.0], [0.0, 0.0, 0.25]],
//!     array![[1.0, 0.6, 0.4], [0.6, 0.5, 0.3], [0.35, 0.25, 0.2]],
//!     5.0,
//!     0.95,
//! )?;
//! let config = SynthesisConfigBuilder::new().seed(42).build()?;
//! let report = SpectralSynthesizer::new(params, config).synthesize()?;
//! println!("{report}");
//! # Ok::<(), inflow_spectral::SpectralError>(())
//! ```
#![warn(missing_docs)]

pub mod error;
pub use error::{Result, SpectralError};

/// Target statistics.
pub mod params;
pub use params::SpectralParameters;

pub mod spectrum;

pub mod sampling;
pub use sampling::{SpectralCell, build_lattice, sample_axis, sample_lattice_axes};

pub mod realizability;
pub use realizability::{
    CorrectionConfig, CorrectionSummary, correct_mode, correct_modes, existence_function,
    is_realizable,
};

pub mod amplitudes;
pub use amplitudes::{AmplitudeSolution, Amplitudes, build_mode, derive_amplitudes};

pub mod field;
pub use field::{SpectralMode, TurbulentField};

pub mod metrics;
pub use metrics::{InflowMetrics, covariance, integral_length_scale};

pub mod rescale;
pub use rescale::{rescale_length_scales, rescale_variance};

/// Synthesis pipeline.
pub mod synth;
pub use synth::{SpectralSynthesizer, SynthesisConfig, SynthesisConfigBuilder, SynthesisReport};

mod vector;
