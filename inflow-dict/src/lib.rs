//! OpenFOAM dictionaries for synthetic turbulent inflow
//!
//! Two artifacts are produced for the synthetic inlet boundary condition:
//!
//! - the **turbulence dictionary**: vertical profiles of the inflow
//!   statistics, seed heights and the wavevectors and amplitudes of the main
//!   spectral seed
//! - the **operator dictionary**: LU factors of the pinned patch Laplacian,
//!   face-centre gradient operators and the patch contour, used to remove
//!   the divergence of the synthetic velocity on the inlet
//!
//! # Example
//!
//! ```no_run
//! use inflow_dict::{RunConfig, build_turbulence, write_dictionary};
//!
//! let config = RunConfig::from_file("inflow.json")?;
//! let output = build_turbulence(&config)?;
//! write_dictionary("inflowDict".as_ref(), &output.dictionary)?;
//! # Ok::<(), inflow_dict::OutputError>(())
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod profile;

pub use config::{MeshConfig, OutputSection, RunConfig, SpectralConfig};
pub use error::{OutputError, Result};
pub use output::{OutputConfig, write_fem_dictionary, write_turbulence_dictionary};
pub use pipeline::{FemOutput, TurbulenceOutput, build_fem, build_turbulence, write_dictionary};
pub use profile::{
    DeviationProfile, LengthProfile, Profile, ProfileDomain, ProfileKind, ProfileSet, TimeProfile,
    VelocityProfile,
};
