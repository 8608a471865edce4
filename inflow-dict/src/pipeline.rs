//! Glue between the run configuration and the two dictionaries

use crate::config::RunConfig;
use crate::error::{OutputError, Result};
use crate::output::{write_fem_dictionary, write_turbulence_dictionary};
use crate::profile::Profile;
use inflow_fem::{FoamMesh, PatchOperators};
use inflow_spectral::{SpectralSynthesizer, SynthesisReport};
use log::info;
use std::fs;
use std::path::Path;

/// Main seed, profiles and the rendered turbulence dictionary
#[derive(Debug, Clone)]
pub struct TurbulenceOutput {
    /// Synthesis outcome
    pub report: SynthesisReport,
    /// Evaluated `t`, `u`, `s`, `l` profiles
    pub profiles: [Profile; 4],
    /// Dictionary text
    pub dictionary: String,
}

/// Operators of the inlet patch and the rendered operator dictionary
#[derive(Debug, Clone)]
pub struct FemOutput {
    /// Patch operators
    pub operators: PatchOperators,
    /// Dictionary text
    pub dictionary: String,
}

/// Synthesize the main seed and render the turbulence dictionary
pub fn build_turbulence(config: &RunConfig) -> Result<TurbulenceOutput> {
    let params = config.spectral.parameters()?;
    let synthesis = config.spectral.synthesis()?;
    let report = SpectralSynthesizer::new(params, synthesis).synthesize()?;
    let profiles = config.profiles.evaluate()?;
    let dictionary =
        write_turbulence_dictionary(&report, &profiles, &config.seeds, &config.output.format);
    Ok(TurbulenceOutput {
        report,
        profiles,
        dictionary,
    })
}

/// Read the mesh in `mesh_dir`, build the operators of the configured patch
/// and render the operator dictionary
pub fn build_fem(config: &RunConfig, mesh_dir: &Path) -> Result<FemOutput> {
    let mesh = FoamMesh::read(mesh_dir)?;
    let operators = PatchOperators::from_mesh(&mesh, &config.mesh.patch, &config.mesh.operators())?;
    let dictionary = write_fem_dictionary(&operators, &config.output.format)?;
    Ok(FemOutput {
        operators,
        dictionary,
    })
}

/// Write `contents` to `path` in one call
pub fn write_dictionary(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| OutputError::io(path, e))?;
    info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
