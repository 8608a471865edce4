//! JSON run configuration
//!
//! Every section has defaults, so `{}` is a valid configuration that
//! generates the turbulence dictionary of the reference anisotropic case.

use crate::error::{OutputError, Result};
use crate::output::OutputConfig;
use crate::profile::ProfileSet;
use inflow_fem::{AssemblyConfig, FaceOrientation, OperatorConfig};
use inflow_solvers::LuConfig;
use inflow_spectral::{SpectralError, SpectralParameters, SynthesisConfig, SynthesisConfigBuilder};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration of an `inflow-gen` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target statistics of the main seed
    #[serde(default)]
    pub spectral: SpectralConfig,
    /// Vertical profiles of the turbulence dictionary
    #[serde(default)]
    pub profiles: ProfileSet,
    /// Seed heights
    #[serde(default = "default_seeds")]
    pub seeds: Vec<f64>,
    /// Inlet patch to build operators for
    #[serde(default)]
    pub mesh: MeshConfig,
    /// Output files and formatting
    #[serde(default)]
    pub output: OutputSection,
}

fn default_seeds() -> Vec<f64> {
    vec![0.0]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            spectral: SpectralConfig::default(),
            profiles: ProfileSet::default(),
            seeds: default_seeds(),
            mesh: MeshConfig::default(),
            output: OutputSection::default(),
        }
    }
}

/// Target statistics and discretization of the spectral synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Velocity covariance
    pub covariance: [[f64; 3]; 3],
    /// Integral length scales, `[component][axis]`
    #[serde(rename = "L")]
    pub length_scales: [[f64; 3]; 3],
    /// Energy quanta per unit spectrum
    #[serde(rename = "dEd")]
    pub energy_resolution: f64,
    /// Fraction of the energy captured by the lattice
    #[serde(rename = "finalE")]
    pub cutoff_fraction: f64,
    /// Random seed; drawn from the system when absent
    pub seed: Option<u64>,
    /// Fail when more modes than this fraction stay non-realizable
    pub max_infeasible_fraction: Option<f64>,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            covariance: [[1.0, 0.0, 0.0], [0.0, 0.5625, 0.0], [0.0, 0.0, 0.25]],
            length_scales: [[1.0, 0.6, 0.4], [0.6, 0.5, 0.3], [0.35, 0.25, 0.2]],
            energy_resolution: 5.0,
            cutoff_fraction: 0.95,
            seed: None,
            max_infeasible_fraction: None,
        }
    }
}

fn to_array(m: &[[f64; 3]; 3]) -> Array2<f64> {
    Array2::from_shape_fn((3, 3), |(i, j)| m[i][j])
}

impl SpectralConfig {
    /// Validated target statistics
    pub fn parameters(&self) -> std::result::Result<SpectralParameters, SpectralError> {
        SpectralParameters::new(
            to_array(&self.covariance),
            to_array(&self.length_scales),
            self.energy_resolution,
            self.cutoff_fraction,
        )
    }

    /// Synthesis settings
    pub fn synthesis(&self) -> std::result::Result<SynthesisConfig, SpectralError> {
        let mut builder = SynthesisConfigBuilder::new();
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(fraction) = self.max_infeasible_fraction {
            builder = builder.max_infeasible_fraction(fraction);
        }
        builder.build()
    }
}

/// Mesh input of the operator pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// `constant/polyMesh` directory; the FEM dictionary is skipped when absent
    pub directory: Option<PathBuf>,
    /// Name of the inlet patch
    pub patch: String,
    /// Faces are counter-clockwise seen from inside the domain
    pub counter_clockwise: bool,
    /// Reorder the Laplacian with reverse Cuthill-McKee before factorization
    pub reverse_cuthill_mckee: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            directory: None,
            patch: "inlet".to_string(),
            counter_clockwise: false,
            reverse_cuthill_mckee: false,
        }
    }
}

impl MeshConfig {
    /// Operator pipeline settings
    pub fn operators(&self) -> OperatorConfig {
        let orientation = if self.counter_clockwise {
            FaceOrientation::CounterClockwise
        } else {
            FaceOrientation::Clockwise
        };
        OperatorConfig {
            assembly: AssemblyConfig::default().orientation(orientation),
            lu: if self.reverse_cuthill_mckee {
                LuConfig::with_rcm()
            } else {
                LuConfig::default()
            },
        }
    }
}

/// Output files and their formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Operator dictionary path
    pub fem: Option<PathBuf>,
    /// Turbulence dictionary path
    pub turbulence: Option<PathBuf>,
    /// Numeric layout and header
    #[serde(flatten)]
    pub format: OutputConfig,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            fem: None,
            turbulence: Some(PathBuf::from("inflowDict")),
            format: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| OutputError::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| OutputError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::VelocityProfile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.seeds, vec![0.0]);
        assert_eq!(config.mesh.patch, "inlet");
        assert_eq!(config.output.turbulence, Some(PathBuf::from("inflowDict")));
        assert_eq!(config.output.format.significant_digits, 5);

        let params = config.spectral.parameters().unwrap();
        assert_eq!(params.covariance()[[1, 1]], 0.5625);
    }

    #[test]
    fn test_partial_sections() {
        let config: RunConfig = serde_json::from_str(
            r#"{
                "spectral": {"dEd": 3.0, "seed": 7},
                "mesh": {"directory": "constant/polyMesh", "reverse_cuthill_mckee": true},
                "output": {"fem": "randomDict", "significant_digits": 6},
                "profiles": {"velocity": {"type": "power_law", "u0": 12.0, "z_ref": 10.0, "alpha": 0.16}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.spectral.energy_resolution, 3.0);
        assert_eq!(config.spectral.cutoff_fraction, 0.95);
        assert_eq!(config.spectral.synthesis().unwrap().seed, Some(7));
        assert_eq!(
            config.mesh.operators().lu.ordering,
            inflow_solvers::ColumnOrdering::ReverseCuthillMcKee
        );
        assert_eq!(config.output.fem, Some(PathBuf::from("randomDict")));
        assert_eq!(config.output.format.significant_digits, 6);
        assert!(matches!(
            config.profiles.velocity,
            VelocityProfile::PowerLaw { .. }
        ));
    }

    #[test]
    fn test_invalid_spectral_section() {
        let config: RunConfig =
            serde_json::from_str(r#"{"spectral": {"finalE": 1.5}}"#).unwrap();
        let err = config.spectral.parameters().unwrap_err();
        assert!(err.is_parameter_error());

        let bad = serde_json::from_str::<RunConfig>(r#"{"seeds": "none"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut config = RunConfig::default();
        config.seeds = vec![0.0, 50.0, 120.0];
        config.to_file(&path).unwrap();

        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        assert!(matches!(
            RunConfig::from_file(dir.path().join("missing.json")),
            Err(OutputError::Io { .. })
        ));
    }
}
