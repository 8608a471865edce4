//! The synthesis pipeline: sampling, realizability, amplitudes, rescaling.

use crate::amplitudes::build_mode;
use crate::error::{Result, SpectralError};
use crate::field::TurbulentField;
use crate::metrics::InflowMetrics;
use crate::params::SpectralParameters;
use crate::realizability::{CorrectionConfig, correct_modes};
use crate::rescale::{rescale_length_scales, rescale_variance};
use crate::sampling::{build_lattice, sample_lattice_axes};
use inflow_optim::{NelderMeadConfig, NelderMeadConfigBuilder};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;

/// Configuration of a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Random seed; `None` draws one from the thread generator
    pub seed: Option<u64>,
    /// Step cap of the adaptive 1D sampler
    pub max_sampling_steps: usize,
    /// Largest tolerated fraction of non-realizable modes; `None` only warns
    pub max_infeasible_fraction: Option<f64>,
    /// Wavevector correction settings
    pub correction: CorrectionConfig,
    /// Nelder-Mead settings of the amplitude fallback
    pub amplitude_fallback: NelderMeadConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_sampling_steps: 100_000,
            max_infeasible_fraction: None,
            correction: CorrectionConfig::default(),
            amplitude_fallback: NelderMeadConfig {
                xatol: 1e-6,
                fatol: 1e-6,
                ..NelderMeadConfig::default()
            },
        }
    }
}

/// Builder for [`SynthesisConfig`].
pub struct SynthesisConfigBuilder {
    cfg: SynthesisConfig,
}

impl Default for SynthesisConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            cfg: SynthesisConfig::default(),
        }
    }
    /// Sets the random seed for reproducibility.
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = Some(v);
        self
    }
    /// Sets the step cap of the 1D sampler.
    pub fn max_sampling_steps(mut self, v: usize) -> Self {
        self.cfg.max_sampling_steps = v;
        self
    }
    /// Fails the run when more than this fraction of modes is not realizable.
    pub fn max_infeasible_fraction(mut self, v: f64) -> Self {
        self.cfg.max_infeasible_fraction = Some(v);
        self
    }
    /// Sets the wavevector correction settings.
    pub fn correction(mut self, v: CorrectionConfig) -> Self {
        self.cfg.correction = v;
        self
    }
    /// Sets the tolerance of the amplitude fallback minimization.
    pub fn amplitude_tolerance(mut self, v: f64) -> Self {
        self.cfg.amplitude_fallback.xatol = v;
        self.cfg.amplitude_fallback.fatol = v;
        self
    }
    /// Builds the configuration.
    pub fn build(self) -> Result<SynthesisConfig> {
        // revalidate the fallback tolerances through the optimizer's own builder
        NelderMeadConfigBuilder::new()
            .xatol(self.cfg.amplitude_fallback.xatol)
            .fatol(self.cfg.amplitude_fallback.fatol)
            .build()?;
        if let Some(f) = self.cfg.max_infeasible_fraction {
            if !(0.0..=1.0).contains(&f) {
                return Err(SpectralError::InvalidThreshold(f));
            }
        }
        Ok(self.cfg)
    }
}

/// Outcome of a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    /// Final, rescaled field
    pub field: TurbulentField,
    /// Field before the two rescaling stages
    pub raw_field: TurbulentField,
    /// Number of wavenumber intervals along each axis
    pub lattice: [usize; 3],
    /// Fraction of modes left outside the realizability domain
    pub infeasible_fraction: f64,
    /// Number of modes whose amplitudes came from the fallback minimization
    pub approximate_modes: usize,
    /// Amplitude factor of the variance rescaling
    pub variance_factor: f64,
    /// Wavevector factor of the length scale rescaling
    pub length_factor: f64,
    /// Statistics of the field before rescaling
    pub raw_metrics: InflowMetrics,
    /// Statistics of the final field
    pub metrics: InflowMetrics,
    /// Parameter comment block
    pub description: String,
}

impl fmt::Display for SynthesisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} modes on a {}x{}x{} lattice",
            self.field.len(),
            self.lattice[0],
            self.lattice[1],
            self.lattice[2]
        )?;
        writeln!(
            f,
            "non-realizable modes: {:.2}%, fallback amplitudes: {}",
            100.0 * self.infeasible_fraction,
            self.approximate_modes
        )?;
        writeln!(
            f,
            "rescaling: amplitudes x{:.4}, wavevectors x{:.4}",
            self.variance_factor, self.length_factor
        )?;
        write!(f, "{}", self.metrics)
    }
}

/// Generates a realizable turbulent field matching target statistics.
pub struct SpectralSynthesizer {
    params: SpectralParameters,
    config: SynthesisConfig,
}

impl SpectralSynthesizer {
    /// Creates a synthesizer for the given targets.
    pub fn new(params: SpectralParameters, config: SynthesisConfig) -> Self {
        Self { params, config }
    }

    /// Target parameters.
    pub fn params(&self) -> &SpectralParameters {
        &self.params
    }

    /// Run the full pipeline.
    pub fn synthesize(&self) -> Result<SynthesisReport> {
        let mut rng: StdRng = match self.config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut thread_rng = rand::rng();
                StdRng::from_rng(&mut thread_rng)
            }
        };

        let axes = sample_lattice_axes(&self.params, self.config.max_sampling_steps)?;
        let lattice = [axes[0].len() - 1, axes[1].len() - 1, axes[2].len() - 1];
        let cells = build_lattice(&self.params, &axes, &mut rng);
        info!(
            "sampled {} modes on a {}x{}x{} lattice",
            cells.len(),
            lattice[0],
            lattice[1],
            lattice[2]
        );

        let wavevectors: Vec<[f64; 3]> = cells.iter().map(|c| c.wavevector).collect();
        let energies: Vec<[f64; 3]> = cells.iter().map(|c| c.energy).collect();
        let corrected = correct_modes(&wavevectors, &energies, &self.config.correction);
        let infeasible_fraction = corrected.infeasible_fraction();
        info!(
            "realizability correction left {:.2}% of the modes infeasible",
            100.0 * infeasible_fraction
        );
        if let Some(allowed) = self.config.max_infeasible_fraction {
            if infeasible_fraction > allowed {
                return Err(SpectralError::RealizabilityNotReached {
                    fraction: infeasible_fraction,
                    allowed,
                });
            }
        }

        let mut modes = Vec::with_capacity(cells.len());
        let mut approximate_modes = 0;
        for (index, (k, e)) in corrected.wavevectors.iter().zip(energies.iter()).enumerate() {
            let (mode, solution) =
                build_mode(index, k, e, &mut rng, &self.config.amplitude_fallback)?;
            if solution.is_approximate() {
                approximate_modes += 1;
            }
            modes.push(mode);
        }
        if approximate_modes * 10 > modes.len() {
            warn!(
                "{} of {} modes needed the amplitude fallback",
                approximate_modes,
                modes.len()
            );
        } else if approximate_modes > 0 {
            debug!(
                "{} of {} modes needed the amplitude fallback",
                approximate_modes,
                modes.len()
            );
        }
        let raw_field = TurbulentField::new(modes);
        let raw_metrics = InflowMetrics::evaluate(&raw_field, &self.params)?;
        debug!("raw field statistics:\n{raw_metrics}");

        let (field, variance_factor) = rescale_variance(&raw_field, self.params.covariance())?;
        info!("variance rescaling factor {:.5}", variance_factor);
        let metrics = InflowMetrics::evaluate(&field, &self.params)?;
        let (field, length_factor) = rescale_length_scales(&field, &metrics);
        info!("length scale rescaling factor {:.5}", length_factor);
        let metrics = InflowMetrics::evaluate(&field, &self.params)?;

        Ok(SynthesisReport {
            field,
            raw_field,
            lattice,
            infeasible_fraction,
            approximate_modes,
            variance_factor,
            length_factor,
            raw_metrics,
            metrics,
            description: self.params.description(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params() -> SpectralParameters {
        SpectralParameters::new(
            array![[1.0, 0.0, 0.0], [0.0, 0.5625, 0.0], [0.0, 0.0, 0.25]],
            array![[1.0, 0.6, 0.4], [0.6, 0.5, 0.3], [0.35, 0.25, 0.2]],
            3.0,
            0.9,
        )
        .unwrap()
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SynthesisConfigBuilder::new().seed(42).build().unwrap();
        let a = SpectralSynthesizer::new(params(), config.clone())
            .synthesize()
            .unwrap();
        let b = SpectralSynthesizer::new(params(), config).synthesize().unwrap();
        assert_eq!(a.field, b.field);
        assert_eq!(a.field.len(), a.lattice.iter().product::<usize>());
    }

    #[test]
    fn test_strict_realizability_threshold() {
        let config = SynthesisConfigBuilder::new()
            .seed(1)
            .correction(CorrectionConfig {
                max_steps: 0,
                ..CorrectionConfig::default()
            })
            .max_infeasible_fraction(0.0)
            .build()
            .unwrap();
        // without correction steps some anisotropic modes stay outside
        let result = SpectralSynthesizer::new(params(), config).synthesize();
        assert!(matches!(
            result,
            Err(SpectralError::RealizabilityNotReached { .. })
        ));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = SynthesisConfigBuilder::new()
            .max_infeasible_fraction(1.5)
            .build();
        assert!(matches!(result, Err(SpectralError::InvalidThreshold(_))));
    }
}
