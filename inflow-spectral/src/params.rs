//! Target statistics of the synthetic turbulence.

use crate::error::{Result, SpectralError};
use ndarray::Array2;

/// Target statistics and discretization controls for a synthesis run.
///
/// The covariance and integral length scales are stored normalized by their
/// `[0, 0]` entry, so the streamwise variance and the streamwise length scale
/// of the streamwise component are both 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralParameters {
    covariance: Array2<f64>,
    length_scales: Array2<f64>,
    energy_resolution: f64,
    cutoff_fraction: f64,
}

impl SpectralParameters {
    /// Validate and normalize a set of target statistics.
    ///
    /// * `covariance` - symmetric 3x3 velocity covariance with a positive diagonal
    /// * `length_scales` - 3x3 integral length scales, `[i, j]` is component `i` along axis `j`
    /// * `energy_resolution` - `dEd`, number of energy quanta per unit spectrum
    /// * `cutoff_fraction` - `finalE`, fraction of the total energy to capture
    pub fn new(
        covariance: Array2<f64>,
        length_scales: Array2<f64>,
        energy_resolution: f64,
        cutoff_fraction: f64,
    ) -> Result<Self> {
        check_shape("covariance", &covariance)?;
        check_shape("length scales", &length_scales)?;

        for i in 0..3 {
            let value = covariance[[i, i]];
            if !(value > 0.0 && value.is_finite()) {
                return Err(SpectralError::NonPositive {
                    name: "covariance",
                    row: i,
                    col: i,
                    value,
                });
            }
        }
        let scale = covariance[[0, 0]];
        for i in 0..3 {
            for j in (i + 1)..3 {
                let tol = 1e-12 * scale.max(covariance[[i, j]].abs());
                if (covariance[[i, j]] - covariance[[j, i]]).abs() > tol {
                    return Err(SpectralError::AsymmetricCovariance { row: i, col: j });
                }
            }
        }
        for ((row, col), &value) in length_scales.indexed_iter() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SpectralError::NonPositive {
                    name: "length scales",
                    row,
                    col,
                    value,
                });
            }
        }
        if !(energy_resolution > 0.0 && energy_resolution.is_finite()) {
            return Err(SpectralError::InvalidResolution(energy_resolution));
        }
        if !(cutoff_fraction > 0.0 && cutoff_fraction < 1.0) {
            return Err(SpectralError::InvalidCutoff(cutoff_fraction));
        }

        let l00 = length_scales[[0, 0]];
        Ok(Self {
            covariance: covariance / scale,
            length_scales: length_scales / l00,
            energy_resolution,
            cutoff_fraction,
        })
    }

    /// Normalized covariance, `covariance[[0, 0]] == 1`.
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Normalized integral length scales, `length_scales[[0, 0]] == 1`.
    pub fn length_scales(&self) -> &Array2<f64> {
        &self.length_scales
    }

    /// Energy quanta per unit spectrum (`dEd`).
    pub fn energy_resolution(&self) -> f64 {
        self.energy_resolution
    }

    /// Fraction of the total energy captured by the lattice (`finalE`).
    pub fn cutoff_fraction(&self) -> f64 {
        self.cutoff_fraction
    }

    /// Energy each axis must capture so that the product over three axes
    /// reaches the cutoff fraction.
    pub fn axis_energy_target(&self) -> f64 {
        self.cutoff_fraction.powf(1.0 / 3.0)
    }

    /// Length scale of component `component` along axis `axis`.
    pub fn length_scale(&self, component: usize, axis: usize) -> f64 {
        self.length_scales[[component, axis]]
    }

    /// Comment block recording the generation parameters, one `//` line each.
    pub fn description(&self) -> String {
        let row = |m: &Array2<f64>, i: usize| {
            format!("{:.3} {:.3} {:.3}", m[[i, 0]], m[[i, 1]], m[[i, 2]])
        };
        let c = &self.covariance;
        let l = &self.length_scales;
        [
            format!("// Covariance = [{}]", row(c, 0)),
            format!("//              [{}]", row(c, 1)),
            format!("//              [{}]", row(c, 2)),
            format!("// L          = [{}]", row(l, 0)),
            format!("//              [{}]", row(l, 1)),
            format!("//              [{}]", row(l, 2)),
            format!("// dEd = {}", self.energy_resolution),
            format!("// finalE = {}", self.cutoff_fraction),
        ]
        .join("\n")
    }
}

fn check_shape(name: &'static str, matrix: &Array2<f64>) -> Result<()> {
    let (rows, cols) = matrix.dim();
    if rows != 3 || cols != 3 {
        return Err(SpectralError::NotThreeByThree { name, rows, cols });
    }
    Ok(())
}
