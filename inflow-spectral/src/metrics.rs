//! Statistics of a turbulent field: covariance and integral length scales.

use crate::error::{Result, SpectralError};
use crate::field::TurbulentField;
use crate::params::SpectralParameters;
use crate::vector::dot;
use inflow_optim::{NelderMeadConfigBuilder, nelder_mead};
use ndarray::{Array1, Array2, array};
use std::f64::consts::PI;
use std::fmt;

/// Number of separations at which the correlation is evaluated.
const CORRELATION_POINTS: usize = 600;
/// Largest separation, in units of the target length scale.
const CORRELATION_EXTENT: f64 = 15.0;
/// Correlation level below which the curve is ignored by the fit.
const CORRELATION_CUTOFF: f64 = 0.15;

/// Velocity covariance of a field, `sum_m 0.5 (p p^T + q q^T)`.
pub fn covariance(field: &TurbulentField) -> Array2<f64> {
    let mut cov = Array2::zeros((3, 3));
    for mode in field {
        for i in 0..3 {
            for j in 0..3 {
                cov[[i, j]] += 0.5 * (mode.p[i] * mode.p[j] + mode.q[i] * mode.q[j]);
            }
        }
    }
    cov
}

/// Two-point correlation of the velocity along `component` for separations
/// along `direction`, sampled at `separations`.
pub fn correlation(
    field: &TurbulentField,
    component: &[f64; 3],
    direction: &[f64; 3],
    separations: &[f64],
) -> Vec<f64> {
    let weighted: Vec<(f64, f64)> = field
        .iter()
        .map(|m| {
            let pu = dot(&m.p, component);
            let qu = dot(&m.q, component);
            (0.5 * (pu * pu + qu * qu), 2.0 * PI * dot(&m.k, direction))
        })
        .collect();
    let total: f64 = weighted.iter().map(|(e, _)| e).sum();

    separations
        .iter()
        .map(|&x| weighted.iter().map(|(e, w)| e * (w * x).cos()).sum::<f64>() / total)
        .collect()
}

/// Integral length scale of the velocity along `component` in `direction`.
///
/// The correlation is sampled on `[0, 15 target]`, truncated before the last
/// point where it still exceeds 0.15, and fitted with `exp(-x / L)`.
pub fn integral_length_scale(
    field: &TurbulentField,
    component: &[f64; 3],
    direction: &[f64; 3],
    target: f64,
) -> Result<f64> {
    if field.is_empty() {
        return Err(SpectralError::EmptyField);
    }
    let extent = CORRELATION_EXTENT * target;
    let step = extent / (CORRELATION_POINTS - 1) as f64;
    let x: Vec<f64> = (0..CORRELATION_POINTS).map(|i| i as f64 * step).collect();
    let corr = correlation(field, component, direction, &x);

    let end = match corr.iter().rposition(|&c| c >= CORRELATION_CUTOFF) {
        Some(idx) if idx > 0 => idx,
        _ => corr.len(),
    };
    let (x, corr) = (&x[..end], &corr[..end]);

    let config = NelderMeadConfigBuilder::new()
        .tol(1e-3)
        .bounds(vec![(1e-3 * target, 1e3 * target)])
        .build()?;
    let report = nelder_mead(
        |l: &Array1<f64>| {
            x.iter()
                .zip(corr.iter())
                .map(|(&xi, &ci)| ((-xi / l[0]).exp() - ci).powi(2))
                .sum::<f64>()
                .sqrt()
        },
        &array![target],
        &config,
    )?;
    Ok(report.x[0])
}

/// Measured statistics of a field next to their targets.
#[derive(Debug, Clone, PartialEq)]
pub struct InflowMetrics {
    /// Measured covariance
    pub covariance: Array2<f64>,
    /// Target covariance
    pub target_covariance: Array2<f64>,
    /// Measured integral length scales, `[component, axis]`
    pub length_scales: Array2<f64>,
    /// Target integral length scales
    pub target_length_scales: Array2<f64>,
}

impl InflowMetrics {
    /// Measure covariance and all nine axis-aligned length scales.
    pub fn evaluate(field: &TurbulentField, params: &SpectralParameters) -> Result<Self> {
        if field.is_empty() {
            return Err(SpectralError::EmptyField);
        }
        let unit = |i: usize| {
            let mut v = [0.0; 3];
            v[i] = 1.0;
            v
        };
        let measure = |n: usize| {
            let (component, axis) = (n / 3, n % 3);
            integral_length_scale(
                field,
                &unit(component),
                &unit(axis),
                params.length_scale(component, axis),
            )
        };

        #[cfg(feature = "parallel")]
        let scales: Vec<f64> = {
            use rayon::prelude::*;
            (0..9).into_par_iter().map(measure).collect::<Result<_>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let scales: Vec<f64> = (0..9).map(measure).collect::<Result<_>>()?;

        let mut length_scales = Array2::zeros((3, 3));
        for (n, value) in scales.into_iter().enumerate() {
            length_scales[[n / 3, n % 3]] = value;
        }

        Ok(Self {
            covariance: covariance(field),
            target_covariance: params.covariance().clone(),
            length_scales,
            target_length_scales: params.length_scales().clone(),
        })
    }

    /// Relative error of the covariance diagonal.
    pub fn covariance_errors(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, e) in out.iter_mut().enumerate() {
            let target = self.target_covariance[[i, i]];
            *e = (self.covariance[[i, i]] - target) / target;
        }
        out
    }

    /// Relative error of every length scale.
    pub fn length_scale_errors(&self) -> Array2<f64> {
        (&self.length_scales - &self.target_length_scales) / &self.target_length_scales
    }

    /// Human readable covariance and length scale blocks, three decimals.
    pub fn description(&self) -> String {
        let mut out = String::from("Covariance:");
        for row in self.covariance.rows() {
            out.push_str(&format!("\n({:.3} {:.3} {:.3})", row[0], row[1], row[2]));
        }
        out.push_str("\nL:");
        for row in self.length_scales.rows() {
            out.push_str(&format!("\n({:.3} {:.3} {:.3})", row[0], row[1], row[2]));
        }
        out
    }
}

impl fmt::Display for InflowMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cov = self.covariance_errors();
        writeln!(f, "Covariance (target in brackets):")?;
        for i in 0..3 {
            writeln!(
                f,
                "  C{i}{i} = {:.4} [{:.4}]  err {:+.2}%",
                self.covariance[[i, i]],
                self.target_covariance[[i, i]],
                100.0 * cov[i]
            )?;
        }
        writeln!(f, "Integral length scales (target in brackets):")?;
        let errors = self.length_scale_errors();
        for i in 0..3 {
            for j in 0..3 {
                writeln!(
                    f,
                    "  L{i}{j} = {:.4} [{:.4}]  err {:+.2}%",
                    self.length_scales[[i, j]],
                    self.target_length_scales[[i, j]],
                    100.0 * errors[[i, j]]
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SpectralMode;
    use approx::assert_relative_eq;

    #[test]
    fn test_covariance_of_single_mode() {
        let field = TurbulentField::new(vec![SpectralMode {
            k: [1.0, 0.0, 0.0],
            energy: [0.0; 3],
            p: [0.0, 1.0, 0.0],
            q: [0.0, 0.0, 2.0],
        }]);
        let cov = covariance(&field);
        assert_relative_eq!(cov[[1, 1]], 0.5);
        assert_relative_eq!(cov[[2, 2]], 2.0);
        assert_relative_eq!(cov[[1, 2]], 0.0);
        assert_relative_eq!(cov[[0, 0]], 0.0);
    }

    #[test]
    fn test_length_scale_of_exponential_spectrum() {
        // Modes sampling a Lorentzian spectrum have correlation exp(-x / L).
        let l = 0.8;
        let n = 4000;
        let dk = 40.0 / n as f64;
        let modes = (0..n)
            .map(|i| {
                let k = (i as f64 + 0.5) * dk;
                let s = 4.0 * l / (1.0 + (2.0 * PI * k * l).powi(2));
                let a = (2.0 * s * dk).sqrt();
                SpectralMode {
                    k: [k, 0.0, 0.0],
                    energy: [s * dk, 0.0, 0.0],
                    p: [a, 0.0, 0.0],
                    q: [0.0; 3],
                }
            })
            .collect();
        let field = TurbulentField::new(modes);

        let measured =
            integral_length_scale(&field, &[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], l).unwrap();
        assert_relative_eq!(measured, l, max_relative = 0.03);
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let field = TurbulentField::default();
        assert!(matches!(
            integral_length_scale(&field, &[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 1.0),
            Err(SpectralError::EmptyField)
        ));
    }
}
