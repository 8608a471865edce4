//! Post-synthesis rescaling toward the target statistics.
//!
//! Both stages are pure: they return a new field together with the factor
//! that was applied.

use crate::error::{Result, SpectralError};
use crate::field::TurbulentField;
use crate::metrics::{InflowMetrics, covariance};
use ndarray::Array2;

/// Multiply all amplitudes by the mean over components of
/// `sqrt(target_ii / measured_ii)`.
///
/// Compensates for the small energy deficit of the truncated lattice.
pub fn rescale_variance(
    field: &TurbulentField,
    target: &Array2<f64>,
) -> Result<(TurbulentField, f64)> {
    if field.is_empty() {
        return Err(SpectralError::EmptyField);
    }
    let measured = covariance(field);
    let factor = (0..3)
        .map(|i| (target[[i, i]] / measured[[i, i]]).sqrt())
        .sum::<f64>()
        / 3.0;
    Ok((field.with_scaled_amplitudes(factor), factor))
}

/// Multiply all wavevectors by `(mean(L / L_t) + 2 L_00 / L_t00) / 3`.
///
/// Length scales vary as `1 / k`, so this pulls the measured scales toward
/// their targets with extra weight on the streamwise scale of the
/// streamwise component.
pub fn rescale_length_scales(
    field: &TurbulentField,
    metrics: &InflowMetrics,
) -> (TurbulentField, f64) {
    let ratio = &metrics.length_scales / &metrics.target_length_scales;
    let mean = ratio.mean().unwrap_or(1.0);
    let factor = (mean + 2.0 * ratio[[0, 0]]) / 3.0;
    (field.with_scaled_wavevectors(factor), factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SpectralMode;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn field() -> TurbulentField {
        TurbulentField::new(vec![
            SpectralMode {
                k: [1.0, 1.0, 0.0],
                energy: [0.5, 0.5, 0.0],
                p: [1.0, -1.0, 0.0],
                q: [0.0, 0.0, 0.0],
            },
            SpectralMode {
                k: [0.0, 0.0, 2.0],
                energy: [0.0, 0.0, 0.5],
                p: [0.0, 0.0, 0.0],
                q: [0.0, 0.0, 0.0],
            },
        ])
    }

    #[test]
    fn test_variance_factor_is_mean_of_ratios() {
        let f = TurbulentField::new(vec![SpectralMode {
            k: [1.0, 2.0, 3.0],
            energy: [1.0, 1.0, 1.0],
            p: [1.0, 2.0, 1.0],
            q: [1.0, 0.0, 1.0],
        }]);
        // measured diagonal (1, 2, 1)
        let target = array![[4.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]];
        let (scaled, factor) = rescale_variance(&f, &target).unwrap();

        assert_relative_eq!(factor, (2.0 + 1.0 + 1.0) / 3.0);
        assert_relative_eq!(scaled.modes()[0].p[1], 2.0 * factor);
        assert_eq!(scaled.modes()[0].k, f.modes()[0].k);
        // input untouched
        assert_eq!(f.modes()[0].p, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_length_factor_weights_streamwise_scale() {
        let metrics = InflowMetrics {
            covariance: Array2::eye(3),
            target_covariance: Array2::eye(3),
            length_scales: Array2::from_elem((3, 3), 2.0),
            target_length_scales: Array2::ones((3, 3)),
        };
        let (scaled, factor) = rescale_length_scales(&field(), &metrics);
        assert_relative_eq!(factor, 2.0);
        assert_eq!(scaled.modes()[1].k, [0.0, 0.0, 4.0]);

        let mut skewed = metrics.clone();
        skewed.length_scales[[0, 0]] = 1.1;
        let (_, factor) = rescale_length_scales(&field(), &skewed);
        let mean = (8.0 * 2.0 + 1.1) / 9.0;
        assert_relative_eq!(factor, (mean + 2.0 * 1.1) / 3.0);
    }

    #[test]
    fn test_empty_field() {
        assert!(rescale_variance(&TurbulentField::default(), &Array2::eye(3)).is_err());
    }
}
