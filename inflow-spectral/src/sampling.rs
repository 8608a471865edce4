//! Adaptive wavenumber sampling and construction of the 3D spectral lattice.
//!
//! Each axis is discretized independently: the step at wavenumber `k` is the
//! one that holds `1 / dEd` units of energy for the most energetic of the
//! three spectra along that axis, so the grid is fine where the spectra peak
//! and coarsens in the tail. The tensor product of the three axes forms the
//! lattice; every cell becomes one spectral mode.

use crate::error::{Result, SpectralError};
use crate::params::SpectralParameters;
use crate::spectrum::{trapezoid, von_karman};
use log::debug;
use rand::Rng;

/// Points of the trapezoidal rule used to integrate one sampling step.
const STEP_QUADRATURE_POINTS: usize = 100;

/// 3-point Gauss-Legendre nodes on `[-1, 1]`.
const GAUSS_NODES: [f64; 3] = [-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4];
/// 3-point Gauss-Legendre weights on `[-1, 1]`.
const GAUSS_WEIGHTS: [f64; 3] = [5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0];

/// One cell of the spectral lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralCell {
    /// Jittered representative wavevector, all components positive
    pub wavevector: [f64; 3],
    /// Energy of each velocity component held by the cell
    pub energy: [f64; 3],
}

/// Sample the wavenumber edges along one axis.
///
/// `lengths` are the three spectra length scales along this axis. Sampling
/// stops once the least converged spectrum has accumulated `target` energy.
pub fn sample_axis(
    axis: usize,
    lengths: [f64; 3],
    energy_resolution: f64,
    target: f64,
    max_steps: usize,
) -> Result<Vec<f64>> {
    let quantum = 1.0 / energy_resolution;
    let mut edges = vec![0.0];
    let mut cumulative = [0.0_f64; 3];

    loop {
        let reached = cumulative.iter().copied().fold(f64::INFINITY, f64::min);
        if edges.len() > 1 && reached >= target {
            break;
        }
        if edges.len() > max_steps {
            return Err(SpectralError::SamplingDiverged {
                axis,
                steps: edges.len() - 1,
                reached,
                target,
            });
        }

        let k = edges[edges.len() - 1];
        let dk = lengths
            .iter()
            .map(|&l| quantum / von_karman(k, l))
            .fold(f64::INFINITY, f64::min);
        for (energy, &l) in cumulative.iter_mut().zip(lengths.iter()) {
            *energy += trapezoid(|x| von_karman(x, l), k, k + dk, STEP_QUADRATURE_POINTS);
        }
        edges.push(k + dk);
    }

    debug!(
        "axis {}: {} intervals up to k = {:.4e}",
        axis,
        edges.len() - 1,
        edges[edges.len() - 1]
    );
    Ok(edges)
}

/// Sample the three axes of the lattice.
///
/// Axis `i` is refined against the spectra of row `i` of `L`, the
/// streamwise axis against the three length scales of `u`. Cell energies
/// still use `L[component][axis]`.
pub fn sample_lattice_axes(params: &SpectralParameters, max_steps: usize) -> Result<[Vec<f64>; 3]> {
    let target = params.axis_energy_target();
    let sample = |axis: usize| {
        let lengths = [
            params.length_scale(axis, 0),
            params.length_scale(axis, 1),
            params.length_scale(axis, 2),
        ];
        sample_axis(axis, lengths, params.energy_resolution(), target, max_steps)
    };
    Ok([sample(0)?, sample(1)?, sample(2)?])
}

/// Gauss integrals of every component spectrum over each interval of `edges`.
///
/// Returns `integrals[cell][component]` for the given axis.
fn cell_integrals(params: &SpectralParameters, axis: usize, edges: &[f64]) -> Vec<[f64; 3]> {
    edges
        .windows(2)
        .map(|w| {
            let mid = 0.5 * (w[0] + w[1]);
            let half = 0.5 * (w[1] - w[0]);
            let mut out = [0.0; 3];
            for (component, value) in out.iter_mut().enumerate() {
                let l = params.length_scale(component, axis);
                *value = GAUSS_NODES
                    .iter()
                    .zip(GAUSS_WEIGHTS.iter())
                    .map(|(&x, &w)| w * half * von_karman(mid + x * half, l))
                    .sum();
            }
            out
        })
        .collect()
}

/// Jittered representative wavenumber of one interval.
///
/// The jitter is uniform in `[-dk/2, dk/2)`; near the origin the value is
/// floored at half the jitter magnitude so it never reaches zero.
fn jittered<R: Rng + ?Sized>(lo: f64, hi: f64, rng: &mut R) -> f64 {
    let dk = hi - lo;
    let mid = 0.5 * (lo + hi);
    let jitter = (rng.random::<f64>() - 0.5) * dk;
    (mid + jitter)
        .max(0.5 * jitter.abs())
        .max(f64::EPSILON * dk)
}

/// Build every cell of the lattice defined by `axes`.
///
/// The energy of component `i` in a cell is `covariance[i, i]` times the
/// separable product of the three 1D spectra of `i` integrated over the cell.
/// Cells are visited with the x index outermost and the z index innermost.
pub fn build_lattice<R: Rng + ?Sized>(
    params: &SpectralParameters,
    axes: &[Vec<f64>; 3],
    rng: &mut R,
) -> Vec<SpectralCell> {
    let integrals = [
        cell_integrals(params, 0, &axes[0]),
        cell_integrals(params, 1, &axes[1]),
        cell_integrals(params, 2, &axes[2]),
    ];
    let cov = params.covariance();
    let capacity = integrals.iter().map(Vec::len).product();
    let mut cells = Vec::with_capacity(capacity);

    for (ix, ex) in integrals[0].iter().enumerate() {
        for (iy, ey) in integrals[1].iter().enumerate() {
            for (iz, ez) in integrals[2].iter().enumerate() {
                let mut energy = [0.0; 3];
                for (i, e) in energy.iter_mut().enumerate() {
                    *e = cov[[i, i]] * ex[i] * ey[i] * ez[i];
                }
                let wavevector = [
                    jittered(axes[0][ix], axes[0][ix + 1], rng),
                    jittered(axes[1][iy], axes[1][iy + 1], rng),
                    jittered(axes[2][iz], axes[2][iz + 1], rng),
                ];
                cells.push(SpectralCell { wavevector, energy });
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn params(final_e: f64) -> SpectralParameters {
        SpectralParameters::new(
            Array2::eye(3),
            array![[1.0, 0.6, 0.4], [0.6, 0.5, 0.3], [0.35, 0.25, 0.2]],
            5.0,
            final_e,
        )
        .unwrap()
    }

    #[test]
    fn test_axis_edges_increase_and_capture_target() {
        let lengths = [1.0, 0.6, 0.35];
        let target = 0.95_f64.cbrt();
        let edges = sample_axis(0, lengths, 5.0, target, 10_000).unwrap();

        assert_eq!(edges[0], 0.0);
        assert!(edges.windows(2).all(|w| w[1] > w[0]));
        let end = edges[edges.len() - 1];
        for l in lengths {
            let captured = trapezoid(|x| von_karman(x, l), 0.0, end, 200_000);
            assert!(captured >= target - 1e-3, "L = {l}: {captured}");
        }
    }

    #[test]
    fn test_finer_resolution_gives_more_intervals() {
        let coarse = sample_axis(0, [1.0, 0.6, 0.35], 2.0, 0.98, 10_000).unwrap();
        let fine = sample_axis(0, [1.0, 0.6, 0.35], 20.0, 0.98, 10_000).unwrap();
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn test_step_cap_reports_divergence() {
        let err = sample_axis(1, [1.0, 1.0, 1.0], 1000.0, 0.999, 10).unwrap_err();
        assert!(matches!(
            err,
            SpectralError::SamplingDiverged { axis: 1, steps: 10, .. }
        ));
    }

    #[test]
    fn test_axes_follow_rows_of_length_scales() {
        let p = params(0.95);
        let axes = sample_lattice_axes(&p, 10_000).unwrap();
        let rows = [[1.0, 0.6, 0.4], [0.6, 0.5, 0.3], [0.35, 0.25, 0.2]];
        for (axis, lengths) in rows.into_iter().enumerate() {
            let expected = sample_axis(
                axis,
                lengths,
                p.energy_resolution(),
                p.axis_energy_target(),
                10_000,
            )
            .unwrap();
            assert_eq!(axes[axis], expected, "axis {axis}");
        }

        // L is not symmetric, so the columns give a different lattice
        let column = sample_axis(0, [1.0, 0.6, 0.35], 5.0, p.axis_energy_target(), 10_000).unwrap();
        assert_ne!(axes[0], column);
    }

    #[test]
    fn test_lattice_energy_close_to_cutoff() {
        let p = params(0.95);
        let axes = sample_lattice_axes(&p, 10_000).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let cells = build_lattice(&p, &axes, &mut rng);

        let expected = axes.iter().map(|a| a.len() - 1).product::<usize>();
        assert_eq!(cells.len(), expected);

        for i in 0..3 {
            let total: f64 = cells.iter().map(|c| c.energy[i]).sum();
            assert!((0.85..=1.1).contains(&total), "component {i}: {total}");
        }
    }

    #[test]
    fn test_wavevectors_stay_inside_cells() {
        let p = params(0.9);
        let axes = sample_lattice_axes(&p, 10_000).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let cells = build_lattice(&p, &axes, &mut rng);

        let nz = axes[2].len() - 1;
        let ny = axes[1].len() - 1;
        for (n, cell) in cells.iter().enumerate() {
            let idx = [n / (ny * nz), (n / nz) % ny, n % nz];
            for j in 0..3 {
                let k = cell.wavevector[j];
                assert!(k > 0.0);
                assert!(k >= axes[j][idx[j]] && k <= axes[j][idx[j] + 1]);
            }
        }
    }
}
