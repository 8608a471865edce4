//! Realizability of spectral modes and wavevector correction.
//!
//! A mode with wavevector `k` and component energies `e` can carry a
//! divergence-free velocity pair `(p, q)` only when the existence function
//! `f(k, e)` is negative. Modes outside that domain get their wavevector
//! moved by a gradient flow on `f`, measured in a metric scaled by the
//! original wavevector so that every component moves in proportion to its
//! size.

use crate::vector::{norm, normalized};
use log::{debug, warn};

/// Tolerance unit of the correction.
const EPS: f64 = f64::EPSILON;

/// Configuration of the wavevector correction.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionConfig {
    /// Maximum number of outer integration steps per mode
    pub max_steps: usize,
    /// Length of one outer step as a fraction of the scaled wavevector norm
    pub step_fraction: f64,
    /// Relative tolerance of the adaptive integrator
    pub rtol: f64,
    /// Absolute tolerance of the adaptive integrator
    pub atol: f64,
    /// Maximum number of internal steps within one outer step
    pub max_substeps: usize,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            step_fraction: 0.3,
            rtol: 1e-6,
            atol: 1e-12,
            max_substeps: 500,
        }
    }
}

/// Result of correcting one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedMode {
    /// Wavevector after correction (the input if no correction was needed)
    pub wavevector: [f64; 3],
    /// Whether the mode was already realizable
    pub already_inside: bool,
    /// Whether the final wavevector is realizable
    pub realizable: bool,
}

/// Existence function of a mode.
///
/// With `u = e0 / (k1 k2)^2`, `v = e1 / (k0 k2)^2`, `w = e2 / (k0 k1)^2`,
/// `f = u^2 + v^2 + w^2 - 2 (uv + uw + vw)`.
pub fn existence_function(k: &[f64; 3], e: &[f64; 3]) -> f64 {
    let (u, v, w) = uvw(k, e);
    u * u + v * v + w * w - 2.0 * (u * v + u * w + v * w)
}

/// Gradient of [`existence_function`] with respect to `k`.
pub fn existence_gradient(k: &[f64; 3], e: &[f64; 3]) -> [f64; 3] {
    let (u, v, w) = uvw(k, e);
    let fu = 2.0 * u - 2.0 * (v + w);
    let fv = 2.0 * v - 2.0 * (u + w);
    let fw = 2.0 * w - 2.0 * (u + v);
    [
        fv * (-2.0 * v / k[0]) + fw * (-2.0 * w / k[0]),
        fu * (-2.0 * u / k[1]) + fw * (-2.0 * w / k[1]),
        fu * (-2.0 * u / k[2]) + fv * (-2.0 * v / k[2]),
    ]
}

#[inline]
fn uvw(k: &[f64; 3], e: &[f64; 3]) -> (f64, f64, f64) {
    (
        e[0] / (k[1] * k[2]).powi(2),
        e[1] / (k[0] * k[2]).powi(2),
        e[2] / (k[0] * k[1]).powi(2),
    )
}

/// Whether a mode lies strictly inside the realizability domain.
///
/// Evaluated on the normalized wavevector and energy so the test does not
/// depend on their magnitudes.
pub fn is_realizable(k: &[f64; 3], e: &[f64; 3]) -> bool {
    existence_function(&normalized(k), &normalized(e)) < 0.0
}

/// Gradient flow vector field; vanishes once the state is inside the domain.
struct Flow {
    metric_inv: [f64; 3],
    energy: [f64; 3],
}

impl Flow {
    fn rhs(&self, y: &[f64; 3]) -> [f64; 3] {
        if existence_function(y, &self.energy) < -100.0 * EPS {
            return [0.0; 3];
        }
        let g = existence_gradient(y, &self.energy);
        [
            -self.metric_inv[0] * g[0],
            -self.metric_inv[1] * g[1],
            -self.metric_inv[2] * g[2],
        ]
    }
}

/// Integrate `flow` over a time span `span` with an adaptive Bogacki-Shampine
/// 3(2) pair.
///
/// Returns the last accepted state and whether the full span was covered;
/// integration stops early when the step budget runs out or the state stops
/// being finite.
fn integrate(
    flow: &Flow,
    y0: [f64; 3],
    span: f64,
    config: &CorrectionConfig,
) -> ([f64; 3], bool) {
    let mut y = y0;
    let mut t = 0.0;
    let mut h = span;
    let mut k1 = flow.rhs(&y);

    for _ in 0..config.max_substeps {
        if t >= span {
            return (y, true);
        }
        h = h.min(span - t);

        let k2 = flow.rhs(&axpy(&y, 0.5 * h, &k1));
        let k3 = flow.rhs(&axpy(&y, 0.75 * h, &k2));
        let mut y_new = [0.0; 3];
        for i in 0..3 {
            y_new[i] = y[i] + h * (2.0 / 9.0 * k1[i] + 1.0 / 3.0 * k2[i] + 4.0 / 9.0 * k3[i]);
        }
        let k4 = flow.rhs(&y_new);

        let mut err_sq = 0.0;
        for i in 0..3 {
            let err = h
                * (-5.0 / 72.0 * k1[i] + 1.0 / 12.0 * k2[i] + 1.0 / 9.0 * k3[i] - 0.125 * k4[i]);
            let scale = config.atol + config.rtol * y[i].abs().max(y_new[i].abs());
            err_sq += (err / scale).powi(2);
        }
        let err_norm = (err_sq / 3.0).sqrt();
        if !err_norm.is_finite() || y_new.iter().any(|v| !v.is_finite()) {
            return (y, false);
        }

        if err_norm <= 1.0 {
            t += h;
            y = y_new;
            k1 = k4;
        }
        let factor = if err_norm == 0.0 {
            5.0
        } else {
            (0.9 * err_norm.powf(-1.0 / 3.0)).clamp(0.2, 5.0)
        };
        h *= factor;
    }

    (y, t >= span)
}

#[inline]
fn axpy(y: &[f64; 3], a: f64, x: &[f64; 3]) -> [f64; 3] {
    [y[0] + a * x[0], y[1] + a * x[1], y[2] + a * x[2]]
}

/// Correct one mode toward the realizability domain.
///
/// The wavevector is normalized, flowed down the gradient of `f` with the
/// metric `diag(1 / k)` until `f` becomes negative or the step budget is
/// exhausted, then rescaled so its metric norm equals that of the original
/// wavevector, `sqrt(3)`.
pub fn correct_mode(k: &[f64; 3], e: &[f64; 3], config: &CorrectionConfig) -> CorrectedMode {
    let k_norm = normalized(k);
    let e_norm = normalized(e);

    if existence_function(&k_norm, &e_norm) < -100.0 * EPS {
        return CorrectedMode {
            wavevector: *k,
            already_inside: true,
            realizable: true,
        };
    }

    let metric = [1.0 / k[0], 1.0 / k[1], 1.0 / k[2]];
    let metric_norm =
        |y: &[f64; 3]| norm(&[metric[0] * y[0], metric[1] * y[1], metric[2] * y[2]]);
    let target_norm = 3.0_f64.sqrt();

    let flow = Flow {
        metric_inv: *k,
        energy: e_norm,
    };
    let span = config.step_fraction * metric_norm(&k_norm) / 100.0;
    let stop = -10.0 * 1000.0 * EPS;

    let mut y = k_norm;
    for _ in 0..config.max_steps {
        if existence_function(&y, &e_norm) <= stop {
            break;
        }
        let (next, completed) = integrate(&flow, y, span, config);
        y = next;
        if !completed {
            break;
        }
    }

    let scale = target_norm / metric_norm(&y);
    let mut wavevector = [y[0] * scale, y[1] * scale, y[2] * scale];
    if wavevector.iter().any(|v| !v.is_finite()) {
        wavevector = *k;
    }
    let realizable = is_realizable(&wavevector, e);

    CorrectedMode {
        wavevector,
        already_inside: false,
        realizable,
    }
}

/// Summary of a realizability pass over all modes.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionSummary {
    /// Corrected wavevectors in input order
    pub wavevectors: Vec<[f64; 3]>,
    /// Modes that needed no correction
    pub already_inside: usize,
    /// Modes still outside the domain after correction
    pub infeasible: usize,
}

impl CorrectionSummary {
    /// Fraction of modes still outside the domain.
    pub fn infeasible_fraction(&self) -> f64 {
        if self.wavevectors.is_empty() {
            0.0
        } else {
            self.infeasible as f64 / self.wavevectors.len() as f64
        }
    }
}

/// Correct every mode. Runs in parallel when the `parallel` feature is on.
pub fn correct_modes(
    wavevectors: &[[f64; 3]],
    energies: &[[f64; 3]],
    config: &CorrectionConfig,
) -> CorrectionSummary {
    #[cfg(feature = "parallel")]
    let outcomes: Vec<CorrectedMode> = {
        use rayon::prelude::*;
        wavevectors
            .par_iter()
            .zip(energies.par_iter())
            .map(|(k, e)| correct_mode(k, e, config))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<CorrectedMode> = wavevectors
        .iter()
        .zip(energies.iter())
        .map(|(k, e)| correct_mode(k, e, config))
        .collect();

    let already_inside = outcomes.iter().filter(|o| o.already_inside).count();
    let infeasible = outcomes.iter().filter(|o| !o.realizable).count();
    let summary = CorrectionSummary {
        wavevectors: outcomes.iter().map(|o| o.wavevector).collect(),
        already_inside,
        infeasible,
    };

    debug!(
        "realizability: {} of {} modes already inside",
        already_inside,
        outcomes.len()
    );
    if infeasible > 0 {
        warn!(
            "realizability: {} modes ({:.2}%) remain outside the domain",
            infeasible,
            100.0 * summary.infeasible_fraction()
        );
    }
    summary
}
