//! Amplitude vectors of a spectral mode.
//!
//! For a wavevector `k` and energies `e`, the amplitudes `p` and `q` are
//! chosen orthogonal to `k` (divergence-free) and such that
//! `p_i^2 + q_i^2 = 2 e_i`. Writing `p = a_p d` and `q = a_q d + b_q v` for an
//! orthonormal pair `(d, v)` spanning the plane normal to `k`, the three
//! energy equations have a closed-form solution whenever it is real. Outside
//! that case the residual is minimized with Nelder-Mead instead.

use crate::error::Result;
use crate::field::SpectralMode;
use crate::vector::{cross, normalized, scale};
use inflow_optim::{NelderMeadConfig, nelder_mead};
use ndarray::{Array1, array};
use rand::Rng;
use std::f64::consts::PI;

/// How the amplitudes of a mode were obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmplitudeSolution {
    /// The closed form was real and finite.
    Exact,
    /// Fallback minimization; `residual` is the norm of the relative energy
    /// mismatch at the optimum.
    Approximate {
        /// Remaining relative energy mismatch
        residual: f64,
    },
}

impl AmplitudeSolution {
    /// Whether the fallback minimization was needed.
    pub fn is_approximate(&self) -> bool {
        matches!(self, AmplitudeSolution::Approximate { .. })
    }
}

/// Amplitude pair solved for one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amplitudes {
    /// Cosine amplitude
    pub p: [f64; 3],
    /// Sine amplitude
    pub q: [f64; 3],
    /// How the pair was obtained
    pub solution: AmplitudeSolution,
}

/// Orthonormal pair spanning the plane normal to `k`, built from a random
/// auxiliary direction.
fn normal_plane<R: Rng + ?Sized>(k: &[f64; 3], rng: &mut R) -> ([f64; 3], [f64; 3]) {
    let r1 = rng.random_range(0.0..2.0 * PI);
    let r2 = rng.random_range(-0.5 * PI..0.5 * PI);
    let xi = [r2.cos() * r1.cos(), r2.cos() * r1.sin(), r2.sin()];
    let d = normalized(&cross(k, &xi));
    let v = normalized(&cross(k, &d));
    (d, v)
}

/// Closed-form coefficients `(a_p, a_q, b_q)`, or `None` if any of them is
/// complex or not finite.
fn closed_form(d: &[f64; 3], v: &[f64; 3], e: &[f64; 3]) -> Option<[f64; 3]> {
    let (d1, d2, d3) = (d[0], d[1], d[2]);
    let (v1, v2, v3) = (v[0], v[1], v[2]);
    let (e1, e2, e3) = (e[0], e[1], e[2]);

    let a = -2.0 * d2 * d2 * d1 * v1 + 2.0 * d1 * d1 * d2 * v2;
    let b = -2.0 * d3 * d3 * d1 * v1 + 2.0 * d1 * d1 * d3 * v3;
    let r2 = 2.0 * d1 * d1 * e2 - 2.0 * d2 * d2 * e1;
    let r3 = 2.0 * d1 * d1 * e3 - 2.0 * d3 * d3 * e1;
    let c2 = d2 * d2 * v1 * v1 - d1 * d1 * v2 * v2;
    let c3 = -d3 * d3 * v1 * v1 + d1 * d1 * v3 * v3;

    let bq_sq = (r3 * a - r2 * b) / (c3 * a + c2 * b);
    if !(bq_sq >= 0.0) {
        return None;
    }
    let bq = bq_sq.sqrt();
    let aq = (r2 + bq_sq * c2) / (bq * a);
    let ap_sq = (2.0 * e1 - (aq * d1 + bq * v1).powi(2)) / (d1 * d1);
    if !(ap_sq >= 0.0) {
        return None;
    }
    let coeffs = [ap_sq.sqrt(), aq, bq];
    coeffs.iter().all(|c| c.is_finite()).then_some(coeffs)
}

fn compose(coeffs: &[f64], d: &[f64; 3], v: &[f64; 3]) -> ([f64; 3], [f64; 3]) {
    let p = scale(d, coeffs[0]);
    let mut q = [0.0; 3];
    for i in 0..3 {
        q[i] = coeffs[1] * d[i] + coeffs[2] * v[i];
    }
    (p, q)
}

fn relative_mismatch(coeffs: &Array1<f64>, d: &[f64; 3], v: &[f64; 3], e: &[f64; 3]) -> f64 {
    let (p, q) = compose(&[coeffs[0], coeffs[1], coeffs[2]], d, v);
    (0..3)
        .map(|i| ((p[i] * p[i] + q[i] * q[i] - 2.0 * e[i]) / (2.0 * e[i])).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Solve the amplitudes of one mode.
pub fn derive_amplitudes<R: Rng + ?Sized>(
    k: &[f64; 3],
    e: &[f64; 3],
    rng: &mut R,
    fallback: &NelderMeadConfig,
) -> Result<Amplitudes> {
    let (d, v) = normal_plane(k, rng);

    if let Some(coeffs) = closed_form(&d, &v, e) {
        let (p, q) = compose(&coeffs, &d, &v);
        return Ok(Amplitudes {
            p,
            q,
            solution: AmplitudeSolution::Exact,
        });
    }

    let report = nelder_mead(
        |x| relative_mismatch(x, &d, &v, e),
        &array![0.0, 0.0, 0.0],
        fallback,
    )?;
    let coeffs = [report.x[0], report.x[1], report.x[2]];
    let (p, q) = compose(&coeffs, &d, &v);
    Ok(Amplitudes {
        p,
        q,
        solution: AmplitudeSolution::Approximate {
            residual: report.fun,
        },
    })
}

/// Build mode number `index` (0-based) from a corrected wavevector.
///
/// A random sign is applied per axis to `k`, `p` and `q` alike, which keeps
/// the mode divergence-free while spreading modes over all octants. Modes
/// at odd indices keep `(p, q)`, modes at even indices swap them.
pub fn build_mode<R: Rng + ?Sized>(
    index: usize,
    k: &[f64; 3],
    e: &[f64; 3],
    rng: &mut R,
    fallback: &NelderMeadConfig,
) -> Result<(SpectralMode, AmplitudeSolution)> {
    let amplitudes = derive_amplitudes(k, e, rng, fallback)?;

    let mut mode = SpectralMode {
        k: *k,
        energy: *e,
        p: amplitudes.p,
        q: amplitudes.q,
    };
    for i in 0..3 {
        if rng.random::<bool>() {
            mode.k[i] = -mode.k[i];
            mode.p[i] = -mode.p[i];
            mode.q[i] = -mode.q[i];
        }
    }
    if index % 2 == 0 {
        std::mem::swap(&mut mode.p, &mut mode.q);
    }
    Ok((mode, amplitudes.solution))
}
