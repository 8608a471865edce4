//! Nelder-Mead downhill simplex.
//!
//! Follows SciPy's `minimize(method="Nelder-Mead")`: the same initial simplex
//! (5% perturbation, 0.00025 for zero coordinates), the same reflection,
//! expansion, contraction and shrink coefficients, and the same convergence
//! test on both the simplex spread and the function values. When bounds are
//! given every trial point is clipped into the box.

use crate::error::{OptimError, Result};
use ndarray::Array1;
use std::cell::Cell;
use std::fmt;

const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

/// Configuration for [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations (defaults to `200 * n`).
    pub maxiter: Option<usize>,
    /// Maximum number of function evaluations (defaults to `200 * n`).
    pub maxfev: Option<usize>,
    /// Absolute tolerance on the simplex spread.
    pub xatol: f64,
    /// Absolute tolerance on the function values across the simplex.
    pub fatol: f64,
    /// Optional box constraints, one `(lower, upper)` pair per variable.
    pub bounds: Option<Vec<(f64, f64)>>,
    /// Use dimension-dependent coefficients (Gao & Han 2012).
    pub adaptive: bool,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            maxiter: None,
            maxfev: None,
            xatol: 1e-4,
            fatol: 1e-4,
            bounds: None,
            adaptive: false,
        }
    }
}

/// Fluent builder for [`NelderMeadConfig`].
///
/// ```
/// use inflow_optim::NelderMeadConfigBuilder;
///
/// let config = NelderMeadConfigBuilder::new()
///     .tol(1e-6)
///     .bounds(vec![(0.0, 10.0)])
///     .build()
///     .expect("valid config");
/// assert_eq!(config.xatol, 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NelderMeadConfigBuilder {
    cfg: NelderMeadConfig,
}

impl NelderMeadConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            cfg: NelderMeadConfig::default(),
        }
    }
    /// Sets both `xatol` and `fatol`, like SciPy's `tol` argument.
    pub fn tol(mut self, v: f64) -> Self {
        self.cfg.xatol = v;
        self.cfg.fatol = v;
        self
    }
    /// Sets the simplex spread tolerance.
    pub fn xatol(mut self, v: f64) -> Self {
        self.cfg.xatol = v;
        self
    }
    /// Sets the function value tolerance.
    pub fn fatol(mut self, v: f64) -> Self {
        self.cfg.fatol = v;
        self
    }
    /// Sets the maximum number of iterations.
    pub fn maxiter(mut self, v: usize) -> Self {
        self.cfg.maxiter = Some(v);
        self
    }
    /// Sets the maximum number of function evaluations.
    pub fn maxfev(mut self, v: usize) -> Self {
        self.cfg.maxfev = Some(v);
        self
    }
    /// Sets box constraints.
    pub fn bounds(mut self, v: Vec<(f64, f64)>) -> Self {
        self.cfg.bounds = Some(v);
        self
    }
    /// Enables/disables adaptive coefficients.
    pub fn adaptive(mut self, v: bool) -> Self {
        self.cfg.adaptive = v;
        self
    }
    /// Builds and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns `OptimError::InvalidTolerance` for negative or non-finite
    /// tolerances and `OptimError::InvalidBounds` for inverted bounds.
    pub fn build(self) -> Result<NelderMeadConfig> {
        for value in [self.cfg.xatol, self.cfg.fatol] {
            if !value.is_finite() || value < 0.0 {
                return Err(OptimError::InvalidTolerance { value });
            }
        }
        if let Some(bounds) = &self.cfg.bounds {
            check_bounds(bounds)?;
        }
        Ok(self.cfg)
    }
}

/// Result of a Nelder-Mead minimization.
#[derive(Clone)]
pub struct NelderMeadReport {
    /// Best point found.
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Whether the tolerance test was met before the budgets ran out.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// Number of iterations performed.
    pub nit: usize,
    /// Number of function evaluations performed.
    pub nfev: usize,
}

impl fmt::Debug for NelderMeadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NelderMeadReport")
            .field("x", &self.x.to_vec())
            .field("fun", &self.fun)
            .field("success", &self.success)
            .field("message", &self.message)
            .field("nit", &self.nit)
            .field("nfev", &self.nfev)
            .finish()
    }
}

fn check_bounds(bounds: &[(f64, f64)]) -> Result<()> {
    for (index, &(lower, upper)) in bounds.iter().enumerate() {
        if lower > upper {
            return Err(OptimError::InvalidBounds {
                index,
                lower,
                upper,
            });
        }
    }
    Ok(())
}

fn clip(x: &mut Array1<f64>, bounds: Option<&[(f64, f64)]>) {
    if let Some(bounds) = bounds {
        for (xi, &(lower, upper)) in x.iter_mut().zip(bounds) {
            *xi = xi.clamp(lower, upper);
        }
    }
}

/// Minimize `func` starting from `x0`.
///
/// Non-convergence within the iteration/evaluation budgets is not an error:
/// the best point is returned with `success == false`.
///
/// # Errors
///
/// Returns an error for an empty starting point or bounds of the wrong
/// dimension.
pub fn nelder_mead<F>(
    func: F,
    x0: &Array1<f64>,
    config: &NelderMeadConfig,
) -> Result<NelderMeadReport>
where
    F: Fn(&Array1<f64>) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(OptimError::EmptyStart);
    }
    let bounds = config.bounds.as_deref();
    if let Some(b) = bounds {
        if b.len() != n {
            return Err(OptimError::BoundsMismatch {
                expected: n,
                got: b.len(),
            });
        }
        check_bounds(b)?;
    }

    let dim = n as f64;
    let (rho, chi, psi, sigma) = if config.adaptive {
        (1.0, 1.0 + 2.0 / dim, 0.75 - 1.0 / (2.0 * dim), 1.0 - 1.0 / dim)
    } else {
        (1.0, 2.0, 0.5, 0.5)
    };
    let maxiter = config.maxiter.unwrap_or(200 * n);
    let maxfev = config.maxfev.unwrap_or(200 * n);

    let mut start = x0.clone();
    if let Some(b) = bounds {
        if start.iter().zip(b).any(|(&xi, &(lo, hi))| xi < lo || xi > hi) {
            log::warn!("Initial guess is not within the specified bounds, clipping");
        }
    }
    clip(&mut start, bounds);

    let mut sim: Vec<Array1<f64>> = Vec::with_capacity(n + 1);
    sim.push(start.clone());
    for k in 0..n {
        let mut y = start.clone();
        if y[k] != 0.0 {
            y[k] *= 1.0 + NONZERO_DELTA;
        } else {
            y[k] = ZERO_DELTA;
        }
        clip(&mut y, bounds);
        sim.push(y);
    }

    let nfev = Cell::new(0usize);
    let eval = |x: &Array1<f64>| {
        nfev.set(nfev.get() + 1);
        func(x)
    };

    let mut fsim: Vec<f64> = sim.iter().map(|s| eval(s)).collect();
    sort_simplex(&mut sim, &mut fsim);

    let mut nit = 1usize;
    let mut converged = false;

    while nfev.get() < maxfev && nit < maxiter {
        let x_spread = sim[1..]
            .iter()
            .flat_map(|s| s.iter().zip(sim[0].iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let f_spread = fsim[1..]
            .iter()
            .map(|f| (f - fsim[0]).abs())
            .fold(0.0_f64, f64::max);
        if x_spread <= config.xatol && f_spread <= config.fatol {
            converged = true;
            break;
        }

        let mut xbar = Array1::<f64>::zeros(n);
        for s in &sim[..n] {
            xbar += s;
        }
        xbar /= dim;

        let worst = sim[n].clone();
        let mut xr = &xbar * (1.0 + rho) - &worst * rho;
        clip(&mut xr, bounds);
        let fxr = eval(&xr);
        let mut shrink = false;

        if fxr < fsim[0] {
            let mut xe = &xbar * (1.0 + rho * chi) - &worst * (rho * chi);
            clip(&mut xe, bounds);
            let fxe = eval(&xe);
            if fxe < fxr {
                sim[n] = xe;
                fsim[n] = fxe;
            } else {
                sim[n] = xr;
                fsim[n] = fxr;
            }
        } else if fxr < fsim[n - 1] {
            sim[n] = xr;
            fsim[n] = fxr;
        } else if fxr < fsim[n] {
            let mut xc = &xbar * (1.0 + psi * rho) - &worst * (psi * rho);
            clip(&mut xc, bounds);
            let fxc = eval(&xc);
            if fxc <= fxr {
                sim[n] = xc;
                fsim[n] = fxc;
            } else {
                shrink = true;
            }
        } else {
            let mut xcc = &xbar * (1.0 - psi) + &worst * psi;
            clip(&mut xcc, bounds);
            let fxcc = eval(&xcc);
            if fxcc < fsim[n] {
                sim[n] = xcc;
                fsim[n] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            let best = sim[0].clone();
            for j in 1..=n {
                let mut xs = &best + &((&sim[j] - &best) * sigma);
                clip(&mut xs, bounds);
                fsim[j] = eval(&xs);
                sim[j] = xs;
            }
        }

        sort_simplex(&mut sim, &mut fsim);
        nit += 1;
    }

    let message = if converged {
        "Optimization terminated successfully.".to_string()
    } else if nfev.get() >= maxfev {
        "Maximum number of function evaluations has been exceeded.".to_string()
    } else {
        "Maximum number of iterations has been exceeded.".to_string()
    };
    if !converged {
        log::debug!("Nelder-Mead stopped early: {}", message);
    }

    Ok(NelderMeadReport {
        x: sim.swap_remove(0),
        fun: fsim[0],
        success: converged,
        message,
        nit,
        nfev: nfev.get(),
    })
}

fn sort_simplex(sim: &mut Vec<Array1<f64>>, fsim: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&a, &b| fsim[a].total_cmp(&fsim[b]));
    let sorted_sim: Vec<Array1<f64>> = order.iter().map(|&i| sim[i].clone()).collect();
    let sorted_f: Vec<f64> = order.iter().map(|&i| fsim[i]).collect();
    *sim = sorted_sim;
    *fsim = sorted_f;
}
