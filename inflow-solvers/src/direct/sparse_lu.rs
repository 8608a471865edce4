//! Sparse LU factorization with threshold partial pivoting
//!
//! Computes `P_r A P_c^T = L U` by right-looking elimination on row maps.
//! The factors are kept in the exported layout consumed by the inflow
//! boundary condition: off-diagonal triplets of `L` and `U`, the two
//! diagonals, and the row and column permutations.

use crate::ordering::{ColumnOrdering, invert_permutation, reverse_cuthill_mckee};
use crate::sparse::CsrMatrix;
use log::{debug, info};
use ndarray::Array1;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors that can occur during sparse LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular (no pivot at step {step})")]
    SingularMatrix { step: usize },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Configuration for [`SparseLu::factorize`]
#[derive(Debug, Clone)]
pub struct LuConfig {
    /// Threshold for keeping the diagonal entry as pivot (default: 1.0)
    ///
    /// The diagonal is chosen when `|a_cc| >= thresh * max_i |a_ic|`; with
    /// 1.0 this is plain partial pivoting where ties keep the diagonal.
    pub diag_pivot_thresh: f64,

    /// Column ordering applied before elimination
    pub ordering: ColumnOrdering,

    /// Pivots with magnitude at or below this value are treated as zero
    pub singular_tol: f64,
}

impl Default for LuConfig {
    fn default() -> Self {
        Self {
            diag_pivot_thresh: 1.0,
            ordering: ColumnOrdering::Natural,
            singular_tol: 1e-300,
        }
    }
}

impl LuConfig {
    /// Configuration that reorders columns with reverse Cuthill-McKee
    pub fn with_rcm() -> Self {
        Self {
            ordering: ColumnOrdering::ReverseCuthillMcKee,
            ..Default::default()
        }
    }

    /// Replace the diagonal pivot threshold
    pub fn diag_pivot_thresh(mut self, thresh: f64) -> Self {
        self.diag_pivot_thresh = thresh;
        self
    }

    /// Replace the column ordering
    pub fn ordering(mut self, ordering: ColumnOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

/// Sparse LU factors in exported form
#[derive(Debug, Clone)]
pub struct SparseLu {
    n: usize,
    lower: Vec<(usize, usize, f64)>,
    upper: Vec<(usize, usize, f64)>,
    lower_diag: Vec<f64>,
    upper_diag: Vec<f64>,
    row_perm: Vec<usize>,
    col_perm: Vec<usize>,
}

impl SparseLu {
    /// Factorize a square sparse matrix
    pub fn factorize(matrix: &CsrMatrix, config: &LuConfig) -> Result<Self, LuError> {
        if !matrix.is_square() {
            return Err(LuError::DimensionMismatch {
                expected: matrix.num_rows,
                got: matrix.num_cols,
            });
        }
        let n = matrix.num_rows;

        // q[k] = original column eliminated at step k
        let q: Vec<usize> = match config.ordering {
            ColumnOrdering::Natural => (0..n).collect(),
            ColumnOrdering::ReverseCuthillMcKee => {
                reverse_cuthill_mckee(&matrix.symmetric_pattern())
            }
        };
        let col_perm = invert_permutation(&q);

        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        let mut col_rows: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (r, c, v) in matrix.iter() {
            rows[r].insert(c, v);
            col_rows[c].insert(r);
        }

        const UNSET: usize = usize::MAX;
        let mut row_perm = vec![UNSET; n];
        let mut lower_raw = Vec::new();
        let mut upper = Vec::new();
        let mut upper_diag = vec![0.0; n];

        for (k, &c) in q.iter().enumerate() {
            let candidates = std::mem::take(&mut col_rows[c]);

            let mut best: Option<(usize, f64)> = None;
            for &i in &candidates {
                let magnitude = rows[i].get(&c).map_or(0.0, |v| v.abs());
                if best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((i, magnitude));
                }
            }
            let Some((mut pivot, max_magnitude)) = best else {
                return Err(LuError::SingularMatrix { step: k });
            };
            if max_magnitude <= config.singular_tol {
                return Err(LuError::SingularMatrix { step: k });
            }
            if candidates.contains(&c) {
                let diag = rows[c].get(&c).map_or(0.0, |v| v.abs());
                if diag >= config.diag_pivot_thresh * max_magnitude {
                    pivot = c;
                }
            }
            row_perm[pivot] = k;

            let pivot_row = std::mem::take(&mut rows[pivot]);
            let pivot_value = pivot_row.get(&c).copied().unwrap_or(0.0);
            for &j in pivot_row.keys() {
                if j != c {
                    col_rows[j].remove(&pivot);
                }
            }

            for &i in candidates.iter().filter(|&&i| i != pivot) {
                let Some(a_ic) = rows[i].remove(&c) else {
                    continue;
                };
                let l = a_ic / pivot_value;
                lower_raw.push((i, k, l));
                for (&j, &u) in pivot_row.iter().filter(|&(&j, _)| j != c) {
                    let entry = rows[i].entry(j).or_insert_with(|| {
                        col_rows[j].insert(i);
                        0.0
                    });
                    *entry -= l * u;
                }
            }

            upper_diag[k] = pivot_value;
            for (&j, &u) in &pivot_row {
                if j != c {
                    upper.push((k, col_perm[j], u));
                }
            }
            debug!(
                "LU step {k}: column {c}, pivot row {pivot}, {} eliminated rows",
                candidates.len() - 1
            );
        }

        let mut lower: Vec<(usize, usize, f64)> = lower_raw
            .into_iter()
            .map(|(i, k, l)| (row_perm[i], k, l))
            .collect();
        lower.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        upper.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        info!(
            "Sparse LU of order {n}: {} lower and {} upper off-diagonal entries",
            lower.len(),
            upper.len()
        );

        Ok(Self {
            n,
            lower,
            upper,
            lower_diag: vec![1.0; n],
            upper_diag,
            row_perm,
            col_perm,
        })
    }

    /// Matrix order
    pub fn order(&self) -> usize {
        self.n
    }

    /// Strictly-lower triplets of the unit-diagonal `L`, ascending row then column
    pub fn lower(&self) -> &[(usize, usize, f64)] {
        &self.lower
    }

    /// Strictly-upper triplets of `U`, ascending row then column
    pub fn upper(&self) -> &[(usize, usize, f64)] {
        &self.upper
    }

    /// Diagonal of `L` (all ones)
    pub fn lower_diag(&self) -> &[f64] {
        &self.lower_diag
    }

    /// Diagonal of `U`
    pub fn upper_diag(&self) -> &[f64] {
        &self.upper_diag
    }

    /// `row_perm[i]`: elimination position of original row `i`
    pub fn row_perm(&self) -> &[usize] {
        &self.row_perm
    }

    /// `col_perm[i]`: elimination position of original column `i`
    pub fn col_perm(&self) -> &[usize] {
        &self.col_perm
    }

    /// Total stored off-diagonal entries of both factors
    pub fn nnz(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// Solve `A x = b` with the stored factors.
    ///
    /// Follows the exported layout: scatter through `row_perm`, forward sweep
    /// over the lower triplets, backward sweep over the upper triplets in
    /// reverse order, gather through `col_perm`.
    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut y = vec![0.0; self.n];
        for (i, &bi) in b.iter().enumerate() {
            y[self.row_perm[i]] = bi / self.lower_diag[i];
        }
        for &(r, c, v) in &self.lower {
            y[r] -= v * y[c] / self.lower_diag[r];
        }

        let mut z: Vec<f64> = y
            .iter()
            .zip(&self.upper_diag)
            .map(|(yi, d)| yi / d)
            .collect();
        for &(r, c, v) in self.upper.iter().rev() {
            z[r] -= v * z[c] / self.upper_diag[r];
        }

        Ok(Array1::from_iter(self.col_perm.iter().map(|&p| z[p])))
    }
}
