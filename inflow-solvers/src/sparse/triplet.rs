//! Coordinate (triplet) storage used during assembly.

use super::CsrMatrix;

/// Sparse matrix in coordinate format.
///
/// Entries are appended in any order; duplicates are summed when the matrix
/// is compressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripletMatrix {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// (row, col, value) entries
    pub triplets: Vec<(usize, usize, f64)>,
}

impl TripletMatrix {
    /// Create an empty matrix.
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            triplets: Vec::new(),
        }
    }

    /// Create an empty matrix with room for `capacity` entries.
    pub fn with_capacity(num_rows: usize, num_cols: usize, capacity: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            triplets: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry; duplicates are summed on compression.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        self.triplets.push((row, col, value));
    }

    /// Append all entries of `other`.
    pub fn extend(&mut self, other: TripletMatrix) {
        self.triplets.extend(other.triplets);
    }

    /// Number of stored (possibly duplicated) entries.
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Whether no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Compress into CSR, summing duplicates.
    pub fn to_csr(&self) -> CsrMatrix {
        CsrMatrix::from_triplets(self.num_rows, self.num_cols, self.triplets.clone())
    }

    /// `0.5 (A + A^T)`, compressed.
    pub fn symmetrized(&self) -> CsrMatrix {
        let mut entries = Vec::with_capacity(2 * self.triplets.len());
        for &(r, c, v) in &self.triplets {
            entries.push((r, c, 0.5 * v));
            entries.push((c, r, 0.5 * v));
        }
        CsrMatrix::from_triplets(self.num_rows, self.num_cols, entries)
    }
}

impl CsrMatrix {
    /// Copy with row and column `index` replaced by the unit vector.
    ///
    /// Fixes one degree of freedom of a singular operator such as a pure
    /// Neumann Laplacian.
    pub fn pinned(&self, index: usize) -> CsrMatrix {
        let mut entries: Vec<(usize, usize, f64)> = self
            .iter()
            .filter(|&(r, c, _)| r != index && c != index)
            .collect();
        entries.push((index, index, 1.0));
        CsrMatrix::from_triplets(self.num_rows, self.num_cols, entries)
    }
}
