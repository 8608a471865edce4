//! Factorization of a pinned graph Laplacian, as produced for mesh patches.

use approx::assert_relative_eq;
use inflow_solvers::{ColumnOrdering, LuConfig, SparseLu, TripletMatrix, bandwidth};
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

/// Laplacian of a `nx * ny` grid graph with scrambled node ids (`nx * ny` coprime to 7).
fn grid_laplacian(nx: usize, ny: usize) -> TripletMatrix {
    let n = nx * ny;
    let id = |i: usize, j: usize| ((i * ny + j) * 7) % n;
    let mut t = TripletMatrix::new(n, n);
    let mut link = |a: usize, b: usize| {
        t.add(a, a, 1.0);
        t.add(b, b, 1.0);
        t.add(a, b, -1.0);
        t.add(b, a, -1.0);
    };
    for i in 0..nx {
        for j in 0..ny {
            if i + 1 < nx {
                link(id(i, j), id(i + 1, j));
            }
            if j + 1 < ny {
                link(id(i, j), id(i, j + 1));
            }
        }
    }
    t
}

#[test]
fn test_pinned_laplacian_solve() {
    let laplacian = grid_laplacian(4, 3);
    let pinned = laplacian.symmetrized().pinned(0);
    let n = pinned.num_rows;

    let mut rng = StdRng::seed_from_u64(11);
    let b = Array1::from_iter((0..n).map(|_| rng.random_range(-1.0..1.0)));

    for ordering in [ColumnOrdering::Natural, ColumnOrdering::ReverseCuthillMcKee] {
        let lu = SparseLu::factorize(&pinned, &LuConfig::default().ordering(ordering)).unwrap();
        let x = lu.solve(&b).unwrap();
        let residual = pinned.matvec(&x);
        for i in 0..n {
            assert_relative_eq!(residual[i], b[i], epsilon = 1e-10);
        }
    }
}

#[test]
fn test_rcm_reduces_fill() {
    let pinned = grid_laplacian(6, 5).symmetrized().pinned(0);
    let adjacency = pinned.symmetric_pattern();
    let natural: Vec<usize> = (0..pinned.num_rows).collect();
    let rcm = inflow_solvers::reverse_cuthill_mckee(&adjacency);
    assert!(bandwidth(&adjacency, &rcm) < bandwidth(&adjacency, &natural));

    let lu = SparseLu::factorize(&pinned, &LuConfig::with_rcm()).unwrap();
    assert_eq!(lu.order(), 30);
    assert!(lu.upper_diag().iter().all(|d| d.abs() > 1e-12));
}
