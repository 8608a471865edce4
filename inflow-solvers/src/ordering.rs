//! Bandwidth-reducing node orderings
//!
//! Orderings are expressed as `perm[new] = old`. The adjacency lists passed in
//! must be symmetric and free of self loops, as produced by
//! [`CsrMatrix::symmetric_pattern`](crate::CsrMatrix::symmetric_pattern).

use std::collections::VecDeque;

/// Column ordering applied before factorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrdering {
    /// Keep the input order
    #[default]
    Natural,

    /// Reverse Cuthill-McKee on the pattern of `A + A^T`
    ReverseCuthillMcKee,
}

/// Inverse of a permutation: `inverse[perm[i]] = i`
pub fn invert_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (new, &old) in perm.iter().enumerate() {
        inverse[old] = new;
    }
    inverse
}

/// Bandwidth `max |pos(i) - pos(j)|` over all edges of `adjacency` when node
/// `perm[k]` is placed at position `k`.
pub fn bandwidth(adjacency: &[Vec<usize>], perm: &[usize]) -> usize {
    let position = invert_permutation(perm);
    adjacency
        .iter()
        .enumerate()
        .flat_map(|(i, neighbors)| {
            let position = &position;
            neighbors.iter().map(move |&j| position[i].abs_diff(position[j]))
        })
        .max()
        .unwrap_or(0)
}

/// Breadth-first level structure rooted at `root`, restricted to the
/// component of `root`.
fn level_structure(adjacency: &[Vec<usize>], root: usize) -> Vec<Vec<usize>> {
    let mut seen = vec![false; adjacency.len()];
    let mut levels = vec![vec![root]];
    seen[root] = true;
    loop {
        let mut next = Vec::new();
        if let Some(current) = levels.last() {
            for &node in current {
                for &neighbor in &adjacency[node] {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        next.push(neighbor);
                    }
                }
            }
        }
        if next.is_empty() {
            return levels;
        }
        levels.push(next);
    }
}

/// George-Liu search for a pseudo-peripheral node of the component of `start`.
fn pseudo_peripheral_node(adjacency: &[Vec<usize>], start: usize) -> usize {
    let mut root = start;
    let mut levels = level_structure(adjacency, root);
    loop {
        let Some(last) = levels.last() else {
            return root;
        };
        let candidate = last
            .iter()
            .copied()
            .min_by_key(|&node| (adjacency[node].len(), node))
            .unwrap_or(root);
        let candidate_levels = level_structure(adjacency, candidate);
        if candidate_levels.len() > levels.len() {
            root = candidate;
            levels = candidate_levels;
        } else {
            return root;
        }
    }
}

/// Reverse Cuthill-McKee ordering.
///
/// Each connected component is traversed breadth-first from a
/// pseudo-peripheral node, visiting neighbors by ascending degree (ties by
/// index). Components are started from their lowest-degree unvisited node.
/// The concatenated order is reversed at the end.
pub fn reverse_cuthill_mckee(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut by_degree: Vec<usize> = (0..n).collect();
    by_degree.sort_by_key(|&node| (adjacency[node].len(), node));

    for &seed in &by_degree {
        if visited[seed] {
            continue;
        }
        let root = pseudo_peripheral_node(adjacency, seed);
        let mut queue = VecDeque::from([root]);
        visited[root] = true;

        while let Some(node) = queue.pop_front() {
            order.push(node);
            let mut neighbors: Vec<usize> = adjacency[node]
                .iter()
                .copied()
                .filter(|&m| !visited[m])
                .collect();
            neighbors.sort_by_key(|&m| (adjacency[m].len(), m));
            for m in neighbors {
                visited[m] = true;
                queue.push_back(m);
            }
        }
    }

    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); n];
        for &(a, b) in edges {
            adj[a].push(b);
            adj[b].push(a);
        }
        for list in &mut adj {
            list.sort_unstable();
            list.dedup();
        }
        adj
    }

    fn is_permutation(perm: &[usize], n: usize) -> bool {
        let mut sorted = perm.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_path_graph_scrambled() {
        // Path 0-5-2-7-1-4-6-3 has bandwidth 6 in natural order.
        let path = [0, 5, 2, 7, 1, 4, 6, 3];
        let edges: Vec<_> = path.windows(2).map(|w| (w[0], w[1])).collect();
        let adj = symmetric(8, &edges);
        let natural: Vec<usize> = (0..8).collect();
        assert_eq!(bandwidth(&adj, &natural), 6);

        let perm = reverse_cuthill_mckee(&adj);
        assert!(is_permutation(&perm, 8));
        assert_eq!(bandwidth(&adj, &perm), 1);
    }

    #[test]
    fn test_disconnected_components() {
        let adj = symmetric(6, &[(0, 3), (3, 5), (1, 4)]);
        let perm = reverse_cuthill_mckee(&adj);
        assert!(is_permutation(&perm, 6));
        assert!(bandwidth(&adj, &perm) <= 2);
    }

    #[test]
    fn test_grid_bandwidth_not_worse() {
        // 4x4 grid whose row-major ids are scrambled by a stride.
        let n = 4;
        let id = |i: usize, j: usize| ((i * n + j) * 7) % (n * n);
        let mut edges = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i + 1 < n {
                    edges.push((id(i, j), id(i + 1, j)));
                }
                if j + 1 < n {
                    edges.push((id(i, j), id(i, j + 1)));
                }
            }
        }
        let adj = symmetric(n * n, &edges);
        let natural: Vec<usize> = (0..n * n).collect();
        let perm = reverse_cuthill_mckee(&adj);
        assert!(is_permutation(&perm, n * n));
        assert!(bandwidth(&adj, &perm) <= bandwidth(&adj, &natural));
        assert!(bandwidth(&adj, &perm) <= n + 1);
    }

    #[test]
    fn test_invert_permutation() {
        assert_eq!(invert_permutation(&[2, 0, 1]), vec![1, 2, 0]);
        assert_eq!(bandwidth(&[], &[]), 0);
    }
}
