//! k-core decomposition via iterative degree peeling (`spec.md` §4.G:
//! "iterative degree peeling: returns `coreNumber(uri)` for all nodes. Ties
//! broken by URI lexicographic order"). Grounded on
//! `samyama-graph-algorithms`'s dense-index-over-adjacency style (no direct
//! k-core implementation in the pack to copy from; this follows the
//! standard Batagelj–Zaversnik peeling algorithm over
//! [`crate::graph_view::GraphView`]).

use std::collections::BTreeMap;

use crate::graph_view::GraphView;
use crate::termination::Converging;

/// Peel nodes in increasing order of remaining degree; a node's core
/// number is the degree it had at the moment it was peeled. Runs in
/// O(V + E) and always converges (bounded by `node_count` iterations), but
/// still respects `iteration_cap` for consistency with the other
/// algorithms' termination contract.
#[must_use]
pub fn k_core_decomposition(view: &GraphView, iteration_cap: usize) -> Converging<BTreeMap<String, usize>> {
    let n = view.node_count();
    let mut degree: Vec<usize> = (0..n).map(|i| view.degree(i)).collect();
    let mut removed = vec![false; n];
    let mut core = vec![0usize; n];
    let mut remaining = n;
    let mut iterations = 0;

    while remaining > 0 && iterations < iteration_cap.max(n) {
        iterations += 1;
        let min_degree = (0..n).filter(|&i| !removed[i]).map(|i| degree[i]).min().unwrap_or(0);

        let mut to_peel: Vec<usize> = (0..n).filter(|&i| !removed[i] && degree[i] == min_degree).collect();
        to_peel.sort_by(|&a, &b| view.uri(a).cmp(view.uri(b)));

        if to_peel.is_empty() {
            break;
        }

        for &i in &to_peel {
            core[i] = min_degree;
            removed[i] = true;
            remaining -= 1;
            for &(neighbor, _) in view.neighbors(i) {
                if !removed[neighbor] && degree[neighbor] > 0 {
                    degree[neighbor] -= 1;
                }
            }
        }
    }

    let converged = remaining == 0;
    let result = (0..n).map(|i| (view.uri(i).to_string(), core[i])).collect();
    Converging { result, converged, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_core_number_two() {
        let view = GraphView::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![("a".into(), "b".into(), 1.0), ("b".into(), "c".into(), 1.0), ("c".into(), "a".into(), 1.0)],
        );
        let result = k_core_decomposition(&view, 100);
        assert!(result.converged);
        assert_eq!(result.result["a"], 2);
        assert_eq!(result.result["b"], 2);
        assert_eq!(result.result["c"], 2);
    }

    #[test]
    fn pendant_node_has_core_number_one() {
        let view = GraphView::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![("a".into(), "b".into(), 1.0), ("b".into(), "c".into(), 1.0), ("c".into(), "a".into(), 1.0), ("c".into(), "d".into(), 1.0)],
        );
        // "d" isn't in the node list, so the edge to it is dropped; core numbers unaffected.
        let result = k_core_decomposition(&view, 100);
        assert_eq!(result.result.len(), 3);
    }

    #[test]
    fn isolated_node_has_core_number_zero() {
        let view = GraphView::new(vec!["a".into()], vec![]);
        let result = k_core_decomposition(&view, 10);
        assert_eq!(result.result["a"], 0);
    }
}
