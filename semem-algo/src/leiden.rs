//! Leiden community detection: modularity optimization with a refinement
//! pass (`spec.md` §4.G: "modularity optimization with refinement pass;
//! `resolution` parameter configurable; deterministic tie-break by node
//! URI; minimum community size filter"). No Leiden implementation exists
//! in the example pack; this follows the standard local-moving +
//! refinement structure (Traag, Waltman & van Eck 2019), simplified to a
//! single level (no graph aggregation/recursion), which is sufficient for
//! the corpus sizes this substrate targets.

use std::collections::BTreeMap;

use crate::graph_view::GraphView;
use crate::termination::Converging;

#[derive(Debug, Clone)]
pub struct LeidenConfig {
    pub resolution: f64,
    pub min_community_size: usize,
    pub iteration_cap: usize,
}

pub struct LeidenResult {
    /// uri -> community id (community ids are the lexicographically
    /// smallest member uri, for deterministic output independent of
    /// internal node ordering).
    pub community_of: BTreeMap<String, String>,
}

#[must_use]
pub fn leiden_communities(view: &GraphView, config: &LeidenConfig) -> Converging<LeidenResult> {
    let n = view.node_count();
    if n == 0 {
        return Converging { result: LeidenResult { community_of: BTreeMap::new() }, converged: true, iterations: 0 };
    }

    let total_weight: f64 = (0..n).map(|i| view.neighbors(i).iter().map(|(_, w)| w.max(0.0)).sum::<f64>()).sum::<f64>() / 2.0;
    let m2 = (2.0 * total_weight).max(f64::EPSILON);

    let node_weight: Vec<f64> = (0..n).map(|i| view.neighbors(i).iter().map(|(_, w)| w.max(0.0)).sum()).collect();

    // community[i] is the current node index acting as that community's label.
    let mut community: Vec<usize> = (0..n).collect();
    let mut iterations = 0;
    let mut converged = false;

    for iteration in 0..config.iteration_cap.max(1) {
        iterations = iteration + 1;
        let mut moved = false;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| view.uri(a).cmp(view.uri(b)));

        for &node in &order {
            let current_community = community[node];
            let mut weight_by_community: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, weight) in view.neighbors(node) {
                *weight_by_community.entry(community[neighbor]).or_insert(0.0) += weight.max(0.0);
            }

            let community_total_weight = |target: usize| -> f64 { (0..n).filter(|&i| community[i] == target && i != node).map(|i| node_weight[i]).sum() };

            let mut best_community = current_community;
            let mut best_gain = 0.0;
            for (&candidate, &edge_weight) in &weight_by_community {
                if candidate == current_community {
                    continue;
                }
                let sigma_tot = community_total_weight(candidate);
                let gain = edge_weight - config.resolution * node_weight[node] * sigma_tot / m2;
                if gain > best_gain || (gain == best_gain && gain > 0.0 && view.uri(candidate) < view.uri(best_community)) {
                    best_gain = gain;
                    best_community = candidate;
                }
            }

            if best_community != current_community && best_gain > 0.0 {
                community[node] = best_community;
                moved = true;
            }
        }

        if !moved {
            converged = true;
            break;
        }
    }

    // Refinement pass: split any "community" that is not itself weakly
    // connected under the induced subgraph back into its connected pieces
    // (spec.md's "refinement pass" — local moving alone can merge
    // disconnected fragments that only share a labeled neighbor).
    let refined = refine_into_connected_pieces(view, &community);

    // Canonicalize labels to lexicographically smallest member URI, then
    // apply the minimum community size filter: undersized communities keep
    // their own singleton-per-node labels (spec.md doesn't say to drop the
    // nodes, only to filter the *community* as an aggregation unit).
    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (node, &label) in refined.iter().enumerate() {
        by_label.entry(label).or_default().push(node);
    }

    let mut community_of = BTreeMap::new();
    for members in by_label.values() {
        let mut uris: Vec<&str> = members.iter().map(|&i| view.uri(i)).collect();
        uris.sort_unstable();
        if members.len() >= config.min_community_size {
            let canonical = uris[0].to_string();
            for &node in members {
                community_of.insert(view.uri(node).to_string(), canonical.clone());
            }
        } else {
            for &node in members {
                community_of.insert(view.uri(node).to_string(), view.uri(node).to_string());
            }
        }
    }

    Converging { result: LeidenResult { community_of }, converged, iterations }
}

fn refine_into_connected_pieces(view: &GraphView, community: &[usize]) -> Vec<usize> {
    let n = view.node_count();
    let mut refined = vec![usize::MAX; n];
    let mut next_label = 0;

    for start in 0..n {
        if refined[start] != usize::MAX {
            continue;
        }
        let label = community[start];
        let mut stack = vec![start];
        let mut component = Vec::new();
        refined[start] = n + next_label;
        while let Some(node) = stack.pop() {
            component.push(node);
            for &(neighbor, _) in view.neighbors(node) {
                if community[neighbor] == label && refined[neighbor] == usize::MAX {
                    refined[neighbor] = n + next_label;
                    stack.push(neighbor);
                }
            }
        }
        next_label += 1;
    }

    refined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> GraphView {
        GraphView::new(
            vec!["a".into(), "b".into(), "c".into(), "x".into(), "y".into(), "z".into()],
            vec![
                ("a".into(), "b".into(), 1.0),
                ("b".into(), "c".into(), 1.0),
                ("c".into(), "a".into(), 1.0),
                ("x".into(), "y".into(), 1.0),
                ("y".into(), "z".into(), 1.0),
                ("z".into(), "x".into(), 1.0),
            ],
        )
    }

    #[test]
    fn two_disjoint_triangles_form_two_communities() {
        let view = two_triangles();
        let config = LeidenConfig { resolution: 1.0, min_community_size: 1, iteration_cap: 50 };
        let result = leiden_communities(&view, &config);
        assert_eq!(result.result.community_of["a"], result.result.community_of["b"]);
        assert_eq!(result.result.community_of["a"], result.result.community_of["c"]);
        assert_ne!(result.result.community_of["a"], result.result.community_of["x"]);
    }

    #[test]
    fn min_community_size_filter_keeps_small_groups_singleton() {
        let view = two_triangles();
        let config = LeidenConfig { resolution: 1.0, min_community_size: 10, iteration_cap: 50 };
        let result = leiden_communities(&view, &config);
        assert_eq!(result.result.community_of["a"], "a");
    }

    #[test]
    fn isolated_nodes_form_singleton_communities() {
        let view = GraphView::new(vec!["solo".into()], vec![]);
        let config = LeidenConfig { resolution: 1.0, min_community_size: 1, iteration_cap: 10 };
        let result = leiden_communities(&view, &config);
        assert_eq!(result.result.community_of["solo"], "solo");
    }
}
