//! Concept Graph (`spec.md` §3: "weighted undirected multigraph over
//! concept tokens... edges accumulate co-occurrence weight each time two
//! concepts appear in the same interaction") and spreading activation
//! retrieval (`spec.md` §4.F step 3).

use std::collections::HashMap;

use parking_lot::RwLock;

/// Weighted undirected graph over concept tokens, rebuilt deterministically
/// from the Memory Store's Interactions (`spec.md` §3: "owned by the
/// Memory Store and rebuilt deterministically from Interactions").
#[derive(Default)]
pub struct ConceptGraph {
    node_weight: RwLock<HashMap<String, f64>>,
    edges: RwLock<HashMap<String, HashMap<String, f64>>>,
}

impl ConceptGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one interaction's concepts: bump each concept's node weight,
    /// and increment the co-occurrence weight of every pair present
    /// together (`spec.md` §4.F step 3).
    pub fn add_interaction(&self, concepts: &[String]) {
        let mut nodes = self.node_weight.write();
        for concept in concepts {
            *nodes.entry(concept.clone()).or_insert(0.0) += 1.0;
        }
        drop(nodes);

        let mut edges = self.edges.write();
        for i in 0..concepts.len() {
            for j in (i + 1)..concepts.len() {
                let (a, b) = (&concepts[i], &concepts[j]);
                if a == b {
                    continue;
                }
                *edges.entry(a.clone()).or_default().entry(b.clone()).or_insert(0.0) += 1.0;
                *edges.entry(b.clone()).or_default().entry(a.clone()).or_insert(0.0) += 1.0;
            }
        }
    }

    /// Depth-limited BFS from `seeds` with geometric decay `hop_decay` per
    /// hop, edge-weight-proportioned at each step. Returns the accumulated
    /// activation of every concept reached, including the seeds themselves
    /// (seeded at `1.0`).
    #[must_use]
    pub fn spreading_activation(&self, seeds: &[String], depth: usize, hop_decay: f64) -> HashMap<String, f64> {
        let edges = self.edges.read();
        let mut activation: HashMap<String, f64> = HashMap::new();
        let mut frontier: HashMap<String, f64> = HashMap::new();
        for seed in seeds {
            activation.insert(seed.clone(), 1.0);
            frontier.insert(seed.clone(), 1.0);
        }

        for _ in 0..depth {
            let mut next: HashMap<String, f64> = HashMap::new();
            for (node, act) in &frontier {
                let Some(neighbors) = edges.get(node) else { continue };
                let total_weight: f64 = neighbors.values().sum();
                if total_weight <= 0.0 {
                    continue;
                }
                for (neighbor, weight) in neighbors {
                    let contribution = act * hop_decay * (weight / total_weight);
                    *next.entry(neighbor.clone()).or_insert(0.0) += contribution;
                    *activation.entry(neighbor.clone()).or_insert(0.0) += contribution;
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        activation
    }

    /// Sum of `activation` over `concepts`, the per-candidate `conceptScore`
    /// term in `spec.md` §4.F step 4.
    #[must_use]
    pub fn concept_score(activation: &HashMap<String, f64>, concepts: &[String]) -> f64 {
        concepts.iter().filter_map(|c| activation.get(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_interaction_accumulates_cooccurrence_weight() {
        let graph = ConceptGraph::new();
        graph.add_interaction(&["rust".to_string(), "cargo".to_string()]);
        graph.add_interaction(&["rust".to_string(), "cargo".to_string()]);
        let edges = graph.edges.read();
        assert_eq!(edges["rust"]["cargo"], 2.0);
        assert_eq!(edges["cargo"]["rust"], 2.0);
    }

    #[test]
    fn spreading_activation_includes_seed_at_full_strength() {
        let graph = ConceptGraph::new();
        graph.add_interaction(&["rust".to_string(), "cargo".to_string()]);
        let activation = graph.spreading_activation(&["rust".to_string()], 2, 0.5);
        assert_eq!(activation["rust"], 1.0);
        assert!(activation["cargo"] > 0.0);
    }

    #[test]
    fn spreading_activation_decays_with_hops() {
        let graph = ConceptGraph::new();
        graph.add_interaction(&["a".to_string(), "b".to_string()]);
        graph.add_interaction(&["b".to_string(), "c".to_string()]);
        let activation = graph.spreading_activation(&["a".to_string()], 2, 0.5);
        assert!(activation["b"] > activation.get("c").copied().unwrap_or(0.0));
    }

    #[test]
    fn spreading_activation_respects_depth_cap() {
        let graph = ConceptGraph::new();
        graph.add_interaction(&["a".to_string(), "b".to_string()]);
        graph.add_interaction(&["b".to_string(), "c".to_string()]);
        graph.add_interaction(&["c".to_string(), "d".to_string()]);
        let activation = graph.spreading_activation(&["a".to_string()], 1, 0.5);
        assert!(!activation.contains_key("c"));
    }

    #[test]
    fn concept_score_sums_activation_over_candidate_concepts() {
        let mut activation = HashMap::new();
        activation.insert("rust".to_string(), 0.5);
        activation.insert("cargo".to_string(), 0.25);
        let score = ConceptGraph::concept_score(&activation, &["rust".to_string(), "cargo".to_string(), "unknown".to_string()]);
        assert!((score - 0.75).abs() < 1e-9);
    }
}
