//! Connected components via union-find over the unweighted projection
//! (`spec.md` §4.G). Grounded on
//! `samyama-graph-algorithms::community::{UnionFind, weakly_connected_components}`,
//! adapted to [`crate::graph_view::GraphView`]'s single consistent
//! adjacency representation and to return URI-keyed groups rather than the
//! teacher's numeric `NodeId`.

use std::collections::BTreeMap;

use crate::graph_view::GraphView;

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect(), rank: vec![0; size] }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return;
        }
        match self.rank[root_i].cmp(&self.rank[root_j]) {
            std::cmp::Ordering::Less => self.parent[root_i] = root_j,
            std::cmp::Ordering::Greater => self.parent[root_j] = root_i,
            std::cmp::Ordering::Equal => {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// `component_of[uri]` → deterministic component id (the lexicographically
/// smallest member URI), and `members[component_id]` → sorted member URIs.
pub struct Components {
    pub component_of: BTreeMap<String, String>,
    pub members: BTreeMap<String, Vec<String>>,
}

#[must_use]
pub fn connected_components(view: &GraphView) -> Components {
    let n = view.node_count();
    let mut uf = UnionFind::new(n);

    for u in 0..n {
        for &(v, _) in view.neighbors(u) {
            uf.union(u, v);
        }
    }

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        members.entry(uf.find(i)).or_default().push(i);
    }

    let mut component_of = BTreeMap::new();
    let mut named_members = BTreeMap::new();
    for indices in members.into_values() {
        let mut uris: Vec<String> = indices.iter().map(|&i| view.uri(i).to_string()).collect();
        uris.sort();
        let component_id = uris[0].clone();
        for uri in &uris {
            component_of.insert(uri.clone(), component_id.clone());
        }
        named_members.insert(component_id, uris);
    }

    Components { component_of, members: named_members }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_disjoint_edges_form_two_components() {
        let view = GraphView::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![("a".into(), "b".into(), 1.0), ("c".into(), "d".into(), 1.0)],
        );
        let result = connected_components(&view);
        assert_eq!(result.members.len(), 2);
        assert_eq!(result.component_of["a"], result.component_of["b"]);
        assert_ne!(result.component_of["a"], result.component_of["c"]);
    }

    #[test]
    fn isolated_node_is_its_own_component() {
        let view = GraphView::new(vec!["a".into()], vec![]);
        let result = connected_components(&view);
        assert_eq!(result.members.len(), 1);
        assert_eq!(result.component_of["a"], "a");
    }
}
