//! Connected components by breadth-first search.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::visit::NodeIndexable;
use tracing::instrument;

use crate::analyzers::types::ComponentReport;
use crate::graph::AirNetwork;

/// Partitions the graph into maximal connected node sets.
///
/// Components are ordered by size, largest first; equal sizes keep their
/// discovery order (by lowest node index), so the result is stable for a
/// fixed graph. The giant component is the first one, returned as an
/// induced subgraph. An empty graph yields no components and no giant.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn connected_components(network: &AirNetwork) -> ComponentReport {
    let g = &network.graph;
    let n = g.node_count();

    let mut visited = vec![false; n];
    let mut components: Vec<BTreeSet<String>> = Vec::new();

    for start in g.node_indices() {
        if visited[g.to_index(start)] {
            continue;
        }
        visited[g.to_index(start)] = true;

        let mut members = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            members.insert(network.code(v).to_string());
            for w in g.neighbors(v) {
                let wi = g.to_index(w);
                if !visited[wi] {
                    visited[wi] = true;
                    queue.push_back(w);
                }
            }
        }
        components.push(members);
    }

    // Stable sort keeps discovery order among equal sizes.
    components.sort_by(|a, b| b.len().cmp(&a.len()));

    let sizes: Vec<usize> = components.iter().map(BTreeSet::len).collect();
    let membership: BTreeMap<String, usize> = components
        .iter()
        .enumerate()
        .flat_map(|(id, members)| members.iter().map(move |code| (code.clone(), id)))
        .collect();
    let giant = components
        .first()
        .map(|members| network.induced_subgraph(members));

    ComponentReport {
        components,
        sizes,
        membership,
        giant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prep::types::AggregatedEdge;
    use proptest::prelude::*;

    fn network(edges: &[(&str, &str)]) -> AirNetwork {
        let edges: Vec<AggregatedEdge> = edges
            .iter()
            .map(|(a, b)| AggregatedEdge::new(a, b, 1.0))
            .collect();
        AirNetwork::from_edges(&edges)
    }

    #[test]
    fn test_two_disjoint_triangles() {
        let net = network(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("D", "E"),
            ("E", "F"),
            ("F", "D"),
        ]);
        let report = connected_components(&net);

        assert_eq!(report.sizes, vec![3, 3]);
        assert_eq!(report.components.len(), 2);
        let giant = report.giant.unwrap();
        assert_eq!(giant.node_count(), 3);
        assert_eq!(giant.edge_count(), 3);
        assert!(giant.contains("A"));
    }

    #[test]
    fn test_giant_is_largest() {
        let net = network(&[("X", "Y"), ("A", "B"), ("B", "C"), ("C", "D")]);
        let report = connected_components(&net);

        assert_eq!(report.sizes, vec![4, 2]);
        let giant = report.giant.unwrap();
        assert_eq!(giant.node_count(), 4);
        assert_eq!(giant.weight("B", "C"), Some(1.0));
        assert!(!giant.contains("X"));
        assert_eq!(report.membership["X"], 1);
        assert_eq!(report.membership["D"], 0);
    }

    #[test]
    fn test_empty_graph() {
        let report = connected_components(&AirNetwork::default());
        assert!(report.components.is_empty());
        assert!(report.sizes.is_empty());
        assert!(report.giant.is_none());
    }

    proptest! {
        #[test]
        fn prop_components_partition_nodes(
            edges in prop::collection::vec((0u8..12, 0u8..12), 0..30),
        ) {
            let edges: Vec<AggregatedEdge> = edges
                .iter()
                .map(|(a, b)| AggregatedEdge::new(&format!("N{a}"), &format!("N{b}"), 1.0))
                .collect();
            let net = AirNetwork::from_edges(&edges);
            let report = connected_components(&net);

            prop_assert_eq!(report.sizes.iter().sum::<usize>(), net.node_count());
            let mut all = BTreeSet::new();
            for component in &report.components {
                for code in component {
                    prop_assert!(all.insert(code.clone()), "{} in two components", code);
                }
            }
            prop_assert_eq!(all.len(), net.node_count());
            prop_assert!(report.sizes.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
