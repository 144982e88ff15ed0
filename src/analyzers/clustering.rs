//! Local clustering coefficients by triangle counting.

use std::collections::{BTreeMap, HashSet};

use petgraph::visit::NodeIndexable;
use tracing::instrument;

use crate::graph::AirNetwork;

/// Fraction of each node's neighbor pairs that are themselves connected.
///
/// For a node with degree `d`, the coefficient is
/// `(edges among neighbors) / (d choose 2)`, and 0 when `d < 2`. Every node
/// in the graph gets an entry.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn clustering_coefficients(network: &AirNetwork) -> BTreeMap<String, f64> {
    let g = &network.graph;

    let neighbors: Vec<HashSet<usize>> = g
        .node_indices()
        .map(|v| g.neighbors(v).map(|w| g.to_index(w)).collect())
        .collect();

    let mut result = BTreeMap::new();
    for v in g.node_indices() {
        let vi = g.to_index(v);
        let nv = &neighbors[vi];
        let d = nv.len();

        let coefficient = if d < 2 {
            0.0
        } else {
            // Each neighbor-neighbor edge is seen from both ends.
            let links: usize = nv
                .iter()
                .map(|&u| neighbors[u].iter().filter(|&w| nv.contains(w)).count())
                .sum();
            let triangles = links / 2;
            (2 * triangles) as f64 / (d * (d - 1)) as f64
        };
        result.insert(network.code(v).to_string(), coefficient);
    }

    result
}

/// Mean of all local coefficients; 0 for an empty graph.
pub fn average_clustering(coefficients: &BTreeMap<String, f64>) -> f64 {
    if coefficients.is_empty() {
        return 0.0;
    }
    coefficients.values().sum::<f64>() / coefficients.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prep::types::AggregatedEdge;

    fn network(edges: &[(&str, &str)]) -> AirNetwork {
        let edges: Vec<AggregatedEdge> = edges
            .iter()
            .map(|(a, b)| AggregatedEdge::new(a, b, 1.0))
            .collect();
        AirNetwork::from_edges(&edges)
    }

    #[test]
    fn test_star_has_no_triangles() {
        let net = network(&[("C", "A"), ("C", "B"), ("C", "D")]);
        let cc = clustering_coefficients(&net);
        assert_eq!(cc.len(), 4);
        assert!(cc.values().all(|&c| c == 0.0));
    }

    #[test]
    fn test_disjoint_triangles_all_one() {
        let net = network(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("D", "E"),
            ("E", "F"),
            ("F", "D"),
        ]);
        let cc = clustering_coefficients(&net);
        assert_eq!(cc.len(), 6);
        assert!(cc.values().all(|&c| c == 1.0));
        assert_eq!(average_clustering(&cc), 1.0);
    }

    #[test]
    fn test_partial_clustering() {
        // A sees B, C, D; only B–C closes a triangle: 1 of 3 pairs.
        let net = network(&[("A", "B"), ("A", "C"), ("A", "D"), ("B", "C")]);
        let cc = clustering_coefficients(&net);
        assert!((cc["A"] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(cc["B"], 1.0);
        assert_eq!(cc["D"], 0.0);
        assert!(cc.values().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_empty_graph() {
        let cc = clustering_coefficients(&AirNetwork::default());
        assert!(cc.is_empty());
        assert_eq!(average_clustering(&cc), 0.0);
    }
}
