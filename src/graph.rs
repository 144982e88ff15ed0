//! Undirected weighted airport graph.
//!
//! Nodes are station codes; an edge `A – B` carries the summed weight of
//! every directional and monthly contribution between A and B. The graph is
//! simple: no self-loops and at most one edge per unordered pair.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::prep::types::{AggregatedEdge, AirportRecord};

#[derive(Debug, Clone, Default)]
pub struct AirNetwork {
    /// Undirected graph: nodes = station codes, edge weights = summed measure.
    pub graph: UnGraph<String, f64>,
    /// Mapping from station code to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Attributes for nodes that had a record in the node list.
    pub airports: HashMap<String, AirportRecord>,
}

impl AirNetwork {
    /// Builds the graph from a node list and an aggregated edge list.
    ///
    /// Nodes enter the graph only through edges. Self-loops are skipped and
    /// repeated pairs (in either direction) are merged by adding weights.
    #[instrument(skip_all, fields(airports = airports.len(), edges = edges.len()))]
    pub fn build(airports: &[AirportRecord], edges: &[AggregatedEdge]) -> Self {
        let mut network = Self::default();
        for airport in airports {
            network
                .airports
                .entry(airport.code.clone())
                .or_insert_with(|| airport.clone());
        }

        let mut self_loops = 0usize;
        for edge in edges {
            if !network.add_edge(&edge.origin, &edge.destination, edge.weight) {
                self_loops += 1;
            }
        }
        network.airports.retain(|code, _| network.node_map.contains_key(code));

        debug!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            self_loops,
            "Graph built"
        );
        network
    }

    /// Builds a graph from edges alone, with no node attributes.
    pub fn from_edges(edges: &[AggregatedEdge]) -> Self {
        Self::build(&[], edges)
    }

    fn node(&mut self, code: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(code) {
            return idx;
        }
        let idx = self.graph.add_node(code.to_string());
        self.node_map.insert(code.to_string(), idx);
        idx
    }

    /// Adds `weight` to the `a – b` edge, creating it if needed.
    ///
    /// Returns `false` (and changes nothing) for a self-loop.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) -> bool {
        if a == b {
            return false;
        }
        let ia = self.node(a);
        let ib = self.node(b);
        match self.graph.find_edge(ia, ib) {
            Some(e) => self.graph[e] += weight,
            None => {
                self.graph.add_edge(ia, ib, weight);
            }
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Station code of a node.
    pub fn code(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn contains(&self, code: &str) -> bool {
        self.node_map.contains_key(code)
    }

    /// Weight of the edge between two codes, if any.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        let ia = *self.node_map.get(a)?;
        let ib = *self.node_map.get(b)?;
        self.graph.find_edge(ia, ib).map(|e| self.graph[e])
    }

    /// Attributes for `code`, or a bare record if the node list had none.
    pub fn airport(&self, code: &str) -> AirportRecord {
        self.airports
            .get(code)
            .cloned()
            .unwrap_or_else(|| AirportRecord::bare(code))
    }

    /// Edges as (code, code, weight), smaller code first, sorted.
    pub fn edge_list(&self) -> Vec<(String, String, f64)> {
        let mut edges: Vec<(String, String, f64)> = self
            .graph
            .edge_references()
            .map(|e| {
                let a = self.code(e.source());
                let b = self.code(e.target());
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                (a.to_string(), b.to_string(), *e.weight())
            })
            .collect();
        edges.sort_by(|x, y| (&x.0, &x.1).cmp(&(&y.0, &y.1)));
        edges
    }

    /// The subgraph induced by `codes`: same edges and weights, restricted
    /// to the given vertex set. Codes not in the graph are ignored.
    pub fn induced_subgraph(&self, codes: &BTreeSet<String>) -> Self {
        let mut sub = Self::default();
        for code in codes {
            if self.contains(code) {
                sub.node(code);
                if let Some(airport) = self.airports.get(code) {
                    sub.airports.insert(code.clone(), airport.clone());
                }
            }
        }
        for (a, b, w) in self.edge_list() {
            if codes.contains(&a) && codes.contains(&b) {
                sub.add_edge(&a, &b, w);
            }
        }
        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_pairs_merge() {
        let edges = vec![
            AggregatedEdge::new("JFK", "LAX", 100.0),
            AggregatedEdge::new("LAX", "JFK", 50.0),
        ];
        let net = AirNetwork::from_edges(&edges);
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.weight("JFK", "LAX"), Some(150.0));
        assert_eq!(net.weight("LAX", "JFK"), Some(150.0));
    }

    #[test]
    fn test_self_loops_skipped() {
        let edges = vec![
            AggregatedEdge::new("JFK", "JFK", 10.0),
            AggregatedEdge::new("JFK", "LAX", 1.0),
        ];
        let net = AirNetwork::from_edges(&edges);
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.weight("JFK", "JFK"), None);
    }

    #[test]
    fn test_self_loop_only_node_absent() {
        let net = AirNetwork::from_edges(&[AggregatedEdge::new("BOS", "BOS", 1.0)]);
        assert!(net.is_empty());
    }

    #[test]
    fn test_attributes_attached_only_for_graph_nodes() {
        let mut jfk = AirportRecord::bare("JFK");
        jfk.city = "New York".to_string();
        let airports = vec![jfk, AirportRecord::bare("BOS")];
        let net = AirNetwork::build(&airports, &[AggregatedEdge::new("JFK", "LAX", 1.0)]);

        assert_eq!(net.airport("JFK").city, "New York");
        assert_eq!(net.airport("LAX"), AirportRecord::bare("LAX"));
        assert!(!net.contains("BOS"));
        assert!(!net.airports.contains_key("BOS"));
    }

    #[test]
    fn test_induced_subgraph() {
        let edges = vec![
            AggregatedEdge::new("A", "B", 1.0),
            AggregatedEdge::new("B", "C", 2.0),
            AggregatedEdge::new("C", "D", 3.0),
        ];
        let net = AirNetwork::from_edges(&edges);
        let keep: BTreeSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let sub = net.induced_subgraph(&keep);

        assert_eq!(sub.node_count(), 3);
        assert_eq!(
            sub.edge_list(),
            vec![
                ("A".to_string(), "B".to_string(), 1.0),
                ("B".to_string(), "C".to_string(), 2.0)
            ]
        );
    }
}
