//! Degree, betweenness and closeness centrality.
//!
//! Path-based scores use hop counts and ignore edge weights. Betweenness
//! repeats a single-source pass for every node: a BFS counts how many
//! shortest paths reach each node, then nodes are unwound from farthest to
//! nearest, handing each predecessor its share of the paths that continue
//! through it. Running time is O(V * E).
//!
//! Closeness is the reciprocal of the mean distance to the nodes a node can
//! reach, multiplied by the share of the graph it reaches, so nodes in small
//! components score lower instead of failing.
//!
//! Both traversals walk nodes and neighbors in station-code order, so the
//! scores are bit-for-bit identical however the graph was assembled.

use std::collections::{BTreeMap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::NodeIndexable;
use tracing::instrument;

use crate::graph::AirNetwork;

/// Graph view keyed by station-code rank. Node `i` has the i-th smallest
/// code and every neighbor list is sorted.
struct CodeOrder<'a> {
    codes: Vec<&'a str>,
    adjacency: Vec<Vec<usize>>,
}

impl<'a> CodeOrder<'a> {
    fn new(network: &'a AirNetwork) -> Self {
        let g = &network.graph;
        let mut order: Vec<NodeIndex> = g.node_indices().collect();
        order.sort_by(|a, b| network.code(*a).cmp(network.code(*b)));

        let mut rank = vec![0usize; g.node_count()];
        for (r, &v) in order.iter().enumerate() {
            rank[g.to_index(v)] = r;
        }

        let adjacency = order
            .iter()
            .map(|&v| {
                let mut next: Vec<usize> = g.neighbors(v).map(|w| rank[g.to_index(w)]).collect();
                next.sort_unstable();
                next
            })
            .collect();

        Self {
            codes: order.iter().map(|&v| network.code(v)).collect(),
            adjacency,
        }
    }

    fn len(&self) -> usize {
        self.codes.len()
    }

    fn into_scores(self, values: Vec<f64>) -> BTreeMap<String, f64> {
        self.codes
            .into_iter()
            .zip(values)
            .map(|(code, v)| (code.to_string(), v))
            .collect()
    }
}

/// Number of edges incident to each node.
#[must_use]
pub fn degree_centrality(network: &AirNetwork) -> BTreeMap<String, usize> {
    let g = &network.graph;
    g.node_indices()
        .map(|v| (network.code(v).to_string(), g.neighbors(v).count()))
        .collect()
}

/// Normalized betweenness centrality for every node.
///
/// Summing over every source sees each unordered pair twice, so the total
/// is divided by `(n-1)(n-2)`; per pair that is the usual `2 / ((n-1)(n-2))`.
/// With two or fewer nodes nothing can lie between two others and every
/// score is 0.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn betweenness_centrality(network: &AirNetwork) -> BTreeMap<String, f64> {
    let view = CodeOrder::new(network);
    let n = view.len();
    let mut totals = vec![0.0f64; n];

    for source in 0..n {
        let mut hops: Vec<Option<u32>> = vec![None; n];
        let mut paths = vec![0.0f64; n];
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut visited: Vec<usize> = Vec::with_capacity(n);

        hops[source] = Some(0);
        paths[source] = 1.0;
        let mut frontier = VecDeque::from([source]);

        while let Some(v) = frontier.pop_front() {
            visited.push(v);
            let next_hop = hops[v].map_or(0, |h| h + 1);
            for &w in &view.adjacency[v] {
                if hops[w].is_none() {
                    hops[w] = Some(next_hop);
                    frontier.push_back(w);
                }
                if hops[w] == Some(next_hop) {
                    paths[w] += paths[v];
                    parents[w].push(v);
                }
            }
        }

        // Farthest first: a node's dependency is complete before its parents read it.
        let mut dependency = vec![0.0f64; n];
        for &w in visited.iter().rev() {
            let through_w = 1.0 + dependency[w];
            for &v in &parents[w] {
                dependency[v] += paths[v] / paths[w] * through_w;
            }
            if w != source {
                totals[w] += dependency[w];
            }
        }
    }

    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };
    let scores = totals.into_iter().map(|t| t * scale).collect();
    view.into_scores(scores)
}

/// Hop distances from `source` to every node it reaches.
fn hop_distances(view: &CodeOrder<'_>, source: usize) -> Vec<Option<u32>> {
    let mut hops = vec![None; view.len()];
    hops[source] = Some(0u32);

    let mut frontier = VecDeque::from([source]);
    while let Some(v) = frontier.pop_front() {
        let next_hop = hops[v].map_or(0, |h| h + 1);
        for &w in &view.adjacency[v] {
            if hops[w].is_none() {
                hops[w] = Some(next_hop);
                frontier.push_back(w);
            }
        }
    }
    hops
}

/// Closeness centrality with the Wasserman–Faust reachability adjustment.
///
/// For a node reaching `r - 1` others at total distance `D`:
/// `closeness = ((r - 1) / D) * ((r - 1) / (n - 1))`. Isolated nodes score 0.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn closeness_centrality(network: &AirNetwork) -> BTreeMap<String, f64> {
    let view = CodeOrder::new(network);
    let n = view.len();

    let scores = (0..n)
        .map(|v| {
            let hops = hop_distances(&view, v);
            let (reached, total) = hops
                .iter()
                .flatten()
                .filter(|&&h| h > 0)
                .fold((0u64, 0u64), |(r, t), &h| (r + 1, t + u64::from(h)));

            if total > 0 && n > 1 {
                let others = reached as f64;
                (others / total as f64) * (others / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect();
    view.into_scores(scores)
}
