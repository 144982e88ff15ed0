//! Result types produced by the analyzers and the report builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::AirNetwork;

/// Connected components of a graph.
#[derive(Debug, Clone)]
pub struct ComponentReport {
    /// Node codes per component, largest component first.
    pub components: Vec<BTreeSet<String>>,
    /// Component sizes, descending.
    pub sizes: Vec<usize>,
    /// Station code → index into `components`.
    pub membership: BTreeMap<String, usize>,
    /// Largest component as an induced subgraph; `None` for an empty graph.
    pub giant: Option<AirNetwork>,
}

/// Per-node centrality scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityScores {
    pub degree: BTreeMap<String, usize>,
    pub betweenness: BTreeMap<String, f64>,
    pub closeness: BTreeMap<String, f64>,
}

/// Descriptive statistics for a set of per-node values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// One bucket of a value distribution, `[lower, upper)` (last bucket closed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// A node and its score in a top-k ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNode {
    pub code: String,
    pub score: f64,
}

/// Number of nodes having each degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeCount {
    pub degree: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub count: usize,
    pub largest: usize,
    pub smallest: usize,
    pub top_sizes: Vec<usize>,
    pub giant_nodes: usize,
    pub giant_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringSummary {
    pub average: f64,
    pub stats: Summary,
    pub distribution: Vec<DistributionBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralitySummary {
    pub degree: Summary,
    pub betweenness: Summary,
    pub closeness: Summary,
    pub top_degree: Vec<RankedNode>,
    pub top_betweenness: Vec<RankedNode>,
    pub top_closeness: Vec<RankedNode>,
    pub degree_distribution: Vec<DegreeCount>,
}

/// Run-level report, written as `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub generated_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
    pub total_weight: f64,
    pub components: ComponentSummary,
    pub clustering: ClusteringSummary,
    pub centrality: CentralitySummary,
}
