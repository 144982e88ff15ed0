use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::analyzers::centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality,
};
use crate::analyzers::clustering::{average_clustering, clustering_coefficients};
use crate::analyzers::components::connected_components;
use crate::analyzers::types::{
    CentralityScores, CentralitySummary, ClusteringSummary, ComponentReport, ComponentSummary,
    NetworkReport,
};
use crate::analyzers::utility::{degree_distribution, histogram, summarize, top_k};
use crate::config::PipelineConfig;
use crate::graph::AirNetwork;

/// Everything computed for one graph.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub components: ComponentReport,
    pub clustering: BTreeMap<String, f64>,
    pub centrality: CentralityScores,
    pub report: NetworkReport,
}

/// Runs every analyzer against `network` and summarizes the results.
///
/// The analyzers only read the graph; each produces its own mapping.
#[tracing::instrument(skip_all, fields(nodes = network.node_count(), edges = network.edge_count()))]
pub fn analyze(network: &AirNetwork, config: &PipelineConfig) -> Analysis {
    let components = connected_components(network);
    info!(
        components = components.sizes.len(),
        largest = components.sizes.first().copied().unwrap_or(0),
        smallest = components.sizes.last().copied().unwrap_or(0),
        "Components computed"
    );

    let clustering = clustering_coefficients(network);
    info!(average = average_clustering(&clustering), "Clustering computed");

    let centrality = CentralityScores {
        degree: degree_centrality(network),
        betweenness: betweenness_centrality(network),
        closeness: closeness_centrality(network),
    };
    info!("Centrality computed");

    let report = build_report(network, &components, &clustering, &centrality, config);

    Analysis {
        components,
        clustering,
        centrality,
        report,
    }
}

fn component_summary(components: &ComponentReport, top: usize) -> ComponentSummary {
    ComponentSummary {
        count: components.sizes.len(),
        largest: components.sizes.first().copied().unwrap_or(0),
        smallest: components.sizes.last().copied().unwrap_or(0),
        top_sizes: components.sizes.iter().take(top).copied().collect(),
        giant_nodes: components.giant.as_ref().map_or(0, AirNetwork::node_count),
        giant_edges: components.giant.as_ref().map_or(0, AirNetwork::edge_count),
    }
}

fn clustering_summary(clustering: &BTreeMap<String, f64>, bins: usize) -> ClusteringSummary {
    let values: Vec<f64> = clustering.values().copied().collect();
    ClusteringSummary {
        average: average_clustering(clustering),
        stats: summarize(values.iter().copied()),
        distribution: histogram(&values, 0.0, 1.0, bins),
    }
}

fn centrality_summary(scores: &CentralityScores, k: usize) -> CentralitySummary {
    let degree_scores = || scores.degree.iter().map(|(c, &d)| (c.clone(), d as f64));
    let cloned = |m: &BTreeMap<String, f64>| {
        m.iter()
            .map(|(c, &v)| (c.clone(), v))
            .collect::<Vec<_>>()
    };

    CentralitySummary {
        degree: summarize(degree_scores().map(|(_, d)| d)),
        betweenness: summarize(scores.betweenness.values().copied()),
        closeness: summarize(scores.closeness.values().copied()),
        top_degree: top_k(degree_scores(), k),
        top_betweenness: top_k(cloned(&scores.betweenness), k),
        top_closeness: top_k(cloned(&scores.closeness), k),
        degree_distribution: degree_distribution(&scores.degree),
    }
}

/// Assembles the run-level report from already computed results.
pub fn build_report(
    network: &AirNetwork,
    components: &ComponentReport,
    clustering: &BTreeMap<String, f64>,
    centrality: &CentralityScores,
    config: &PipelineConfig,
) -> NetworkReport {
    NetworkReport {
        generated_at: Utc::now(),
        node_count: network.node_count(),
        edge_count: network.edge_count(),
        total_weight: network.edge_list().iter().map(|(_, _, w)| w).sum(),
        components: component_summary(components, config.top_component_sizes),
        clustering: clustering_summary(clustering, config.distribution_bins),
        centrality: centrality_summary(centrality, config.top_k),
    }
}
