use std::collections::HashSet;

use tracing::info;

use crate::prep::types::{AggregatedEdge, AirportRecord};

/// Nodes and edges after referential filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub airports: Vec<AirportRecord>,
    pub edges: Vec<AggregatedEdge>,
    pub monthly: Vec<AggregatedEdge>,
    /// Overall edges dropped because an endpoint has no airport record.
    pub dropped_edges: usize,
}

/// Keeps the airports referenced by at least one edge, first record per code.
pub fn select_airports(airports: &[AirportRecord], edges: &[AggregatedEdge]) -> Vec<AirportRecord> {
    let used: HashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.origin.as_str(), e.destination.as_str()])
        .collect();

    let mut seen = HashSet::new();
    airports
        .iter()
        .filter(|a| used.contains(a.code.as_str()))
        .filter(|a| seen.insert(a.code.as_str()))
        .cloned()
        .collect()
}

/// Drops edges whose origin or destination is not in `airports`.
pub fn retain_resolved(edges: &[AggregatedEdge], airports: &[AirportRecord]) -> Vec<AggregatedEdge> {
    let known: HashSet<&str> = airports.iter().map(|a| a.code.as_str()).collect();
    edges
        .iter()
        .filter(|e| known.contains(e.origin.as_str()) && known.contains(e.destination.as_str()))
        .cloned()
        .collect()
}

/// Runs node selection and then edge filtering against the selected nodes.
///
/// Afterwards every airport is an endpoint of some kept overall edge and
/// every kept edge resolves to a selected airport.
#[tracing::instrument(skip_all)]
pub fn select(
    airports: &[AirportRecord],
    edges: &[AggregatedEdge],
    monthly: &[AggregatedEdge],
) -> Selection {
    let candidates = select_airports(airports, edges);
    let kept_edges = retain_resolved(edges, &candidates);
    let dropped_edges = edges.len() - kept_edges.len();

    // An airport whose only edges pointed at unknown stations is now unreferenced.
    let airports = select_airports(&candidates, &kept_edges);
    let monthly = retain_resolved(monthly, &airports);

    info!(
        airports = airports.len(),
        edges = kept_edges.len(),
        monthly = monthly.len(),
        dropped_edges,
        "Nodes selected"
    );

    Selection {
        airports,
        edges: kept_edges,
        monthly,
        dropped_edges,
    }
}
