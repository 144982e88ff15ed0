//! Raw itinerary and station tables → canonical node and edge lists.
//!
//! Rows are normalized ([`normalize`]), summed per origin/destination
//! ([`aggregate`]), and finally restricted to airports that both exist in the
//! station table and are used by an edge ([`nodes`]).

pub mod aggregate;
pub mod nodes;
pub mod normalize;
pub mod stations;
pub mod types;

use tracing::info;

use crate::config::PipelineConfig;
use crate::parser::{ItineraryTable, StationTable};
use crate::prep::aggregate::{aggregate, select_weight_measure};
use crate::prep::nodes::{Selection, select};
use crate::prep::normalize::{NormalizeStats, normalize_records};
use crate::prep::stations::resolve_stations;
use crate::prep::types::Measure;

/// Output of the preparation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub measure: Option<Measure>,
    /// Row counts from normalization (read, kept, rejected).
    pub rows: NormalizeStats,
    pub selection: Selection,
}

/// Runs the full preparation stage on already-read tables.
#[tracing::instrument(skip_all)]
pub fn prepare(
    itineraries: ItineraryTable,
    stations: StationTable,
    config: &PipelineConfig,
) -> Prepared {
    let measure = select_weight_measure(&itineraries.measures, config.weight_measure);
    let (records, rows) = normalize_records(itineraries.rows);
    let aggregation = aggregate(&records, measure);

    let airports = resolve_stations(stations.rows, config.country.as_deref());
    let selection = select(&airports, &aggregation.overall, &aggregation.monthly);

    info!(
        rows_read = rows.read,
        rows_kept = rows.kept,
        airports = selection.airports.len(),
        edges = selection.edges.len(),
        dropped_edges = selection.dropped_edges,
        "Preparation complete"
    );

    Prepared {
        measure,
        rows,
        selection,
    }
}
