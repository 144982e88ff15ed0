use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::prep::types::{AggregatedEdge, CleanRecord, Measure};

/// Monthly and overall edge lists produced from one record stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Measure the weights were summed from; `None` means connection counts.
    pub measure: Option<Measure>,
    /// One edge per (origin, destination, month), sorted by key.
    pub monthly: Vec<AggregatedEdge>,
    /// One edge per directed (origin, destination), sorted by key.
    pub overall: Vec<AggregatedEdge>,
}

/// Picks the weight column: `preferred` if the table has it, else the first
/// available one in [`Measure::PRIORITY`].
pub fn select_weight_measure(available: &[Measure], preferred: Option<Measure>) -> Option<Measure> {
    if let Some(measure) = preferred {
        if available.contains(&measure) {
            return Some(measure);
        }
        warn!(%measure, "Configured weight measure not in table, using priority order");
    }
    Measure::PRIORITY
        .into_iter()
        .find(|m| available.contains(m))
}

/// Sums contributions in sorted order so the result does not depend on
/// the order rows arrived in.
fn stable_sum(mut parts: Vec<f64>) -> f64 {
    parts.sort_by(f64::total_cmp);
    parts.into_iter().sum()
}

type MonthKey = (String, String, Option<String>);

/// Groups records by (origin, destination, month) and then by
/// (origin, destination), summing `measure` (or 1.0 per record).
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: &[CleanRecord], measure: Option<Measure>) -> Aggregation {
    let mut by_month: BTreeMap<MonthKey, Vec<f64>> = BTreeMap::new();

    for record in records {
        let weight = match measure {
            Some(m) => record.measure(m).unwrap_or(0.0),
            None => 1.0,
        };
        by_month
            .entry((
                record.origin.to_string(),
                record.destination.to_string(),
                record.month.clone(),
            ))
            .or_default()
            .push(weight);
    }

    let monthly: Vec<AggregatedEdge> = by_month
        .into_iter()
        .map(|((origin, destination, month), parts)| AggregatedEdge {
            origin,
            destination,
            month,
            weight: stable_sum(parts),
        })
        .collect();

    let mut by_pair: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for edge in &monthly {
        by_pair
            .entry((edge.origin.clone(), edge.destination.clone()))
            .or_default()
            .push(edge.weight);
    }

    let overall: Vec<AggregatedEdge> = by_pair
        .into_iter()
        .map(|((origin, destination), parts)| AggregatedEdge {
            origin,
            destination,
            month: None,
            weight: stable_sum(parts),
        })
        .collect();

    info!(
        measure = measure.map(Measure::column).unwrap_or("count"),
        monthly = monthly.len(),
        overall = overall.len(),
        "Edges aggregated"
    );

    Aggregation {
        measure,
        monthly,
        overall,
    }
}

/// Collapses reversed pairs into one row per unordered pair. The smaller
/// code becomes the origin; self-loops are dropped.
pub fn undirected(edges: &[AggregatedEdge]) -> Vec<AggregatedEdge> {
    let mut by_pair: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for edge in edges {
        if edge.origin == edge.destination {
            continue;
        }
        let key = if edge.origin <= edge.destination {
            (edge.origin.clone(), edge.destination.clone())
        } else {
            (edge.destination.clone(), edge.origin.clone())
        };
        by_pair.entry(key).or_default().push(edge.weight);
    }

    by_pair
        .into_iter()
        .map(|((origin, destination), parts)| AggregatedEdge {
            origin,
            destination,
            month: None,
            weight: stable_sum(parts),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prep::normalize::normalize_record;
    use crate::prep::types::RawRecord;
    use proptest::prelude::*;

    fn record(origin: &str, destination: &str, month: Option<&str>, passengers: f64) -> CleanRecord {
        normalize_record(RawRecord {
            origin: origin.to_string(),
            destination: destination.to_string(),
            month: month.map(str::to_string),
            measures: vec![(Measure::Passengers, passengers.to_string())],
        })
        .unwrap()
    }

    fn weight_of(edges: &[AggregatedEdge], origin: &str, destination: &str) -> Option<f64> {
        edges
            .iter()
            .find(|e| e.origin == origin && e.destination == destination)
            .map(|e| e.weight)
    }

    #[test]
    fn test_select_weight_measure_priority() {
        assert_eq!(
            select_weight_measure(&[Measure::Seats, Measure::Freight], None),
            Some(Measure::Freight)
        );
        assert_eq!(select_weight_measure(&[], None), None);
    }

    #[test]
    fn test_select_weight_measure_override() {
        let available = [Measure::Passengers, Measure::Seats];
        assert_eq!(
            select_weight_measure(&available, Some(Measure::Seats)),
            Some(Measure::Seats)
        );
        assert_eq!(
            select_weight_measure(&available, Some(Measure::Mail)),
            Some(Measure::Passengers)
        );
    }

    #[test]
    fn test_monthly_then_overall() {
        let records = vec![
            record("JFK", "LAX", Some("1"), 10.0),
            record("JFK", "LAX", Some("1"), 5.0),
            record("JFK", "LAX", Some("2"), 7.0),
            record("LAX", "JFK", Some("1"), 3.0),
        ];
        let agg = aggregate(&records, Some(Measure::Passengers));

        assert_eq!(agg.monthly.len(), 3);
        assert_eq!(agg.monthly[0].month.as_deref(), Some("1"));
        assert_eq!(agg.monthly[0].weight, 15.0);
        assert_eq!(weight_of(&agg.overall, "JFK", "LAX"), Some(22.0));
        assert_eq!(weight_of(&agg.overall, "LAX", "JFK"), Some(3.0));
    }

    #[test]
    fn test_no_measure_counts_records() {
        let records = vec![
            record("JFK", "LAX", None, 10.0),
            record("JFK", "LAX", None, 99.0),
            record("ORD", "LAX", None, 1.0),
        ];
        let agg = aggregate(&records, None);
        assert_eq!(agg.measure, None);
        assert_eq!(weight_of(&agg.overall, "JFK", "LAX"), Some(2.0));
        assert_eq!(agg.monthly[0].month, None);
    }

    #[test]
    fn test_undirected_merges_reversed_pairs() {
        let edges = vec![
            AggregatedEdge::new("LAX", "JFK", 50.0),
            AggregatedEdge::new("JFK", "LAX", 100.0),
        ];
        let merged = undirected(&edges);
        assert_eq!(merged, vec![AggregatedEdge::new("JFK", "LAX", 150.0)]);
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_order_invariant(
            (rows, shuffled_rows) in prop::collection::vec(
                (0usize..4, 0usize..4, 0u8..3, 0.0f64..1e6),
                0..40,
            )
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle())),
        ) {
            let codes = ["JFK", "LAX", "ORD", "SEA"];
            let to_records = |rows: &[(usize, usize, u8, f64)]| -> Vec<CleanRecord> {
                rows.iter()
                    .filter(|(o, d, _, _)| o != d)
                    .map(|(o, d, m, w)| {
                        record(codes[*o], codes[*d], Some(m.to_string().as_str()), *w)
                    })
                    .collect()
            };
            let records = to_records(&rows);
            let shuffled = to_records(&shuffled_rows);

            let a = aggregate(&records, Some(Measure::Passengers));
            let b = aggregate(&shuffled, Some(Measure::Passengers));
            prop_assert_eq!(a, b);
        }
    }
}
