use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use air_network::analyzers::analyzer::analyze;
use air_network::config::PipelineConfig;
use air_network::error::SchemaError;
use air_network::graph::AirNetwork;
use air_network::output::{self, EDGES_FILE, MONTHLY_EDGES_FILE, write_analysis, write_prepared};
use air_network::parser::{
    read_airports_path, read_edges_path, read_itineraries, read_itineraries_path,
    read_stations_path,
};
use air_network::prep::normalize::NormalizeStats;
use air_network::prep::prepare;
use air_network::prep::types::Measure;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn prepared() -> air_network::prep::Prepared {
    let itineraries = read_itineraries_path(&fixture("itineraries.csv")).expect("itineraries");
    let stations = read_stations_path(&fixture("stations.csv")).expect("stations");
    prepare(itineraries, stations, &PipelineConfig::default())
}

#[test]
fn test_prepare_fixture() {
    let prepared = prepared();
    assert_eq!(prepared.measure, Some(Measure::Passengers));
    assert_eq!(
        prepared.rows,
        NormalizeStats {
            read: 11,
            kept: 8,
            invalid_code: 2,
            self_loops: 1
        }
    );

    let selection = &prepared.selection;
    let codes: BTreeSet<&str> = selection.airports.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, BTreeSet::from(["ATL", "JFK", "LAX", "ORD", "PDX", "SEA"]));

    let jfk = selection.airports.iter().find(|a| a.code == "JFK").unwrap();
    assert_eq!(jfk.name, "John F. Kennedy International");

    assert_eq!(selection.dropped_edges, 1);
    assert!(selection.edges.iter().all(|e| e.origin != e.destination));
    for edge in selection.edges.iter().chain(&selection.monthly) {
        assert!(codes.contains(edge.origin.as_str()));
        assert!(codes.contains(edge.destination.as_str()));
    }
    for code in &codes {
        assert!(
            selection
                .edges
                .iter()
                .any(|e| e.origin == *code || e.destination == *code)
        );
    }
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let prepared = prepared();
    write_prepared(dir.path(), &prepared).unwrap();

    let edges = read_edges_path(&dir.path().join(EDGES_FILE)).unwrap();
    assert_eq!(edges.len(), 4);
    let jfk_lax = edges
        .iter()
        .find(|e| e.origin == "JFK" && e.destination == "LAX")
        .unwrap();
    assert_eq!(jfk_lax.weight, 150.0);

    let monthly = fs::read_to_string(dir.path().join(MONTHLY_EDGES_FILE)).unwrap();
    assert!(monthly.starts_with("origin,destination,month,weight"));
    assert!(monthly.contains("JFK,LAX,2,0.0"));

    let airports = read_airports_path(&dir.path().join("airports.csv")).unwrap();
    let network = AirNetwork::build(&airports, &edges);
    assert_eq!(network.node_count(), 6);
    assert_eq!(network.edge_count(), 4);

    let analysis = analyze(&network, &PipelineConfig::default());
    assert_eq!(analysis.components.sizes, vec![4, 2]);
    assert_eq!(analysis.centrality.degree["JFK"], 3);
    assert!((analysis.centrality.betweenness["JFK"] - 0.3).abs() < 1e-9);
    assert_eq!(analysis.centrality.betweenness["SEA"], 0.0);
    assert!(analysis.clustering.values().all(|&c| c == 0.0));

    let snapshot = write_analysis(dir.path(), &analysis, false)
        .unwrap()
        .expect("giant component");
    let giant = output::read_snapshot(&snapshot).unwrap().into_network();
    assert_eq!(giant.node_count(), 4);
    assert_eq!(giant.weight("LAX", "JFK"), Some(150.0));
    assert_eq!(giant.airport("ORD").state, "IL");
    assert!(!giant.contains("SEA"));
}

#[test]
fn test_directional_network_matches_collapsed_table() {
    let prepared = prepared();
    let direct = AirNetwork::build(&prepared.selection.airports, &prepared.selection.edges);
    assert_eq!(direct.weight("JFK", "LAX"), Some(150.0));
    assert_eq!(direct.weight("SEA", "PDX"), Some(14.0));
}

#[test]
fn test_missing_origin_column_is_fatal() {
    let csv = "DEST,PASSENGERS\nLAX,10\n";
    let err = read_itineraries(csv.as_bytes(), "bad.csv").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchemaError>(),
        Some(SchemaError::MissingColumn { column, .. }) if column == "ORIGIN"
    ));
}
