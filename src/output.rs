//! Output artifacts: CSV tables, the giant-component snapshot and the report.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::analyzer::Analysis;
use crate::analyzers::types::NetworkReport;
use crate::graph::AirNetwork;
use crate::prep::Prepared;
use crate::prep::aggregate::undirected;
use crate::prep::types::{AggregatedEdge, AirportRecord};

pub const AIRPORTS_FILE: &str = "airports.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const MONTHLY_EDGES_FILE: &str = "edges_by_month.csv";
pub const SNAPSHOT_FILE: &str = "giant_component.json";
pub const GRAPHML_FILE: &str = "giant_component.graphml";
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Serialize)]
struct EdgeRow<'a> {
    origin: &'a str,
    destination: &'a str,
    weight: f64,
}

#[derive(Debug, Serialize)]
struct MonthlyEdgeRow<'a> {
    origin: &'a str,
    destination: &'a str,
    month: Option<&'a str>,
    weight: f64,
}

#[derive(Debug, Serialize)]
struct CentralityRow<'a> {
    code: &'a str,
    degree: usize,
    betweenness: f64,
    closeness: f64,
}

#[derive(Debug, Serialize)]
struct ClusteringRow<'a> {
    code: &'a str,
    clustering: f64,
}

#[derive(Debug, Serialize)]
struct ComponentRow<'a> {
    code: &'a str,
    component: usize,
}

/// Writes `rows` to a fresh CSV file at `path`, header first.
pub fn write_records<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = count, "CSV written");
    Ok(count)
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &NetworkReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the node table, the undirected edge table and the monthly table.
#[tracing::instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_prepared(out_dir: &Path, prepared: &Prepared) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let selection = &prepared.selection;

    let airports = write_records(&out_dir.join(AIRPORTS_FILE), &selection.airports)?;

    let collapsed = undirected(&selection.edges);
    let edges = write_records(
        &out_dir.join(EDGES_FILE),
        collapsed.iter().map(|e| EdgeRow {
            origin: &e.origin,
            destination: &e.destination,
            weight: e.weight,
        }),
    )?;

    let monthly = write_records(
        &out_dir.join(MONTHLY_EDGES_FILE),
        selection.monthly.iter().map(|e| MonthlyEdgeRow {
            origin: &e.origin,
            destination: &e.destination,
            month: e.month.as_deref(),
            weight: e.weight,
        }),
    )?;

    info!(airports, edges, monthly, "Prepared tables written");
    Ok(())
}

/// Serialized node/edge list form of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<AirportRecord>,
    pub edges: Vec<SnapshotEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl GraphSnapshot {
    pub fn from_network(network: &AirNetwork) -> Self {
        let mut codes: Vec<&str> = network.node_map.keys().map(String::as_str).collect();
        codes.sort_unstable();

        Self {
            nodes: codes.into_iter().map(|c| network.airport(c)).collect(),
            edges: network
                .edge_list()
                .into_iter()
                .map(|(source, target, weight)| SnapshotEdge {
                    source,
                    target,
                    weight,
                })
                .collect(),
        }
    }

    /// Rebuilds the graph. Nodes without edges are not restored.
    pub fn into_network(self) -> AirNetwork {
        let edges: Vec<AggregatedEdge> = self
            .edges
            .iter()
            .map(|e| AggregatedEdge::new(&e.source, &e.target, e.weight))
            .collect();
        AirNetwork::build(&self.nodes, &edges)
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Writes a snapshot as JSON, gzip-compressed when `path` ends in `.gz`.
pub fn write_snapshot(path: &Path, snapshot: &GraphSnapshot) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, snapshot)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
    }
    Ok(())
}

/// Reads a snapshot written by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let snapshot = serde_json::from_reader(reader)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(snapshot)
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes the graph as GraphML with node attributes and edge weights.
pub fn write_graphml<W: Write>(mut out: W, network: &AirNetwork) -> Result<()> {
    let snapshot = GraphSnapshot::from_network(network);

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#)?;
    for (id, domain, ty) in [
        ("name", "node", "string"),
        ("city", "node", "string"),
        ("state", "node", "string"),
        ("lat", "node", "double"),
        ("lon", "node", "double"),
        ("weight", "edge", "double"),
    ] {
        writeln!(
            out,
            r#"  <key id="{id}" for="{domain}" attr.name="{id}" attr.type="{ty}"/>"#
        )?;
    }
    writeln!(out, r#"  <graph id="G" edgedefault="undirected">"#)?;

    for node in &snapshot.nodes {
        writeln!(out, r#"    <node id="{}">"#, xml_escape(&node.code))?;
        for (key, value) in [("name", &node.name), ("city", &node.city), ("state", &node.state)] {
            if !value.is_empty() {
                writeln!(out, r#"      <data key="{key}">{}</data>"#, xml_escape(value))?;
            }
        }
        if let Some(lat) = node.latitude {
            writeln!(out, r#"      <data key="lat">{lat}</data>"#)?;
        }
        if let Some(lon) = node.longitude {
            writeln!(out, r#"      <data key="lon">{lon}</data>"#)?;
        }
        writeln!(out, "    </node>")?;
    }
    for edge in &snapshot.edges {
        writeln!(
            out,
            r#"    <edge source="{}" target="{}"><data key="weight">{}</data></edge>"#,
            xml_escape(&edge.source),
            xml_escape(&edge.target),
            edge.weight
        )?;
    }

    writeln!(out, "  </graph>")?;
    writeln!(out, "</graphml>")?;
    Ok(())
}

/// Writes the giant-component snapshot, the per-node metric tables and the
/// report into `out_dir`. Returns the snapshot path if one was written.
#[tracing::instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_analysis(out_dir: &Path, analysis: &Analysis, gzip: bool) -> Result<Option<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let snapshot_path = match &analysis.components.giant {
        Some(giant) => {
            let name = if gzip {
                format!("{SNAPSHOT_FILE}.gz")
            } else {
                SNAPSHOT_FILE.to_string()
            };
            let path = out_dir.join(name);
            write_snapshot(&path, &GraphSnapshot::from_network(giant))?;

            let graphml = out_dir.join(GRAPHML_FILE);
            let file = File::create(&graphml)
                .with_context(|| format!("creating {}", graphml.display()))?;
            let mut writer = BufWriter::new(file);
            write_graphml(&mut writer, giant)?;
            writer.flush()?;
            Some(path)
        }
        None => {
            info!("Graph is empty, no giant component to save");
            None
        }
    };

    let scores = &analysis.centrality;
    write_records(
        &out_dir.join("centrality.csv"),
        scores.degree.iter().map(|(code, &degree)| CentralityRow {
            code,
            degree,
            betweenness: scores.betweenness.get(code).copied().unwrap_or(0.0),
            closeness: scores.closeness.get(code).copied().unwrap_or(0.0),
        }),
    )?;
    write_records(
        &out_dir.join("clustering.csv"),
        analysis
            .clustering
            .iter()
            .map(|(code, &clustering)| ClusteringRow { code, clustering }),
    )?;
    write_records(
        &out_dir.join("components.csv"),
        analysis
            .components
            .membership
            .iter()
            .map(|(code, &component)| ComponentRow { code, component }),
    )?;

    let centrality = &analysis.report.centrality;
    write_records(&out_dir.join("top_degree.csv"), &centrality.top_degree)?;
    write_records(&out_dir.join("top_betweenness.csv"), &centrality.top_betweenness)?;
    write_records(&out_dir.join("top_closeness.csv"), &centrality.top_closeness)?;
    write_records(
        &out_dir.join("degree_distribution.csv"),
        &centrality.degree_distribution,
    )?;
    write_records(
        &out_dir.join("clustering_distribution.csv"),
        &analysis.report.clustering.distribution,
    )?;

    let report_path = out_dir.join(REPORT_FILE);
    let file = File::create(&report_path)
        .with_context(|| format!("creating {}", report_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &analysis.report)?;
    writer.flush()?;

    info!(out_dir = %out_dir.display(), "Analysis artifacts written");
    Ok(snapshot_path)
}
