//! CLI entry point for the air network tool.
//!
//! Provides subcommands for preparing node/edge tables from raw carrier
//! data, analyzing a prepared edge table, and running both in one go.

use air_network::analyzers::analyzer::analyze;
use air_network::config::PipelineConfig;
use air_network::graph::AirNetwork;
use air_network::output::{self, AIRPORTS_FILE, write_analysis, write_prepared};
use air_network::parser::{
    read_airports_path, read_edges_path, read_itineraries_path, read_stations_path,
};
use air_network::prep::prepare;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "air_network")]
#[command(about = "Build and analyze an airport connectivity graph", long_about = None)]
struct Cli {
    /// JSON config file (falls back to AIR_NETWORK_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and aggregate raw tables into airports/edges CSVs
    Prep {
        /// Raw itinerary (market) CSV
        #[arg(long)]
        itineraries: PathBuf,

        /// Raw station metadata CSV
        #[arg(long)]
        stations: PathBuf,

        /// Directory for the prepared tables
        #[arg(short, long, default_value = "network")]
        out_dir: PathBuf,
    },
    /// Build the graph from an edge table or snapshot and compute metrics
    Analyze {
        /// Edge CSV (origin,destination,weight)
        #[arg(long, required_unless_present = "snapshot", conflicts_with = "snapshot")]
        edges: Option<PathBuf>,

        /// Optional airports CSV for node attributes
        #[arg(long)]
        airports: Option<PathBuf>,

        /// Previously saved graph snapshot (.json or .json.gz)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Directory for metric artifacts
        #[arg(short, long, default_value = "metrics")]
        out_dir: PathBuf,

        /// Gzip the giant-component snapshot
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Prep followed by analyze
    Run {
        #[arg(long)]
        itineraries: PathBuf,

        #[arg(long)]
        stations: PathBuf,

        /// Output directory for tables and metrics
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,

        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/air_network.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("air_network.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var("AIR_NETWORK_CONFIG").ok());
    let config = PipelineConfig::load_or_default(config_path.as_deref())?;
    info!(?config, "Configuration loaded");

    match cli.command {
        Commands::Prep {
            itineraries,
            stations,
            out_dir,
        } => {
            prep(&itineraries, &stations, &out_dir, &config)?;
        }
        Commands::Analyze {
            edges,
            airports,
            snapshot,
            out_dir,
            gzip,
        } => {
            let network = match (snapshot, edges) {
                (Some(snapshot), _) => output::read_snapshot(&snapshot)?.into_network(),
                (None, Some(edges)) => load_network(&edges, airports.as_deref())?,
                (None, None) => anyhow::bail!("either --edges or --snapshot is required"),
            };
            run_analysis(&network, &out_dir, gzip, &config)?;
        }
        Commands::Run {
            itineraries,
            stations,
            out_dir,
            gzip,
        } => {
            let network = prep(&itineraries, &stations, &out_dir, &config)?;
            run_analysis(&network, &out_dir, gzip, &config)?;
        }
    }

    Ok(())
}

/// Reads the raw tables, writes the prepared tables and returns the graph
/// built from them.
#[tracing::instrument(skip_all, fields(itineraries = %itineraries.display(), stations = %stations.display()))]
fn prep(
    itineraries: &Path,
    stations: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<AirNetwork> {
    let itinerary_table = read_itineraries_path(itineraries)?;
    let station_table = read_stations_path(stations)?;

    let prepared = prepare(itinerary_table, station_table, config);
    if prepared.measure.is_none() {
        warn!("No measure column found, edge weights are connection counts");
    }
    write_prepared(out_dir, &prepared)?;

    Ok(AirNetwork::build(
        &prepared.selection.airports,
        &prepared.selection.edges,
    ))
}

/// Builds a graph from an edge CSV, attaching attributes from `airports` if given.
#[tracing::instrument(skip_all, fields(edges = %edges.display()))]
fn load_network(edges: &Path, airports: Option<&Path>) -> Result<AirNetwork> {
    let edge_list = read_edges_path(edges)?;
    let airports = match airports {
        Some(path) => read_airports_path(path)?,
        None => {
            let sibling = edges.with_file_name(AIRPORTS_FILE);
            if sibling.exists() {
                info!(path = %sibling.display(), "Using airports table next to edge table");
                read_airports_path(&sibling)?
            } else {
                Vec::new()
            }
        }
    };
    Ok(AirNetwork::build(&airports, &edge_list))
}

fn run_analysis(
    network: &AirNetwork,
    out_dir: &Path,
    gzip: bool,
    config: &PipelineConfig,
) -> Result<()> {
    if network.is_empty() {
        warn!("Graph has no edges; metrics will be empty");
    }
    let analysis = analyze(network, config);
    output::print_json(&analysis.report)?;
    if let Some(path) = write_analysis(out_dir, &analysis, gzip)? {
        info!(path = %path.display(), "Giant component saved");
    }
    Ok(())
}
