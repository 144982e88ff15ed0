//! CSV readers for the input tables.
//!
//! Column presence is detected from the header row at runtime. Header names
//! are trimmed and uppercased before matching, so `origin`, ` Origin ` and
//! `ORIGIN` all resolve to the same column.
//!
//! Rows are read as raw bytes and only the cells the pipeline uses are
//! decoded, lossily, so stray Latin-1 text in a table never fails the run.

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::SchemaError;
use crate::prep::normalize::clean_station_code;
use crate::prep::types::{AggregatedEdge, AirportRecord, Dms, Measure, RawRecord, RawStation};

/// Raw itinerary rows plus what the header said about optional columns.
#[derive(Debug, Clone, Default)]
pub struct ItineraryTable {
    pub measures: Vec<Measure>,
    pub rows: Vec<RawRecord>,
}

/// Raw station metadata rows.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    pub rows: Vec<RawStation>,
}

/// Header name → column position.
struct Columns {
    table: String,
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(table: &str, headers: &ByteRecord) -> Result<Self, SchemaError> {
        if headers.is_empty() {
            return Err(SchemaError::NoHeader {
                table: table.to_string(),
            });
        }
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            let name = String::from_utf8_lossy(name);
            index.entry(name.trim().to_uppercase()).or_insert(i);
        }
        Ok(Self {
            table: table.to_string(),
            index,
        })
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, SchemaError> {
        self.find(name)
            .ok_or_else(|| SchemaError::missing(&self.table, name))
    }

    fn dms(&self, prefix: &str) -> Option<[usize; 4]> {
        Some([
            self.find(&format!("{prefix}_DEGREES"))?,
            self.find(&format!("{prefix}_MINUTES"))?,
            self.find(&format!("{prefix}_SECONDS"))?,
            self.find(&format!("{prefix}_HEMISPHERE"))?,
        ])
    }
}

fn field(record: &ByteRecord, idx: usize) -> String {
    String::from_utf8_lossy(record.get(idx).unwrap_or_default()).into_owned()
}

fn optional(record: &ByteRecord, idx: Option<usize>) -> Option<String> {
    idx.map(|i| field(record, i))
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

/// Reads an itinerary table. `ORIGIN` and `DEST` are required; `MONTH` and
/// the measure columns are picked up when present.
pub fn read_itineraries<R: Read>(input: R, table: &str) -> Result<ItineraryTable> {
    let mut rdr = reader(input);
    let columns = Columns::from_headers(table, rdr.byte_headers()?)?;

    let origin = columns.require("ORIGIN")?;
    let destination = columns.require("DEST")?;
    let month = columns.find("MONTH");
    let measure_columns: Vec<(Measure, usize)> = Measure::PRIORITY
        .into_iter()
        .filter_map(|m| columns.find(m.column()).map(|i| (m, i)))
        .collect();

    debug!(
        table,
        has_month = month.is_some(),
        measures = ?measure_columns.iter().map(|(m, _)| m.column()).collect::<Vec<_>>(),
        "Itinerary columns detected"
    );

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.with_context(|| format!("reading {table}"))?;
        rows.push(RawRecord {
            origin: field(&record, origin),
            destination: field(&record, destination),
            month: optional(&record, month),
            measures: measure_columns
                .iter()
                .map(|(m, i)| (*m, field(&record, *i)))
                .collect(),
        });
    }

    info!(table, rows = rows.len(), "Itinerary table read");

    Ok(ItineraryTable {
        measures: measure_columns.into_iter().map(|(m, _)| m).collect(),
        rows,
    })
}

pub fn read_itineraries_path(path: &Path) -> Result<ItineraryTable> {
    read_itineraries(open(path)?, &path.display().to_string())
}

/// Reads a station metadata table. `AIRPORT` is required.
pub fn read_stations<R: Read>(input: R, table: &str) -> Result<StationTable> {
    let mut rdr = reader(input);
    let columns = Columns::from_headers(table, rdr.byte_headers()?)?;

    let code = columns.require("AIRPORT")?;
    let name = columns.find("DISPLAY_AIRPORT_NAME");
    let city = columns.find("DISPLAY_AIRPORT_CITY_NAME_FULL");
    let state = columns.find("AIRPORT_STATE_CODE");
    let country = columns.find("AIRPORT_COUNTRY_CODE_ISO");
    let latitude = columns.find("LATITUDE");
    let longitude = columns.find("LONGITUDE");
    let lat_dms = columns.dms("LAT");
    let lon_dms = columns.dms("LON");

    let to_dms = |record: &ByteRecord, idx: Option<[usize; 4]>| {
        idx.map(|[d, m, s, h]| Dms {
            degrees: field(record, d),
            minutes: field(record, m),
            seconds: field(record, s),
            hemisphere: field(record, h),
        })
    };

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.with_context(|| format!("reading {table}"))?;
        rows.push(RawStation {
            code: field(&record, code),
            name: optional(&record, name),
            city: optional(&record, city),
            state: optional(&record, state),
            country: optional(&record, country),
            latitude: optional(&record, latitude),
            longitude: optional(&record, longitude),
            lat_dms: to_dms(&record, lat_dms),
            lon_dms: to_dms(&record, lon_dms),
        });
    }

    info!(table, rows = rows.len(), "Station table read");
    Ok(StationTable { rows })
}

pub fn read_stations_path(path: &Path) -> Result<StationTable> {
    read_stations(open(path)?, &path.display().to_string())
}

/// Reads an aggregated edge table (`origin,destination[,weight]`).
///
/// Codes go through the same cleaning as raw itinerary codes; rows with an
/// unusable code are skipped. A missing or unparsable weight counts as a
/// single connection and negative weights count as 0.0.
pub fn read_edges<R: Read>(input: R, table: &str) -> Result<Vec<AggregatedEdge>> {
    let mut rdr = reader(input);
    let columns = Columns::from_headers(table, rdr.byte_headers()?)?;

    let origin = columns.require("ORIGIN")?;
    let destination = columns.require("DESTINATION")?;
    let weight = columns.find("WEIGHT");

    let mut edges = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.byte_records() {
        let record = result.with_context(|| format!("reading {table}"))?;
        let (Some(a), Some(b)) = (
            clean_station_code(&field(&record, origin)),
            clean_station_code(&field(&record, destination)),
        ) else {
            skipped += 1;
            continue;
        };
        let w = weight
            .and_then(|i| field(&record, i).trim().parse::<f64>().ok())
            .filter(|w| w.is_finite())
            .map_or(1.0, |w| w.max(0.0));
        edges.push(AggregatedEdge::new(a.as_str(), b.as_str(), w));
    }

    if skipped > 0 {
        warn!(table, skipped, "Edge rows with unusable station codes skipped");
    }
    info!(table, edges = edges.len(), "Edge table read");
    Ok(edges)
}

pub fn read_edges_path(path: &Path) -> Result<Vec<AggregatedEdge>> {
    read_edges(open(path)?, &path.display().to_string())
}

/// Reads an `airports.csv` written by the preparation stage.
pub fn read_airports<R: Read>(input: R, table: &str) -> Result<Vec<AirportRecord>> {
    let mut rdr = reader(input);
    let mut airports = Vec::new();
    for result in rdr.deserialize() {
        let airport: AirportRecord = result.with_context(|| format!("reading {table}"))?;
        airports.push(airport);
    }
    Ok(airports)
}

pub fn read_airports_path(path: &Path) -> Result<Vec<AirportRecord>> {
    read_airports(open(path)?, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itinerary_headers_case_insensitive() {
        let csv = " origin ,Dest,Month,passengers,SEATS\nJFK,LAX,1,100,200\n";
        let table = read_itineraries(csv.as_bytes(), "t100").unwrap();

        assert_eq!(table.measures, vec![Measure::Passengers, Measure::Seats]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].origin, "JFK");
        assert_eq!(
            table.rows[0].measures,
            vec![
                (Measure::Passengers, "100".to_string()),
                (Measure::Seats, "200".to_string())
            ]
        );
    }

    #[test]
    fn test_missing_dest_is_schema_error() {
        let csv = "ORIGIN,MONTH\nJFK,1\n";
        let err = read_itineraries(csv.as_bytes(), "t100").unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::missing("t100", "DEST"))
        );
    }

    #[test]
    fn test_short_rows_tolerated() {
        let csv = "ORIGIN,DEST,PASSENGERS\nJFK,LAX\n";
        let table = read_itineraries(csv.as_bytes(), "t100").unwrap();
        assert_eq!(table.rows[0].month, None);
        assert_eq!(table.rows[0].measures[0].1, "");
    }

    #[test]
    fn test_station_dms_columns() {
        let csv = "AIRPORT,LAT_DEGREES,LAT_MINUTES,LAT_SECONDS,LAT_HEMISPHERE\nJFK,40,38,24,N\n";
        let table = read_stations(csv.as_bytes(), "master").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.lat_dms.as_ref().unwrap().hemisphere, "N");
        assert!(row.lon_dms.is_none());
        assert!(row.country.is_none());
    }

    #[test]
    fn test_station_requires_airport() {
        let csv = "IATA,NAME\nJFK,Kennedy\n";
        let err = read_stations(csv.as_bytes(), "master").unwrap_err();
        assert!(err.downcast_ref::<SchemaError>().is_some());
    }

    #[test]
    fn test_read_edges_weight_fallback() {
        let csv = "origin,destination,weight\nJFK,LAX,150\nJFK,ORD,\n";
        let edges = read_edges(csv.as_bytes(), "edges").unwrap();
        assert_eq!(edges[0].weight, 150.0);
        assert_eq!(edges[1].weight, 1.0);
    }

    #[test]
    fn test_read_edges_cleans_codes_and_clamps_weight() {
        let csv = "origin,destination,weight\n jfk ,LAX,-5\nJFK,lax,10\nZZZ,LAX,3\n";
        let edges = read_edges(csv.as_bytes(), "edges").unwrap();
        assert_eq!(
            edges,
            vec![
                AggregatedEdge::new("JFK", "LAX", 0.0),
                AggregatedEdge::new("JFK", "LAX", 10.0)
            ]
        );
    }

    #[test]
    fn test_latin1_in_unused_itinerary_column() {
        let csv: &[u8] =
            b"ORIGIN,DEST,PASSENGERS,CARRIER_NAME\nJFK,LAX,100,Air Fran\xE9\nORD,SEA,5,Delta\n";
        let table = read_itineraries(csv, "t100").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].origin, "JFK");
        assert_eq!(table.rows[1].measures[0].1, "5");
    }

    #[test]
    fn test_latin1_in_station_name() {
        let csv: &[u8] = b"AIRPORT,DISPLAY_AIRPORT_NAME\nSJU,Luis Mu\xF1oz Marin\nJFK,Kennedy\n";
        let table = read_stations(csv, "master").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].code, "SJU");
        assert!(table.rows[0].name.as_deref().unwrap().starts_with("Luis Mu"));
        assert_eq!(table.rows[1].name.as_deref(), Some("Kennedy"));
    }

    #[test]
    fn test_read_airports() {
        let csv = "iata,name,city,state,lat,lon\nJFK,Kennedy,New York,NY,40.6,-73.8\nLAX,,,,,\n";
        let airports = read_airports(csv.as_bytes(), "airports").unwrap();
        assert_eq!(airports[0].latitude, Some(40.6));
        assert_eq!(airports[1].longitude, None);
    }
}
