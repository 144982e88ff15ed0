//! Record types flowing through the preparation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric measure columns of the itinerary table, in weight priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Measure {
    Passengers,
    DeparturesPerformed,
    Freight,
    Mail,
    Seats,
}

impl Measure {
    /// Weight selection order: the first one present in the table wins.
    pub const PRIORITY: [Measure; 5] = [
        Measure::Passengers,
        Measure::DeparturesPerformed,
        Measure::Freight,
        Measure::Mail,
        Measure::Seats,
    ];

    /// Normalized (trimmed, uppercased) column header for this measure.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Passengers => "PASSENGERS",
            Measure::DeparturesPerformed => "DEPARTURES_PERFORMED",
            Measure::Freight => "FREIGHT",
            Measure::Mail => "MAIL",
            Measure::Seats => "SEATS",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A validated 3-letter uppercase station code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode(String);

impl StationCode {
    /// Wraps an already-normalized code. Only the normalizer builds these.
    pub(crate) fn new_unchecked(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One itinerary-market row as read from the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub origin: String,
    pub destination: String,
    pub month: Option<String>,
    /// Raw text of every measure column present in the table.
    pub measures: Vec<(Measure, String)>,
}

/// A row that survived normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub origin: StationCode,
    pub destination: StationCode,
    pub month: Option<String>,
    pub measures: Vec<(Measure, f64)>,
}

impl CleanRecord {
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        self.measures
            .iter()
            .find(|(m, _)| *m == measure)
            .map(|(_, v)| *v)
    }
}

/// Degree/minute/second/hemisphere text fields for one coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dms {
    pub degrees: String,
    pub minutes: String,
    pub seconds: String,
    pub hemisphere: String,
}

/// One station metadata row as read from the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStation {
    pub code: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub lat_dms: Option<Dms>,
    pub lon_dms: Option<Dms>,
}

/// Canonical node attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    #[serde(rename = "iata")]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
}

impl AirportRecord {
    /// A record that carries nothing but its code.
    pub fn bare(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: String::new(),
            city: String::new(),
            state: String::new(),
            latitude: None,
            longitude: None,
        }
    }
}

/// A summed origin/destination pair, optionally scoped to one month.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEdge {
    pub origin: String,
    pub destination: String,
    pub month: Option<String>,
    pub weight: f64,
}

impl AggregatedEdge {
    pub fn new(origin: &str, destination: &str, weight: f64) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            month: None,
            weight,
        }
    }
}
