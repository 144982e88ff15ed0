//! Station metadata → canonical airport records.

use std::collections::HashSet;

use tracing::info;

use crate::prep::normalize::clean_station_code;
use crate::prep::types::{AirportRecord, Dms, RawStation};

/// Converts a degree/minute/second/hemisphere quadruple to signed decimal degrees.
///
/// Returns `None` if any numeric part fails to parse. `S` and `W` hemispheres
/// are negative.
pub fn dms_to_decimal(dms: &Dms) -> Option<f64> {
    let degrees: f64 = dms.degrees.trim().parse().ok()?;
    let minutes: f64 = dms.minutes.trim().parse().ok()?;
    let seconds: f64 = dms.seconds.trim().parse().ok()?;
    let sign = match dms.hemisphere.trim().to_uppercase().as_str() {
        "S" | "W" => -1.0,
        _ => 1.0,
    };
    Some(sign * (degrees.abs() + minutes / 60.0 + seconds / 3600.0))
}

fn parse_decimal(raw: Option<&String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn text(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Validates codes, deduplicates by code (first row wins), applies the
/// country filter and resolves coordinates.
///
/// Decimal latitude/longitude are used unless no row has a usable value for
/// that axis, in which case the DMS columns are used for every row.
#[tracing::instrument(skip(rows), fields(rows = rows.len()))]
pub fn resolve_stations(rows: Vec<RawStation>, country: Option<&str>) -> Vec<AirportRecord> {
    let total = rows.len();
    let mut seen = HashSet::new();

    let kept: Vec<(String, RawStation)> = rows
        .into_iter()
        .filter_map(|row| clean_station_code(&row.code).map(|code| (code.into_inner(), row)))
        .filter(|(code, _)| seen.insert(code.clone()))
        .filter(|(_, row)| match (country, &row.country) {
            (Some(wanted), Some(have)) => have.trim().eq_ignore_ascii_case(wanted),
            // `None` means the table has no country column; empty cells are `Some("")`.
            (Some(_), None) => true,
            (None, _) => true,
        })
        .collect();

    let mut latitudes: Vec<Option<f64>> =
        kept.iter().map(|(_, r)| parse_decimal(r.latitude.as_ref())).collect();
    let mut longitudes: Vec<Option<f64>> =
        kept.iter().map(|(_, r)| parse_decimal(r.longitude.as_ref())).collect();

    if latitudes.iter().all(Option::is_none) && kept.iter().any(|(_, r)| r.lat_dms.is_some()) {
        latitudes = kept
            .iter()
            .map(|(_, r)| r.lat_dms.as_ref().and_then(dms_to_decimal))
            .collect();
    }
    if longitudes.iter().all(Option::is_none) && kept.iter().any(|(_, r)| r.lon_dms.is_some()) {
        longitudes = kept
            .iter()
            .map(|(_, r)| r.lon_dms.as_ref().and_then(dms_to_decimal))
            .collect();
    }

    let airports: Vec<AirportRecord> = kept
        .into_iter()
        .zip(latitudes.into_iter().zip(longitudes))
        .map(|((code, row), (latitude, longitude))| AirportRecord {
            code,
            name: text(row.name),
            city: text(row.city),
            state: text(row.state),
            latitude,
            longitude,
        })
        .collect();

    info!(total, kept = airports.len(), "Stations resolved");
    airports
}
