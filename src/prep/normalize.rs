//! Station code validation and numeric coercion for raw itinerary rows.

use tracing::{debug, info};

use crate::prep::types::{CleanRecord, RawRecord, StationCode};

/// Placeholder codes the carrier tables use for "no station".
pub const EXCLUDED_CODES: [&str; 4] = ["ZZZ", "UNK", "", "N/A"];

/// Why a raw row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidOrigin,
    InvalidDestination,
    SelfLoop,
}

/// Counters for one normalization pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeStats {
    pub read: usize,
    pub kept: usize,
    pub invalid_code: usize,
    pub self_loops: usize,
}

/// Trims and uppercases `raw`, returning it only if it is a usable station code.
pub fn clean_station_code(raw: &str) -> Option<StationCode> {
    let code = raw.trim().to_uppercase();
    if EXCLUDED_CODES.contains(&code.as_str()) {
        return None;
    }
    if code.chars().count() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(StationCode::new_unchecked(code))
}

/// Parses a measure cell. Anything unparsable, non-finite or negative counts as 0.0.
pub fn coerce_measure(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn clean_month(raw: Option<String>) -> Option<String> {
    raw.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

/// Validates both endpoints of a row and coerces its measures.
pub fn normalize_record(raw: RawRecord) -> Result<CleanRecord, Rejection> {
    let origin = clean_station_code(&raw.origin).ok_or(Rejection::InvalidOrigin)?;
    let destination = clean_station_code(&raw.destination).ok_or(Rejection::InvalidDestination)?;
    if origin == destination {
        return Err(Rejection::SelfLoop);
    }

    let measures = raw
        .measures
        .iter()
        .map(|(measure, text)| (*measure, coerce_measure(text)))
        .collect();

    Ok(CleanRecord {
        origin,
        destination,
        month: clean_month(raw.month),
        measures,
    })
}

/// Normalizes a stream of rows, silently dropping the ones that fail validation.
#[tracing::instrument(skip_all)]
pub fn normalize_records<I>(rows: I) -> (Vec<CleanRecord>, NormalizeStats)
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut stats = NormalizeStats::default();
    let mut clean = Vec::new();

    for row in rows {
        stats.read += 1;
        match normalize_record(row) {
            Ok(record) => clean.push(record),
            Err(Rejection::SelfLoop) => stats.self_loops += 1,
            Err(reason) => {
                debug!(?reason, "Row rejected");
                stats.invalid_code += 1;
            }
        }
    }
    stats.kept = clean.len();

    info!(
        read = stats.read,
        kept = stats.kept,
        invalid_code = stats.invalid_code,
        self_loops = stats.self_loops,
        "Itinerary rows normalized"
    );

    (clean, stats)
}
