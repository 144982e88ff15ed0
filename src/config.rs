use anyhow::{Context, Result};
use serde::Deserialize;

use crate::prep::types::Measure;

/// Tunables for a pipeline run.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "country": "US",
///   "weight_measure": "SEATS",
///   "top_k": 15,
///   "top_component_sizes": 10,
///   "distribution_bins": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep only stations with this ISO country code. `null` keeps all.
    pub country: Option<String>,
    /// Preferred weight column. Falls back to the priority order when absent.
    pub weight_measure: Option<Measure>,
    pub top_k: usize,
    pub top_component_sizes: usize,
    pub distribution_bins: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            country: Some("US".to_string()),
            weight_measure: None,
            top_k: 15,
            top_component_sizes: 10,
            distribution_bins: 50,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config = serde_json::from_str(&content).with_context(|| format!("parsing {path}"))?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
