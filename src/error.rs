//! Fatal input errors.
//!
//! Everything else the pipeline encounters (bad station codes, self-loops,
//! unparsable numbers, dangling edges) is filtered and logged instead.

use thiserror::Error;

/// A required column is missing from an input table.
///
/// Raised before any row of the table is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column '{column}' in {table}")]
    MissingColumn { table: String, column: String },
    #[error("{table} has no header row")]
    NoHeader { table: String },
}

impl SchemaError {
    pub fn missing(table: &str, column: &str) -> Self {
        Self::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
