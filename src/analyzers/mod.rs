//! Structural analysis of the airport graph.
//!
//! Each analyzer borrows the graph read-only and returns its own per-node
//! mapping; [`analyzer::analyze`] runs all of them and builds the summary
//! report.

pub mod analyzer;
pub mod centrality;
pub mod clustering;
pub mod components;
pub mod types;
pub mod utility;
