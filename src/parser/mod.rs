//! Profiler output readers and record definitions.
//!
//! This module handles:
//! - Matching gprof2dot DOT lines and node labels
//! - Loading HPCToolkit experiment documents and lookup tables
//! - Decoding big-endian metric-db files
//! - Walking the call path profile into a call graph

pub mod experiment;
pub mod gprof_dot;
pub mod hpctoolkit;
pub mod metric_db;
pub mod schema;

// Re-export main types
pub use experiment::{LookupTables, Table};
pub use gprof_dot::{parse_gprof_dot, read_gprof_dot, DotGraph, DotParseStats, GprofDotReader};
pub use hpctoolkit::{build_tree, load_experiment, CallTree};
pub use metric_db::{find_metric_dbs, read_metric_dbs, MetricDbHeader, MetricStore};
pub use schema::{DotNodeRecord, HpcNodeRecord, NodeType};
