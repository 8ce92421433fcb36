//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Structural inconsistencies detected while assembling a forest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{} node(s) unreachable from any root: {}", .0.len(), .0.join(", "))]
    Unreachable(Vec<String>),

    #[error("Graph has no root nodes")]
    NoRoots,
}

/// A single malformed gprof2dot record.
///
/// Never fatal: the reader logs it, counts it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("line {line}: node '{name}' label has {found} segment(s), expected at least 4")]
    ShortLabel {
        line: usize,
        name: String,
        found: usize,
    },

    #[error("line {line}: node '{name}' has no {field} percentage in '{text}'")]
    MissingPercent {
        line: usize,
        name: String,
        field: &'static str,
        text: String,
    },

    #[error("line {line}: node '{name}' has non-numeric {field} percentage '{text}'")]
    InvalidPercent {
        line: usize,
        name: String,
        field: &'static str,
        text: String,
    },
}

/// Errors that abort a gprof2dot read
#[derive(Error, Debug)]
pub enum DotError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read line {line}: {source}")]
    ReadLine {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Inconsistent call graph: {0}")]
    Graph(#[from] GraphError),
}

/// Errors that abort an HPCToolkit experiment read.
///
/// There is no partial-success mode for this format.
#[derive(Error, Debug)]
pub enum HpcError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed experiment document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Experiment document has no <{0}> section")]
    MissingSection(&'static str),

    #[error("Call path profile has no top-level <PF> element")]
    MissingRoot,

    #[error("<{tag}> element has no '{attr}' attribute")]
    MissingAttribute { tag: String, attr: &'static str },

    #[error("<{tag}> element has invalid '{attr}' value '{value}'")]
    InvalidAttribute {
        tag: String,
        attr: &'static str,
        value: String,
    },

    #[error("Unknown {table} id '{id}'")]
    UnknownId { table: &'static str, id: String },

    #[error("Invalid metric-db pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No *.metric-db files found in {0}")]
    NoMetricFiles(PathBuf),

    #[error("{path}: unsupported endianness tag {tag:#04x}, only big-endian ('b') is supported")]
    UnsupportedEndianness { path: PathBuf, tag: u8 },

    #[error("{path}: invalid {field} {value} in header")]
    InvalidHeader {
        path: PathBuf,
        field: &'static str,
        value: i32,
    },

    #[error("{path}: truncated metric-db, expected {expected} values, found {found}")]
    Truncated {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Metric store of {node_count} nodes x {metric_count} metrics x {pe_count} PE(s) is too large")]
    StoreTooLarge {
        node_count: usize,
        metric_count: usize,
        pe_count: usize,
    },

    #[error("{path}: header declares {stored} metrics but the experiment names {named}")]
    MetricCountMismatch {
        path: PathBuf,
        stored: usize,
        named: usize,
    },

    #[error("Node id {nid} is outside the metric store (1..={node_count})")]
    NidOutOfRange { nid: u64, node_count: usize },

    #[error("Inconsistent call graph: {0}")]
    Graph(#[from] GraphError),
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Unsupported report schema version {found} (expected {expected})")]
    SchemaMismatch {
        found: String,
        expected: &'static str,
    },

    #[error("Inconsistent report: {0}")]
    InvalidReport(String),
}
