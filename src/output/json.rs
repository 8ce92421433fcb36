//! JSON report writer.
//!
//! A [`GraphFrame`] is flattened into a [`GraphFrameReport`]: the forest as a
//! node list with index links, and the metric table with its `node` cells
//! rendered as callpath strings.

use crate::frame::{GraphFrame, SourceFormat, Value};
use crate::graph::{Callpath, NodeId};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serialisable snapshot of one graph frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFrameReport {
    /// Report schema version
    pub version: String,
    pub format: SourceFormat,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub roots: Vec<NodeId>,
    pub nodes: Vec<ReportNode>,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub id: NodeId,
    pub name: String,
    pub callpath: Callpath,
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub node: NodeId,
    /// Process element, HPCToolkit only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub values: Vec<serde_json::Value>,
}

impl GraphFrameReport {
    /// Snapshot a frame
    ///
    /// **Public** - used by the read command before writing
    pub fn from_frame(frame: &GraphFrame) -> Self {
        let graph = &frame.graph;

        let nodes = graph
            .iter()
            .map(|(id, node)| ReportNode {
                id,
                name: node.segment().to_string(),
                callpath: node.callpath().clone(),
                parents: node.parents().to_vec(),
                children: node.children().to_vec(),
            })
            .collect();

        let rows = frame
            .table
            .rows()
            .map(|row| ReportRow {
                node: row.key().node,
                rank: row.key().rank,
                values: row
                    .values()
                    .iter()
                    .map(|value| cell_to_json(value, frame))
                    .collect(),
            })
            .collect();

        Self {
            version: SCHEMA_VERSION.to_string(),
            format: frame.format,
            generated_at: Utc::now().to_rfc3339(),
            roots: graph.roots().to_vec(),
            nodes,
            columns: frame.table.columns().to_vec(),
            rows,
        }
    }

    /// Check schema version and internal consistency of a loaded report
    ///
    /// # Errors
    /// * `OutputError::SchemaMismatch` - written by an incompatible version
    /// * `OutputError::InvalidReport` - dangling node ids, misplaced roots
    ///   or rows whose width differs from the column list
    pub fn validate(&self) -> Result<(), OutputError> {
        if self.version != SCHEMA_VERSION {
            return Err(OutputError::SchemaMismatch {
                found: self.version.clone(),
                expected: SCHEMA_VERSION,
            });
        }

        let count = self.nodes.len();
        let known = |id: &NodeId| id.index() < count;

        for (position, node) in self.nodes.iter().enumerate() {
            if node.id.index() != position {
                return Err(OutputError::InvalidReport(format!(
                    "node {} listed at position {}",
                    node.id, position
                )));
            }
            if let Some(bad) = node.parents.iter().chain(&node.children).find(|id| !known(*id)) {
                return Err(OutputError::InvalidReport(format!(
                    "node {} links to unknown node {}",
                    node.id, bad
                )));
            }
        }

        for root in &self.roots {
            let is_root = self
                .nodes
                .get(root.index())
                .is_some_and(|node| node.parents.is_empty());
            if !is_root {
                return Err(OutputError::InvalidReport(format!(
                    "root {} is unknown or has parents",
                    root
                )));
            }
        }

        for row in &self.rows {
            if !known(&row.node) {
                return Err(OutputError::InvalidReport(format!(
                    "row references unknown node {}",
                    row.node
                )));
            }
            if row.values.len() != self.columns.len() {
                return Err(OutputError::InvalidReport(format!(
                    "row of node {} has {} values for {} columns",
                    row.node,
                    row.values.len(),
                    self.columns.len()
                )));
            }
        }

        Ok(())
    }
}

/// Render one table cell. Node handles become their callpath; NaN becomes null.
///
/// **Private** - internal conversion for `from_frame`
fn cell_to_json(value: &Value, frame: &GraphFrame) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Int(v) => serde_json::Value::from(*v),
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Node(id) => frame
            .graph
            .get(*id)
            .map_or(serde_json::Value::Null, |node| {
                serde_json::Value::String(node.callpath().to_string())
            }),
    }
}

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(
    report: &GraphFrameReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialise a report without touching the filesystem
pub fn report_to_string(report: &GraphFrameReport) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a report from a JSON file
///
/// **Public** - used by the validate command and tests
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<GraphFrameReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: GraphFrameReport =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Report loaded: version {}, {} nodes, {} rows",
        report.version,
        report.nodes.len(),
        report.rows.len()
    );

    Ok(report)
}
