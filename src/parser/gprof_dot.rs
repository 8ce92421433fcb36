//! Reader for call graphs in DOT format generated by gprof2dot.
//!
//! Input is scanned line by line. A line is an edge record, a node record,
//! or noise (graph attributes, braces) that is ignored:
//!
//! ```text
//!  "main" [color="#ff0000", label="prog\nmain\n50.0%\n(10.0%)\n1×"];
//!  "main" -> "foo" [color="#0000ff", label="40.0%\n3×"];
//! ```
//!
//! Edges may name nodes that have not been declared yet, so node identities
//! are created lazily from a name-keyed registry. Once all lines are read,
//! roots are collected and callpaths corrected.

use super::schema::DotNodeRecord;
use crate::graph::{correct_callpaths, Graph, NodeId};
use crate::utils::config::{
    EXCLUSIVE_LABEL_INDEX, INCLUSIVE_LABEL_INDEX, LABEL_SEPARATOR, MIN_LABEL_SEGMENTS,
};
use crate::utils::error::{DotError, RecordError};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

static EDGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s"?([\w() @.']+)"?\s->\s"?([\w() @.']+)"?\s\[.*label="(.*)×".*\];"#)
        .expect("edge pattern is a valid regex")
});

static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s"?([\w() @.']+)"?\s\[.*label="(.*)×".*\];"#)
        .expect("node pattern is a valid regex")
});

/// An edge line: `src -> dst` plus its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine<'a> {
    pub src: &'a str,
    pub dst: &'a str,
    pub label: &'a str,
}

/// A node declaration line: name plus its raw label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLine<'a> {
    pub name: &'a str,
    pub label: &'a str,
}

/// Values carried by a well-formed node label
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub module: String,
    pub inc_time: f64,
    pub exc_time: f64,
}

/// Counters for one read
#[derive(Debug, Clone, Default)]
pub struct DotParseStats {
    pub lines: usize,
    pub edges: usize,
    pub nodes: usize,
    /// Malformed records that were skipped
    pub skipped: Vec<RecordError>,
}

/// Result of reading one DOT file
#[derive(Debug, Clone)]
pub struct DotGraph {
    pub graph: Graph,
    /// One record per graph node, in node creation order
    pub records: Vec<DotNodeRecord>,
    pub stats: DotParseStats,
}

/// Match an edge record
pub fn match_edge(line: &str) -> Option<EdgeLine<'_>> {
    let caps = EDGE_RE.captures(line)?;
    Some(EdgeLine {
        src: caps.get(1)?.as_str(),
        dst: caps.get(2)?.as_str(),
        label: caps.get(3)?.as_str(),
    })
}

/// Match a node record. Edge lines never match.
pub fn match_node(line: &str) -> Option<NodeLine<'_>> {
    let caps = NODE_RE.captures(line)?;
    Some(NodeLine {
        name: caps.get(1)?.as_str(),
        label: caps.get(2)?.as_str(),
    })
}

/// Extract module and percentages from a node label.
///
/// Segment 2 must look like `<float>%...` and segment 3 like `(<float>%)...`.
pub fn parse_node_label(line: usize, name: &str, label: &str) -> Result<NodeLabel, RecordError> {
    let segments: Vec<&str> = label.split(LABEL_SEPARATOR).collect();
    if segments.len() < MIN_LABEL_SEGMENTS {
        return Err(RecordError::ShortLabel {
            line,
            name: name.to_string(),
            found: segments.len(),
        });
    }

    let inc_text = segments[INCLUSIVE_LABEL_INDEX];
    let inc_value = inc_text.rfind('%').map(|end| &inc_text[..end]);
    let inc_time = parse_percent(line, name, "inclusive", inc_text, inc_value)?;

    let exc_text = segments[EXCLUSIVE_LABEL_INDEX];
    let exc_value = exc_text
        .strip_prefix('(')
        .and_then(|rest| rest.rfind("%)").map(|end| &rest[..end]));
    let exc_time = parse_percent(line, name, "exclusive", exc_text, exc_value)?;

    Ok(NodeLabel {
        module: segments[0].to_string(),
        inc_time,
        exc_time,
    })
}

/// **Private** - shared by both percentage fields
fn parse_percent(
    line: usize,
    name: &str,
    field: &'static str,
    text: &str,
    value: Option<&str>,
) -> Result<f64, RecordError> {
    let value = value.ok_or_else(|| RecordError::MissingPercent {
        line,
        name: name.to_string(),
        field,
        text: text.to_string(),
    })?;

    value
        .trim()
        .parse::<f64>()
        .map_err(|_| RecordError::InvalidPercent {
            line,
            name: name.to_string(),
            field,
            text: text.to_string(),
        })
}

/// Incremental gprof2dot reader.
///
/// Owns all per-read state, so independent reads never share anything.
#[derive(Debug, Default)]
pub struct GprofDotReader {
    graph: Graph,
    name_to_node: HashMap<String, NodeId>,
    labels: HashMap<NodeId, NodeLabel>,
    stats: DotParseStats,
}

impl GprofDotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; `line_no` is 1-based and only used in diagnostics
    pub fn read_line(&mut self, line_no: usize, line: &str) {
        self.stats.lines += 1;

        if let Some(edge) = match_edge(line) {
            self.add_edge(edge.src, edge.dst);
            self.stats.edges += 1;
        } else if let Some(decl) = match_node(line) {
            match parse_node_label(line_no, decl.name, decl.label) {
                Ok(label) => {
                    let id = self.node_for(decl.name);
                    if self.labels.insert(id, label).is_some() {
                        debug!("Node '{}' declared again on line {}", decl.name, line_no);
                    }
                    self.stats.nodes += 1;
                }
                Err(e) => {
                    warn!("Skipping malformed node record: {}", e);
                    self.stats.skipped.push(e);
                }
            }
        }
    }

    /// Collect roots, correct callpaths and emit one record per node
    pub fn finish(mut self) -> Result<DotGraph, DotError> {
        self.graph.collect_roots();
        correct_callpaths(&mut self.graph)?;

        let records = self
            .graph
            .iter()
            .map(|(id, node)| {
                let label = self.labels.remove(&id);
                DotNodeRecord {
                    module: label.as_ref().map(|l| l.module.clone()),
                    name: node.segment().to_string(),
                    inc_time: label.as_ref().map(|l| l.inc_time),
                    exc_time: label.as_ref().map(|l| l.exc_time),
                    node: id,
                }
            })
            .collect();

        debug!(
            "Read {} lines: {} edges, {} node records, {} skipped, {} roots",
            self.stats.lines,
            self.stats.edges,
            self.stats.nodes,
            self.stats.skipped.len(),
            self.graph.roots().len()
        );

        Ok(DotGraph {
            graph: self.graph,
            records,
            stats: self.stats,
        })
    }

    /// **Private** - get-or-create a tentative root for `name`
    fn node_for(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_to_node.get(name) {
            return id;
        }
        let id = self.graph.add_node(name, None);
        self.name_to_node.insert(name.to_string(), id);
        id
    }

    /// **Private** - register `src -> dst`, creating either end on first sight
    fn add_edge(&mut self, src_name: &str, dst_name: &str) {
        let src = self.node_for(src_name);
        match self.name_to_node.get(dst_name) {
            Some(&dst) => self.graph.add_edge(src, dst),
            None => {
                let dst = self.graph.add_node(dst_name, Some(src));
                self.name_to_node.insert(dst_name.to_string(), dst);
            }
        }
    }
}

/// Parse a DOT call graph from any buffered reader.
///
/// Lines are decoded lossily, so stray non-UTF-8 bytes only affect the
/// line they appear on.
pub fn parse_gprof_dot<R: BufRead>(mut reader: R) -> Result<DotGraph, DotError> {
    let mut parser = GprofDotReader::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| DotError::ReadLine {
                line: line_no + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;
        parser.read_line(line_no, &String::from_utf8_lossy(&buf));
    }

    parser.finish()
}

/// Read a DOT call graph file
///
/// **Public** - main entry point for gprof2dot input
///
/// # Errors
/// * `DotError::Io` - file cannot be opened
/// * `DotError::ReadLine` - read failure mid-file
/// * `DotError::Graph` - nodes unreachable from any root
pub fn read_gprof_dot(path: impl AsRef<Path>) -> Result<DotGraph, DotError> {
    let path = path.as_ref();
    debug!("Reading gprof2dot call graph: {}", path.display());

    let file = File::open(path).map_err(|source| DotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_gprof_dot(BufReader::new(file))
}
