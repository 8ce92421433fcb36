//! Graph assembly: a call graph forest plus its joined metric table.
//!
//! Both input formats end up here through independent readers that share
//! only this output contract:
//! - gprof2dot: one row per node, keyed by node
//! - HPCToolkit: one row per (node, process element)

pub mod join;
pub mod table;

pub use join::{join_dot, join_hpctoolkit};
pub use table::{MetricTable, Row, RowKey, Value};

use crate::graph::{Graph, NodeId};
use crate::parser::experiment::LookupTables;
use crate::parser::gprof_dot::{parse_gprof_dot, read_gprof_dot, DotGraph};
use crate::parser::hpctoolkit::{build_tree, load_experiment};
use crate::parser::metric_db::{find_metric_dbs, read_metric_dbs};
use crate::utils::error::{DotError, HpcError};
use crate::utils::timer::PhaseTimer;
use log::info;
use roxmltree::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::Path;

/// Profiler output a frame was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    GprofDot,
    Hpctoolkit,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GprofDot => "gprof-dot",
            Self::Hpctoolkit => "hpctoolkit",
        })
    }
}

/// A call graph forest and the metric table joined onto it
#[derive(Debug, Clone)]
pub struct GraphFrame {
    pub graph: Graph,
    pub table: MetricTable,
    pub format: SourceFormat,
    timer: PhaseTimer,
}

impl GraphFrame {
    /// Build a frame from a gprof2dot DOT file
    ///
    /// **Public** - main entry point for gprof2dot input
    ///
    /// # Errors
    /// I/O failures and structural inconsistencies. Malformed records are
    /// skipped, never reported here.
    pub fn from_gprof_dot(path: impl AsRef<Path>) -> Result<Self, DotError> {
        let mut timer = PhaseTimer::new();
        let dot = timer.phase("graph construction", || read_gprof_dot(path))?;
        Ok(Self::assemble_dot(dot, timer))
    }

    /// Same as [`GraphFrame::from_gprof_dot`] for an in-memory or piped source
    pub fn from_gprof_dot_reader<R: BufRead>(reader: R) -> Result<Self, DotError> {
        let mut timer = PhaseTimer::new();
        let dot = timer.phase("graph construction", || parse_gprof_dot(reader))?;
        Ok(Self::assemble_dot(dot, timer))
    }

    /// Build a frame from an HPCToolkit database directory
    ///
    /// **Public** - main entry point for HPCToolkit input
    ///
    /// # Errors
    /// Any document, lookup, or metric-db failure aborts the whole build;
    /// no partial frame is returned.
    pub fn from_hpctoolkit(dir: impl AsRef<Path>) -> Result<Self, HpcError> {
        let dir = dir.as_ref();
        let mut timer = PhaseTimer::new();

        let xml = load_experiment(dir)?;
        let doc = Document::parse(&xml)?;
        let tables = timer.phase("fill tables", || LookupTables::from_document(&doc))?;

        let (header, store) = timer.phase("metric decoding", || {
            let paths = find_metric_dbs(dir)?;
            read_metric_dbs(&paths, tables.metric_columns())
        })?;
        info!(
            "Decoded {} nodes x {} metrics for {} process element(s)",
            header.node_count,
            header.metric_count,
            store.pe_count()
        );

        let tree = timer.phase("graph construction", || build_tree(&doc, &tables))?;
        let table = timer.phase("data frame", || join_hpctoolkit(&store, &tree.records))?;

        Ok(Self {
            graph: tree.graph,
            table,
            format: SourceFormat::Hpctoolkit,
            timer,
        })
    }

    /// **Private** - shared tail of both gprof2dot constructors
    fn assemble_dot(dot: DotGraph, mut timer: PhaseTimer) -> Self {
        let DotGraph {
            graph,
            records,
            stats,
        } = dot;
        if !stats.skipped.is_empty() {
            info!("Skipped {} malformed record(s)", stats.skipped.len());
        }
        let table = timer.phase("data frame", || join_dot(&records));

        Self {
            graph,
            table,
            format: SourceFormat::GprofDot,
            timer,
        }
    }

    /// Time spent in each construction phase
    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    /// Nodes whose own frame name is `name`
    pub fn find(&self, name: &str) -> Vec<NodeId> {
        self.graph
            .iter()
            .filter(|(_, node)| node.segment() == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Numeric cell of `node` in `column`, from its lowest-ranked row
    pub fn metric(&self, node: NodeId, column: &str) -> Option<f64> {
        let col = self.table.column_index(column)?;
        self.table
            .rows_for_node(node)
            .first()
            .and_then(|row| row.values()[col].as_f64())
    }
}
