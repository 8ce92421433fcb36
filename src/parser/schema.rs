//! Per-node metric records produced by the readers.
//!
//! Records are created once per parse event and never mutated afterwards;
//! they are joined to the structural graph through their `node` handle.

use crate::graph::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics of one gprof2dot node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotNodeRecord {
    /// Label line 0; `None` when the node was never declared
    pub module: Option<String>,

    pub name: String,

    /// Inclusive time, percent of total
    pub inc_time: Option<f64>,

    /// Exclusive time, percent of total
    pub exc_time: Option<f64>,

    pub node: NodeId,
}

/// Kind of element a call path profile node was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Procedure frame
    #[serde(rename = "PF")]
    ProcedureFrame,
    /// Inlined procedure
    #[serde(rename = "Pr")]
    Procedure,
    #[serde(rename = "L")]
    Loop,
    #[serde(rename = "S")]
    Statement,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProcedureFrame => "PF",
            Self::Procedure => "Pr",
            Self::Loop => "L",
            Self::Statement => "S",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural metadata of one HPCToolkit call path profile node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpcNodeRecord {
    /// Node id shared with the metric-db rows
    pub nid: u64,
    pub name: String,
    pub node_type: NodeType,
    pub file: String,
    pub line: String,
    /// Only procedure frames carry a load module
    pub module: Option<String>,
    pub node: NodeId,
}
