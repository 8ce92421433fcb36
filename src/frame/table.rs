//! Row-indexed metric table.
//!
//! Rows are keyed by node identity (gprof2dot) or by node identity plus
//! process element (HPCToolkit). Every table carries a `node` column holding
//! the node handle itself for structural joins downstream.

use crate::graph::NodeId;
use std::collections::HashMap;
use std::fmt;

/// One cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Node(NodeId),
}

impl Value {
    /// Numeric view of `Int` and `Float` cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Null, Self::Float)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map_or(Self::Null, Self::Text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NaN"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Node(id) => write!(f, "{id}"),
        }
    }
}

/// Row index: node identity, plus the process element for per-PE tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub node: NodeId,
    pub rank: Option<u32>,
}

impl RowKey {
    pub fn node(node: NodeId) -> Self {
        Self { node, rank: None }
    }

    pub fn ranked(node: NodeId, rank: u32) -> Self {
        Self {
            node,
            rank: Some(rank),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    key: RowKey,
    values: Vec<Value>,
}

impl Row {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Table of metric rows with a hash index on [`RowKey`]
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    index: HashMap<RowKey, usize>,
}

impl MetricTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a row. A repeated key re-points the index at the new row.
    pub(crate) fn push(&mut self, key: RowKey, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.index.insert(key, self.rows.len());
        self.rows.push(Row { key, values });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn get(&self, key: &RowKey) -> Option<&Row> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    /// Cell at (`key`, `column`)
    pub fn value(&self, key: &RowKey, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.get(key).map(|row| &row.values[col])
    }

    /// Every cell of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row.values[col]).collect())
    }

    /// All rows of one node, ordered by rank
    pub fn rows_for_node(&self, node: NodeId) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.iter().filter(|r| r.key.node == node).collect();
        rows.sort_by_key(|r| r.key);
        rows
    }
}
