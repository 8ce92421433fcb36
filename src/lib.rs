//! Callpath Graph
//!
//! Call graph reconstruction from profiler output: gprof2dot call graph
//! dumps and HPCToolkit experiment databases.
//!
//! Each reader builds a forest of call-path nodes and a metric table joined
//! onto it, exposed together as a [`GraphFrame`].
//!
//! ## Getting Started
//!
//! ```ignore
//! use callpath_graph::GraphFrame;
//!
//! let frame = GraphFrame::from_gprof_dot("callgraph.dot")?;
//! for &root in frame.graph.roots() {
//!     for id in frame.graph.traverse(root) {
//!         println!("{}", frame.graph.node(id).callpath());
//!     }
//! }
//! ```

pub mod commands;
pub mod frame;
pub mod graph;
pub mod output;
pub mod parser;
pub mod utils;

pub use frame::{GraphFrame, MetricTable, RowKey, SourceFormat, Value};
pub use graph::{Callpath, Graph, Node, NodeId};
