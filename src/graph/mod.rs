//! Call graph model shared by every reader.
//!
//! This module handles:
//! - Node identity (callpath, parent and child links)
//! - The forest arena and its depth-first traversal
//! - Callpath correction once all edges are known

pub mod corrector;
pub mod forest;
pub mod node;

// Re-export main types
pub use corrector::correct_callpaths;
pub use forest::{Graph, Traverse};
pub use node::{Callpath, Node, NodeId};
