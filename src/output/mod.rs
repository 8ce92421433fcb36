//! Output writers for graph frames.
//!
//! This module handles:
//! - JSON reports (write, read back, validate)
//! - Indented text trees

pub mod json;
pub mod tree;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report, GraphFrameReport, ReportNode, ReportRow};
pub use tree::render_tree;
