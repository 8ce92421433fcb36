use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a report JSON file
///
/// Checks the schema version and that every node link, root and row
/// refers to a node listed in the report.
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Failed to load report {}", file_path.display()))?;
    report.validate().context("Report failed validation")?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Format: {}", report.format);
    println!("  Generated: {}", report.generated_at);
    println!("  Nodes: {} ({} roots)", report.nodes.len(), report.roots.len());
    println!("  Rows: {} x {} columns", report.rows.len(), report.columns.len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Callpath Graph v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call graph reconstruction for gprof2dot and HPCToolkit profiles.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::GraphFrame;
    use crate::output::{write_report, GraphFrameReport};

    #[test]
    fn test_validate_report_file() {
        let dot = "\t\"main\" [label=\"prog\\nmain\\n50.0%\\n(10.0%)\\n1×\"];\n";
        let frame = GraphFrame::from_gprof_dot_reader(dot.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&GraphFrameReport::from_frame(&frame), &path).unwrap();

        assert!(validate_report_file(&path).is_ok());
    }

    #[test]
    fn test_validate_report_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "{\"version\": 1}").unwrap();

        assert!(validate_report_file(&path).is_err());
    }
}
