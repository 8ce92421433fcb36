//! Read command implementation.
//!
//! The read command:
//! 1. Builds a graph frame from the chosen input format
//! 2. Writes the JSON report
//! 3. Prints the call tree and phase timings

use super::models::{InputFormat, ReadArgs};
use crate::frame::GraphFrame;
use crate::output::{render_tree, write_report, GraphFrameReport};
use crate::utils::config::INCLUSIVE_TIME_COLUMN;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the read command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or structurally inconsistent input
/// * Report write errors
pub fn execute_read(args: ReadArgs) -> Result<GraphFrame> {
    let start_time = Instant::now();

    info!("Reading {:?} input: {}", args.format, args.input.display());

    // Step 1: Build the frame
    info!("Step 1/3: Building graph frame...");
    let frame = match args.format {
        InputFormat::Dot => GraphFrame::from_gprof_dot(&args.input).with_context(|| {
            format!("Failed to read gprof2dot file {}", args.input.display())
        })?,
        InputFormat::Hpctoolkit => GraphFrame::from_hpctoolkit(&args.input).with_context(|| {
            format!("Failed to read HPCToolkit database {}", args.input.display())
        })?,
    };

    info!(
        "Built {} nodes ({} roots), {} rows x {} columns",
        frame.graph.len(),
        frame.graph.roots().len(),
        frame.table.len(),
        frame.table.columns().len()
    );
    debug!("Columns: {}", frame.table.columns().join(", "));

    // Step 2: Write report (if requested)
    if let Some(path) = &args.output_json {
        info!("Step 2/3: Writing report...");
        let report = GraphFrameReport::from_frame(&frame);
        write_report(&report, path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", path.display());
    } else {
        info!("Step 2/3: Skipping report (no output path)");
    }

    // Step 3: Print tree (if requested)
    if args.print_tree {
        info!("Step 3/3: Rendering call tree...");
        let metric = resolve_metric(&args, &frame);
        println!("{}", render_tree(&frame, &metric));
    } else {
        info!("Step 3/3: Skipping call tree (not requested)");
    }

    if args.print_timings {
        println!("{}", frame.timer());
    }

    let elapsed = start_time.elapsed();
    info!("Read completed in {:.2}s", elapsed.as_secs_f64());

    Ok(frame)
}

/// Column shown in the tree: the explicit choice, else inclusive time for
/// DOT input and the first metric for HPCToolkit input.
///
/// **Private** - internal helper for execute_read
fn resolve_metric(args: &ReadArgs, frame: &GraphFrame) -> String {
    if let Some(metric) = &args.metric {
        return metric.clone();
    }
    match args.format {
        InputFormat::Dot => INCLUSIVE_TIME_COLUMN.to_string(),
        InputFormat::Hpctoolkit => frame
            .table
            .columns()
            .first()
            .cloned()
            .unwrap_or_default(),
    }
}

/// Validate read arguments
///
/// **Public** - can be called before execute_read for early validation
pub fn validate_args(args: &ReadArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    match args.format {
        InputFormat::Dot if !args.input.is_file() => {
            anyhow::bail!("DOT input must be a file: {}", args.input.display());
        }
        InputFormat::Hpctoolkit if !args.input.is_dir() => {
            anyhow::bail!(
                "HPCToolkit input must be a database directory: {}",
                args.input.display()
            );
        }
        _ => {}
    }

    if args.metric.as_deref().is_some_and(str::is_empty) {
        anyhow::bail!("Metric column name cannot be empty");
    }

    if let Some(output) = &args.output_json {
        if output.is_dir() {
            anyhow::bail!("Output path is a directory: {}", output.display());
        }
    }

    Ok(())
}
