//! Callpath Graph CLI
//!
//! Reconstructs call graphs from gprof2dot DOT files and HPCToolkit
//! databases, and exports them as JSON reports or indented trees.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use callpath_graph::commands::{
    display_version, execute_read, validate_args, validate_report_file, InputFormat, ReadArgs,
};

/// Callpath Graph - call graph reconstruction from profiler output
#[derive(Parser, Debug)]
#[command(name = "callpath")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a call graph from profiler output
    Read {
        /// Input format
        #[arg(short, long, value_enum)]
        format: InputFormat,

        /// DOT file or HPCToolkit database directory
        #[arg(env = "CALLPATH_INPUT")]
        input: PathBuf,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the call tree to stdout
        #[arg(long)]
        tree: bool,

        /// Column shown in the tree
        #[arg(short, long)]
        metric: Option<String>,

        /// Print phase timings to stdout
        #[arg(long)]
        timings: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Read {
            format,
            input,
            output,
            tree,
            metric,
            timings,
        } => {
            let args = ReadArgs {
                input,
                format,
                output_json: output,
                print_tree: tree,
                metric,
                print_timings: timings,
            };

            // Validate args first
            validate_args(&args)?;

            execute_read(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
