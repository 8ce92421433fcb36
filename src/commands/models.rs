use clap::ValueEnum;
use std::path::PathBuf;

/// Profiler output accepted by the read command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// gprof2dot call graph (a DOT file)
    Dot,
    /// HPCToolkit database directory
    Hpctoolkit,
}

/// Arguments for the read command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReadArgs {
    /// DOT file or database directory
    pub input: PathBuf,

    pub format: InputFormat,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print the indented call tree to stdout
    pub print_tree: bool,

    /// Column shown in the tree; defaults per format
    pub metric: Option<String>,

    /// Print phase timings to stdout
    pub print_timings: bool,
}

impl Default for ReadArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            format: InputFormat::Dot,
            output_json: None,
            print_tree: false,
            metric: None,
            print_timings: false,
        }
    }
}
