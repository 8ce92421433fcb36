//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod read;
pub mod utils;

// Re-export main command functions
pub use models::{InputFormat, ReadArgs};
pub use read::{execute_read, validate_args};
pub use utils::{display_version, validate_report_file};
