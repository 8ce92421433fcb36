//! Utility modules for configuration, error handling, and timing.

pub mod config;
pub mod error;
pub mod timer;

// Re-export commonly used error types for convenience
pub use error::{DotError, GraphError, HpcError, OutputError, RecordError};
pub use timer::PhaseTimer;
