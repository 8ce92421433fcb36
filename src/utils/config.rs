//! Configuration and constants for the readers and the CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// gprof2dot output
// Node labels are "module\nfunction\ninclusive%\n(exclusive%)\ncalls×",
// where "\n" is the two-character DOT escape, not a line break.
pub const LABEL_SEPARATOR: &str = "\\n";
pub const INCLUSIVE_LABEL_INDEX: usize = 2;
pub const EXCLUSIVE_LABEL_INDEX: usize = 3;
pub const MIN_LABEL_SEGMENTS: usize = 4;

// HPCToolkit experiment database layout
pub const EXPERIMENT_FILE: &str = "experiment.xml";
pub const METRIC_DB_EXTENSION: &str = "metric-db";

// metric-db header: tag, version, endianness, node count, metric count
pub const METRIC_DB_TAG_LEN: usize = 18;
pub const METRIC_DB_VERSION_LEN: usize = 5;
pub const METRIC_DB_HEADER_LEN: u64 = 32;
pub const BIG_ENDIAN_TAG: u8 = b'b';

/// Statement nodes are numbered from here, once per read
pub const FIRST_STATEMENT_NUMBER: u64 = 1;

// Output columns shared by both formats
pub const NODE_COLUMN: &str = "node";
pub const NAME_COLUMN: &str = "name";
pub const MODULE_COLUMN: &str = "module";

// gprof2dot columns
pub const INCLUSIVE_TIME_COLUMN: &str = "inc-time";
pub const EXCLUSIVE_TIME_COLUMN: &str = "exc-time";

// HPCToolkit columns
pub const NID_COLUMN: &str = "nid";
pub const RANK_COLUMN: &str = "rank";
pub const TYPE_COLUMN: &str = "type";
pub const FILE_COLUMN: &str = "file";
pub const LINE_COLUMN: &str = "line";
