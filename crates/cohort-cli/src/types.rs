//! Result types shared between subcommands and summary rendering.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of one attachment run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Which operation ran ("value" or "diagnosis").
    pub operation: String,
    /// Name of the attached column.
    pub output_column: String,
    /// Rows in the output table (equals the input cohort table).
    pub rows: usize,
    /// Rows with a qualifying prior record.
    pub attached: usize,
    /// Rows with no qualifying prior record.
    pub missing: usize,
    /// Where the output CSV was written.
    pub output_path: PathBuf,
}
