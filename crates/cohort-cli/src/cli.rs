//! CLI argument definitions for the cohort linkage tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cohort-link",
    version,
    about = "Temporal record linkage for clinical observation tables",
    long_about = "Attach the most recent qualifying prior observation to each\n\
                  (subject, reference-date) row of a cohort table.\n\n\
                  Source observation dates are 8-digit YYYYMMDD values;\n\
                  reference dates are ISO YYYY-MM-DD. The output is the input\n\
                  cohort table plus one attached column."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Attach the latest prior value of a measurement column.
    Value(ValueArgs),

    /// Attach a presence flag for diagnosis codes recorded before the
    /// reference date.
    Diagnosis(DiagnosisArgs),
}

#[derive(Parser)]
pub struct ValueArgs {
    /// Cohort table CSV with identifier and reference-date columns.
    #[arg(long, value_name = "PATH")]
    pub goal: PathBuf,

    /// Observation table CSV with identifier, date, and value columns.
    #[arg(long, value_name = "PATH")]
    pub data: PathBuf,

    /// Output CSV path.
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Date column in the observation table (YYYYMMDD values).
    #[arg(long = "date-col", value_name = "COLUMN")]
    pub date_col: String,

    /// Reference-date column in the cohort table (ISO dates).
    #[arg(long = "ref-date-col", value_name = "COLUMN")]
    pub reference_date_col: String,

    /// Value column to attach.
    #[arg(long = "value-col", value_name = "COLUMN")]
    pub value_col: String,

    /// Name for the attached column (defaults to the value column name).
    #[arg(long = "output-col", value_name = "COLUMN")]
    pub output_col: Option<String>,

    /// Subject identifier column, present in both tables.
    #[arg(long = "id-col", value_name = "COLUMN", default_value = "idp")]
    pub id_col: String,

    /// Semantic type of the value column (inferred from the loaded data
    /// when omitted).
    ///
    /// Numeric values pass through the non-negative validity filter;
    /// categorical values are attached unchanged.
    #[arg(long = "value-kind", value_enum)]
    pub value_kind: Option<ValueKindArg>,

    /// When the non-negative filter runs relative to latest-record selection.
    ///
    /// 'post' reproduces the historical behavior: a subject whose latest
    /// observation is negative gets a missing result. 'pre' removes negative
    /// values from candidacy so earlier valid observations can match.
    #[arg(long = "negative-filter", value_enum, default_value = "post")]
    pub negative_filter: NegativeFilterArg,

    /// Print the run summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct DiagnosisArgs {
    /// Cohort table CSV with identifier and reference-date columns.
    #[arg(long, value_name = "PATH")]
    pub goal: PathBuf,

    /// Diagnostics table CSV with identifier, code, and date columns.
    #[arg(long, value_name = "PATH")]
    pub data: PathBuf,

    /// Output CSV path.
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Diagnosis-code column in the diagnostics table.
    #[arg(long = "code-col", value_name = "COLUMN")]
    pub code_col: String,

    /// Date column in the diagnostics table (YYYYMMDD values).
    #[arg(long = "date-col", value_name = "COLUMN")]
    pub date_col: String,

    /// Exact diagnosis code to match (repeatable).
    #[arg(long = "code", value_name = "CODE")]
    pub fixed_codes: Vec<String>,

    /// Hierarchical code root to match (repeatable); a root covers itself
    /// and any subcode formed by appending a decimal point and digits.
    #[arg(long = "code-root", value_name = "ROOT")]
    pub code_roots: Vec<String>,

    /// Reference-date column in the cohort table (ISO dates).
    #[arg(long = "ref-date-col", value_name = "COLUMN", default_value = "t0")]
    pub reference_date_col: String,

    /// Name for the attached flag column.
    #[arg(long = "output-col", value_name = "COLUMN", default_value = "diagnosis")]
    pub output_col: String,

    /// Subject identifier column, present in both tables.
    #[arg(long = "id-col", value_name = "COLUMN", default_value = "idp")]
    pub id_col: String,

    /// Print the run summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// Semantic type choices for the value column.
#[derive(Clone, Copy, ValueEnum)]
pub enum ValueKindArg {
    Numeric,
    Categorical,
}

/// Ordering choices for the non-negative filter.
#[derive(Clone, Copy, ValueEnum)]
pub enum NegativeFilterArg {
    Post,
    Pre,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
