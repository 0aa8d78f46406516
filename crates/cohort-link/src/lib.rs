//! Temporal record linkage for clinical observation tables.
//!
//! For each (subject, reference-date) row of a cohort table, the engine
//! attaches the latest qualifying source observation dated strictly before
//! the reference date:
//!
//! - [`attach_latest_value`] carries the observed value itself (lab results,
//!   status readings), with a non-negative validity filter for numeric
//!   columns.
//! - [`attach_latest_diagnosis`] carries a presence flag derived from
//!   diagnosis-code matching (exact codes or hierarchical roots).
//!
//! Both operations are left-preserving: the returned frame has the same row
//! count and row order as the cohort table, plus exactly one new column.
//! Unmatched rows hold nulls; unmatched and filtered row counts are reported
//! through `tracing`.

pub mod attach;
pub mod codes;
pub mod dates;
pub mod error;
pub mod spec;

pub use attach::{attach_latest_diagnosis, attach_latest_value};
pub use codes::CodeMatcher;
pub use dates::parse_compact_date_column;
pub use error::{LinkError, Result};
pub use spec::{
    DEFAULT_DIAGNOSIS_COLUMN, DEFAULT_ID_COLUMN, DEFAULT_REFERENCE_COLUMN, LatestDiagnosisSpec,
    LatestValueSpec, NegativeFilter, ValueKind,
};
