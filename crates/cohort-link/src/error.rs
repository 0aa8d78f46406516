//! Error types for the temporal join engine.

use thiserror::Error;

/// Errors raised by the attachment operations.
///
/// Every variant is fatal: a malformed input aborts the whole call with no
/// partial result. Expected data gaps (rows without a qualifying prior
/// record, filtered negative readings) are never errors; they surface as
/// nulls in the output and as `tracing` reports.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A required column is absent from one of the input tables.
    #[error("column '{column}' not found in {table} table")]
    MissingColumn { column: String, table: &'static str },

    /// The requested output column already exists on the cohort table.
    #[error("output column '{column}' already exists in goal table")]
    ColumnCollision { column: String },

    /// A source date value does not conform to YYYYMMDD.
    #[error("invalid date '{value}' in column '{column}' at row {row}: expected an 8-digit YYYYMMDD value")]
    DateFormat {
        column: String,
        row: usize,
        value: String,
    },

    /// The source date column holds a type that cannot carry compact dates.
    #[error("date column '{column}' has unsupported type {dtype}")]
    DateColumnType { column: String, dtype: String },

    /// A code root produced an invalid matching pattern.
    #[error("code root '{root}' produces an invalid match pattern")]
    Pattern {
        root: String,
        #[source]
        source: regex::Error,
    },

    /// An underlying DataFrame operation failed.
    #[error("frame operation failed: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display() {
        let err = LinkError::MissingColumn {
            column: "idp".to_string(),
            table: "goal",
        };
        insta::assert_snapshot!(err, @"column 'idp' not found in goal table");
    }

    #[test]
    fn date_format_display() {
        let err = LinkError::DateFormat {
            column: "dat".to_string(),
            row: 3,
            value: "2020".to_string(),
        };
        insta::assert_snapshot!(
            err,
            @"invalid date '2020' in column 'dat' at row 3: expected an 8-digit YYYYMMDD value"
        );
    }

    #[test]
    fn frame_error_wraps_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("x".into());
        let err: LinkError = polars_err.into();
        assert!(matches!(err, LinkError::Frame(_)));
    }
}
