//! CSV table loading.

use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Rows sampled for schema inference. Registry extracts are homogeneous, so
/// a short window is enough to settle column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file into a DataFrame.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if let Err(source) = std::fs::metadata(path) {
        return Err(if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Check that every required column is present, naming the offending file.
pub fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
    for column in columns {
        if !df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == *column)
        {
            return Err(IngestError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Coerce a reference-date column to dtype `Date`.
///
/// Reference dates arrive from CSV as ISO `YYYY-MM-DD` strings; parsing is
/// strict, so a malformed value fails the load instead of turning into a
/// null that would silently unmatch the row downstream.
pub fn coerce_date_column(df: DataFrame, column: &str) -> Result<DataFrame> {
    let dtype = df.column(column)?.dtype().clone();
    match dtype {
        DataType::Date => Ok(df),
        DataType::String => {
            let coerced = df
                .lazy()
                .with_column(col(column).str().to_date(StrptimeOptions {
                    format: Some("%Y-%m-%d".into()),
                    strict: true,
                    ..Default::default()
                }))
                .collect()?;
            Ok(coerced)
        }
        other => Err(IngestError::NotADateColumn {
            column: column.to_string(),
            dtype: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_csv(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("table.csv");
        std::fs::write(&path, content).expect("write csv");
        (dir, path)
    }

    #[test]
    fn reads_table_with_header() {
        let (_dir, path) = write_csv("idp,t0\n1,2020-01-01\n2,2020-02-01\n");
        let df = read_table(&path).expect("read");
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_table(Path::new("/nonexistent/table.csv")).expect_err("missing file");
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = write_csv("idp,t0\n");
        let err = read_table(&path).expect_err("empty file");
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn require_columns_names_the_missing_one() {
        let (_dir, path) = write_csv("idp,t0\n1,2020-01-01\n");
        let df = read_table(&path).expect("read");
        let err = require_columns(&df, &["idp", "dat"], &path).expect_err("missing column");
        match err {
            IngestError::MissingColumn { column, .. } => assert_eq!(column, "dat"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coerces_iso_reference_dates() {
        let (_dir, path) = write_csv("idp,t0\n1,2020-01-01\n");
        let df = read_table(&path).expect("read");
        let df = coerce_date_column(df, "t0").expect("coerce");
        assert_eq!(df.column("t0").expect("column").dtype(), &DataType::Date);
    }

    #[test]
    fn rejects_numeric_reference_column() {
        let (_dir, path) = write_csv("idp,t0\n1,42\n");
        let df = read_table(&path).expect("read");
        let err = coerce_date_column(df, "t0").expect_err("numeric column");
        assert!(matches!(err, IngestError::NotADateColumn { .. }));
    }

    #[test]
    fn strict_coercion_fails_on_malformed_dates() {
        let (_dir, path) = write_csv("idp,t0\n1,2020-13-01\n");
        let df = read_table(&path).expect("read");
        assert!(coerce_date_column(df, "t0").is_err());
    }
}
