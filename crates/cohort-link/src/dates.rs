//! Compact-date parsing for source observation tables.
//!
//! Registry extracts carry observation dates as 8-digit `YYYYMMDD` values,
//! sometimes as strings and sometimes as plain integers. Parsing replaces
//! the column with a dtype `Date` column of the same name; any value that is
//! not a valid 8-digit calendar date aborts the call.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{LinkError, Result};

const COMPACT_FORMAT: &str = "%Y%m%d";

/// Parse an 8-digit `YYYYMMDD` column into a `Date` column of the same name.
///
/// Integer columns are stringified first, matching the boundary convention.
/// Missing values are format errors: a source observation without a date can
/// never participate in temporal selection and indicates a broken extract.
pub fn parse_compact_date_column(df: &DataFrame, column: &str) -> Result<Column> {
    let source = df.column(column)?;
    let source = if source.dtype().is_integer() {
        source.cast(&DataType::String)?
    } else {
        source.clone()
    };
    let Ok(values) = source.str() else {
        return Err(LinkError::DateColumnType {
            column: column.to_string(),
            dtype: source.dtype().to_string(),
        });
    };

    let epoch = NaiveDate::default();
    let mut days: Vec<i32> = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let Some(text) = value else {
            return Err(date_format_error(column, row, "<missing>"));
        };
        let text = text.trim();
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(date_format_error(column, row, text));
        }
        let date = NaiveDate::parse_from_str(text, COMPACT_FORMAT)
            .map_err(|_| date_format_error(column, row, text))?;
        days.push(date.signed_duration_since(epoch).num_days() as i32);
    }

    let parsed = Int32Chunked::from_vec(column.into(), days)
        .into_series()
        .cast(&DataType::Date)?;
    Ok(parsed.into_column())
}

fn date_format_error(column: &str, row: usize, value: &str) -> LinkError {
    LinkError::DateFormat {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(year: i32, month: u32, day: u32) -> i32 {
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .signed_duration_since(NaiveDate::default())
            .num_days() as i32
    }

    fn frame_with(column: Column) -> DataFrame {
        DataFrame::new(vec![column]).expect("frame")
    }

    #[test]
    fn parses_string_dates() {
        let df = frame_with(Column::new("dat".into(), ["20200105", "19991231"]));
        let parsed = parse_compact_date_column(&df, "dat").expect("parse");
        assert_eq!(parsed.dtype(), &DataType::Date);
        assert_eq!(parsed.get(0).expect("value"), AnyValue::Date(days(2020, 1, 5)));
        assert_eq!(parsed.get(1).expect("value"), AnyValue::Date(days(1999, 12, 31)));
    }

    #[test]
    fn parses_integer_dates() {
        let df = frame_with(Column::new("dat".into(), [20200105i64, 20211120]));
        let parsed = parse_compact_date_column(&df, "dat").expect("parse");
        assert_eq!(parsed.get(0).expect("value"), AnyValue::Date(days(2020, 1, 5)));
        assert_eq!(parsed.get(1).expect("value"), AnyValue::Date(days(2021, 11, 20)));
    }

    #[test]
    fn rejects_short_values() {
        let df = frame_with(Column::new("dat".into(), ["2020015"]));
        let err = parse_compact_date_column(&df, "dat").expect_err("short value");
        assert!(matches!(err, LinkError::DateFormat { row: 0, .. }));
    }

    #[test]
    fn rejects_non_digit_values() {
        let df = frame_with(Column::new("dat".into(), ["20200105", "2020-1-5"]));
        let err = parse_compact_date_column(&df, "dat").expect_err("non-digit value");
        assert!(matches!(err, LinkError::DateFormat { row: 1, .. }));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        let df = frame_with(Column::new("dat".into(), ["20200230"]));
        let err = parse_compact_date_column(&df, "dat").expect_err("impossible date");
        assert!(matches!(err, LinkError::DateFormat { .. }));
    }

    #[test]
    fn rejects_missing_values() {
        let df = frame_with(Column::new("dat".into(), [Some("20200105"), None]));
        let err = parse_compact_date_column(&df, "dat").expect_err("missing value");
        assert!(matches!(err, LinkError::DateFormat { row: 1, .. }));
    }

    #[test]
    fn rejects_unsupported_column_types() {
        let df = frame_with(Column::new("dat".into(), [1.5f64, 2.5]));
        let err = parse_compact_date_column(&df, "dat").expect_err("float column");
        assert!(matches!(err, LinkError::DateColumnType { .. }));
    }
}
