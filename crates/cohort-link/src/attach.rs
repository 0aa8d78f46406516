//! Latest-prior attachment operations.
//!
//! Both operations share one skeleton: join source observations onto the
//! cohort table by subject identifier, keep rows dated strictly before the
//! reference date, and reduce each (identifier, reference-date) group to the
//! row with the maximum source date. Ties on the maximum date resolve to the
//! first such row in source-table order.

use polars::prelude::*;

use crate::codes::CodeMatcher;
use crate::dates::parse_compact_date_column;
use crate::error::{LinkError, Result};
use crate::spec::{LatestDiagnosisSpec, LatestValueSpec, NegativeFilter, ValueKind};

const REF_DATE: &str = "__ref_date";
const SOURCE_DATE: &str = "__source_date";
const SOURCE_ROW: &str = "__source_row";
const TARGET_ROW: &str = "__target_row";
const MATCHED: &str = "__matched";

/// Attach the latest qualifying prior value from `data` to each row of `goal`.
///
/// The returned frame is `goal` plus one column, same height and row order.
/// Rows without a qualifying prior observation hold nulls. For
/// [`ValueKind::Numeric`] columns the non-negative filter runs according to
/// the configured [`NegativeFilter`]; filtered and unmatched row counts are
/// reported at info level.
pub fn attach_latest_value(
    goal: &DataFrame,
    data: &DataFrame,
    spec: &LatestValueSpec,
) -> Result<DataFrame> {
    require_column(goal, &spec.id_col, "goal")?;
    require_column(goal, &spec.reference_date_col, "goal")?;
    require_column(data, &spec.id_col, "data")?;
    require_column(data, &spec.source_date_col, "data")?;
    require_column(data, &spec.value_col, "data")?;
    let result_col = spec.result_column();
    reject_collision(goal, result_col)?;

    // Work on a copy so the caller's frame keeps its original date column.
    let mut data = data.clone();
    let parsed = parse_compact_date_column(&data, &spec.source_date_col)?;
    data.with_column(parsed)?;

    let numeric = spec.value_kind == ValueKind::Numeric;
    let mut dropped = 0usize;

    if numeric && spec.negative_filter == NegativeFilter::PreSelection {
        // Corrected semantics: negative readings never enter the candidate
        // pool, so selection falls back to the next-latest valid row.
        let before = data.height();
        data = data
            .lazy()
            .filter(
                col(spec.value_col.as_str())
                    .gt_eq(lit(0))
                    .or(col(spec.value_col.as_str()).is_null()),
            )
            .collect()?;
        dropped = before - data.height();
    }

    let mut latest = latest_before(
        goal,
        &data,
        &spec.id_col,
        &spec.source_date_col,
        &spec.reference_date_col,
        col(spec.value_col.as_str()),
    )?;

    if numeric && spec.negative_filter == NegativeFilter::PostSelection {
        // Historical semantics: the filter runs on the already-selected
        // latest rows. A group whose latest reading is negative (or missing,
        // which fails the >= 0 test the same way) yields no match at all.
        let before = latest.height();
        latest = latest.lazy().filter(col(MATCHED).gt_eq(lit(0))).collect()?;
        dropped = before - latest.height();
    }
    if numeric {
        tracing::info!(column = result_col, count = dropped, "dropped negative values");
    }

    let out = merge_back(goal, &latest, &spec.id_col, &spec.reference_date_col, result_col)?;
    report_missing(&out, result_col)?;
    Ok(out)
}

/// Attach a presence flag for diagnoses recorded before the reference date.
///
/// Diagnostics rows are first restricted to the configured fixed codes and
/// hierarchical roots; the matched rows carry the constant marker `"1"`
/// through the same latest-prior selection as [`attach_latest_value`]. The
/// attached column holds `"1"` or null.
pub fn attach_latest_diagnosis(
    goal: &DataFrame,
    diagnostics: &DataFrame,
    spec: &LatestDiagnosisSpec,
) -> Result<DataFrame> {
    require_column(goal, &spec.id_col, "goal")?;
    require_column(goal, &spec.reference_date_col, "goal")?;
    require_column(diagnostics, &spec.id_col, "diagnostics")?;
    require_column(diagnostics, &spec.code_col, "diagnostics")?;
    require_column(diagnostics, &spec.date_col, "diagnostics")?;
    reject_collision(goal, &spec.output_col)?;

    let matcher = CodeMatcher::compile(&spec.fixed_codes, &spec.code_roots)?;
    if matcher.is_empty() {
        tracing::warn!(
            column = spec.output_col.as_str(),
            "no fixed codes or code roots supplied; no diagnosis will match"
        );
    }

    let mut diagnostics = diagnostics.clone();
    let parsed = parse_compact_date_column(&diagnostics, &spec.date_col)?;
    diagnostics.with_column(parsed)?;

    let mask = {
        let codes = diagnostics.column(&spec.code_col)?.str()?;
        matcher.mask(codes)
    };
    let matched = diagnostics.filter(&mask)?;
    tracing::debug!(
        rows = matched.height(),
        total = diagnostics.height(),
        "diagnosis rows selected by code matching"
    );

    // The code text is discarded after matching; only presence matters, so
    // the carried value is the constant marker "1".
    let latest = latest_before(
        goal,
        &matched,
        &spec.id_col,
        &spec.date_col,
        &spec.reference_date_col,
        lit("1"),
    )?;

    let mut out = merge_back(
        goal,
        &latest,
        &spec.id_col,
        &spec.reference_date_col,
        &spec.output_col,
    )?;
    blank_to_null(&mut out, &spec.output_col)?;
    report_missing(&out, &spec.output_col)?;
    Ok(out)
}

/// Reduce source observations to the latest row strictly before the
/// reference date, per (identifier, reference-date) group.
///
/// Returns one row per matched group with columns `[id, __ref_date,
/// __matched]`. The source row index makes tie-breaking on equal maximum
/// dates deterministic: the first row in source-table order wins.
fn latest_before(
    goal: &DataFrame,
    source: &DataFrame,
    id_col: &str,
    date_col: &str,
    ref_col: &str,
    value: Expr,
) -> Result<DataFrame> {
    let candidates = source
        .clone()
        .lazy()
        .with_row_index(SOURCE_ROW, None)
        .select([
            col(id_col),
            col(SOURCE_ROW),
            col(date_col).alias(SOURCE_DATE),
            value.alias(MATCHED),
        ]);

    let latest = goal
        .clone()
        .lazy()
        .select([col(id_col), col(ref_col).alias(REF_DATE)])
        .join(
            candidates,
            [col(id_col)],
            [col(id_col)],
            JoinArgs::new(JoinType::Left),
        )
        .filter(col(SOURCE_DATE).lt(col(REF_DATE)))
        .filter(col(SOURCE_DATE).eq(col(SOURCE_DATE).max().over([col(id_col), col(REF_DATE)])))
        .sort([SOURCE_ROW], SortMultipleOptions::default())
        .group_by_stable([col(id_col), col(REF_DATE)])
        .agg([col(MATCHED).first()])
        .collect()?;
    Ok(latest)
}

/// Left-merge the selected rows back onto the cohort table, preserving its
/// row order, and surface the carried value under `result_col`.
fn merge_back(
    goal: &DataFrame,
    latest: &DataFrame,
    id_col: &str,
    ref_col: &str,
    result_col: &str,
) -> Result<DataFrame> {
    let merged = goal
        .clone()
        .lazy()
        .with_row_index(TARGET_ROW, None)
        .join(
            latest.clone().lazy().select([
                col(id_col),
                col(REF_DATE),
                col(MATCHED).alias(result_col),
            ]),
            [col(id_col), col(ref_col)],
            [col(id_col), col(REF_DATE)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    let merged = merged.sort([TARGET_ROW], SortMultipleOptions::default())?;
    Ok(merged.drop(TARGET_ROW)?)
}

/// Replace empty/whitespace-only strings with nulls in a result column.
///
/// The diagnosis marker column only ever holds "1" or null, but this also
/// catches blank artifacts carried in from the code-matching step.
fn blank_to_null(df: &mut DataFrame, column: &str) -> Result<usize> {
    let values = df.column(column)?.str()?;
    let mut cleared = 0usize;
    let mut builder = StringChunkedBuilder::new(column.into(), values.len());
    for value in values {
        match value {
            Some(text) if text.trim().is_empty() => {
                cleared += 1;
                builder.append_null();
            }
            Some(text) => builder.append_value(text),
            None => builder.append_null(),
        }
    }
    if cleared > 0 {
        let cleaned = builder.finish().into_series();
        df.with_column(cleaned)?;
    }
    Ok(cleared)
}

fn require_column(df: &DataFrame, column: &str, table: &'static str) -> Result<()> {
    if df.get_column_names().iter().any(|name| name.as_str() == column) {
        Ok(())
    } else {
        Err(LinkError::MissingColumn {
            column: column.to_string(),
            table,
        })
    }
}

fn reject_collision(goal: &DataFrame, result_col: &str) -> Result<()> {
    if goal
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == result_col)
    {
        Err(LinkError::ColumnCollision {
            column: result_col.to_string(),
        })
    } else {
        Ok(())
    }
}

fn report_missing(df: &DataFrame, result_col: &str) -> Result<()> {
    let missing = df.column(result_col)?.null_count();
    tracing::info!(
        column = result_col,
        count = missing,
        "rows without a qualifying prior record"
    );
    Ok(())
}
