//! Subcommand execution: load tables, run the join engine, write output.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use cohort_ingest::{coerce_date_column, read_table, require_columns};
use cohort_link::{
    LatestDiagnosisSpec, LatestValueSpec, NegativeFilter, ValueKind, attach_latest_diagnosis,
    attach_latest_value,
};

use crate::cli::{DiagnosisArgs, NegativeFilterArg, ValueArgs, ValueKindArg};
use crate::types::RunSummary;

pub fn run_value(args: &ValueArgs) -> Result<RunSummary> {
    let goal = read_table(&args.goal)?;
    require_columns(
        &goal,
        &[args.id_col.as_str(), args.reference_date_col.as_str()],
        &args.goal,
    )?;
    let goal = coerce_date_column(goal, &args.reference_date_col)?;

    let data = read_table(&args.data)?;
    require_columns(
        &data,
        &[
            args.id_col.as_str(),
            args.date_col.as_str(),
            args.value_col.as_str(),
        ],
        &args.data,
    )?;

    let value_kind = match args.value_kind {
        Some(ValueKindArg::Numeric) => ValueKind::Numeric,
        Some(ValueKindArg::Categorical) => ValueKind::Categorical,
        None => infer_value_kind(&data, &args.value_col)?,
    };
    let negative_filter = match args.negative_filter {
        NegativeFilterArg::Post => NegativeFilter::PostSelection,
        NegativeFilterArg::Pre => NegativeFilter::PreSelection,
    };

    let mut spec = LatestValueSpec::new(
        args.date_col.as_str(),
        args.reference_date_col.as_str(),
        args.value_col.as_str(),
        value_kind,
    )
    .with_id_col(args.id_col.as_str())
    .with_negative_filter(negative_filter);
    if let Some(output_col) = &args.output_col {
        spec = spec.with_output_col(output_col.as_str());
    }
    let result_col = spec.result_column().to_string();

    let mut out = attach_latest_value(&goal, &data, &spec)?;
    write_table(&mut out, &args.output)?;

    summarize("value", &out, &result_col, &args.output)
}

pub fn run_diagnosis(args: &DiagnosisArgs) -> Result<RunSummary> {
    let goal = read_table(&args.goal)?;
    require_columns(
        &goal,
        &[args.id_col.as_str(), args.reference_date_col.as_str()],
        &args.goal,
    )?;
    let goal = coerce_date_column(goal, &args.reference_date_col)?;

    let diagnostics = read_table(&args.data)?;
    require_columns(
        &diagnostics,
        &[
            args.id_col.as_str(),
            args.code_col.as_str(),
            args.date_col.as_str(),
        ],
        &args.data,
    )?;

    let spec = LatestDiagnosisSpec::new(args.code_col.as_str(), args.date_col.as_str())
        .with_fixed_codes(args.fixed_codes.clone())
        .with_code_roots(args.code_roots.clone())
        .with_reference_date_col(args.reference_date_col.as_str())
        .with_output_col(args.output_col.as_str())
        .with_id_col(args.id_col.as_str());

    let mut out = attach_latest_diagnosis(&goal, &diagnostics, &spec)?;
    write_table(&mut out, &args.output)?;

    summarize("diagnosis", &out, &args.output_col, &args.output)
}

/// Semantic-type fallback when --value-kind is not given: numeric polars
/// dtypes take the numeric path, everything else is categorical.
fn infer_value_kind(data: &DataFrame, value_col: &str) -> Result<ValueKind> {
    let dtype = data.column(value_col)?.dtype().clone();
    let kind = if dtype.is_primitive_numeric() {
        ValueKind::Numeric
    } else {
        ValueKind::Categorical
    };
    tracing::debug!(column = value_col, %dtype, kind = ?kind, "inferred value kind");
    Ok(kind)
}

fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write output file: {}", path.display()))?;
    Ok(())
}

fn summarize(
    operation: &str,
    out: &DataFrame,
    result_col: &str,
    path: &Path,
) -> Result<RunSummary> {
    let rows = out.height();
    let missing = out.column(result_col)?.null_count();
    Ok(RunSummary {
        operation: operation.to_string(),
        output_column: result_col.to_string(),
        rows,
        attached: rows - missing,
        missing,
        output_path: path.to_path_buf(),
    })
}
