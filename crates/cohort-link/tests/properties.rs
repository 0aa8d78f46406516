use chrono::{Days, NaiveDate};
use polars::prelude::*;
use proptest::prelude::*;

use cohort_link::{LatestValueSpec, ValueKind, attach_latest_value};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("base date")
}

fn compact(offset: i32) -> String {
    (base_date() + Days::new(offset as u64))
        .format("%Y%m%d")
        .to_string()
}

fn offset_to_days_since_epoch(offset: i32) -> i32 {
    (base_date() + Days::new(offset as u64))
        .signed_duration_since(NaiveDate::default())
        .num_days() as i32
}

/// Straight row-loop restatement of the selection rules: among source rows
/// for the subject dated strictly before the reference offset, take the
/// first row holding the maximum date, then apply the post-selection
/// non-negative filter.
fn oracle(rows: &[(i64, i32, i64)], id: i64, ref_offset: i32) -> Option<i64> {
    let mut best: Option<(i32, i64)> = None;
    for &(row_id, offset, value) in rows {
        if row_id != id || offset >= ref_offset {
            continue;
        }
        let replaces = match best {
            Some((best_offset, _)) => offset > best_offset,
            None => true,
        };
        if replaces {
            best = Some((offset, value));
        }
    }
    best.and_then(|(_, value)| if value >= 0 { Some(value) } else { None })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn latest_prior_selection_matches_oracle(
        rows in prop::collection::vec((1i64..4, 0i32..60, -5i64..50), 0..24),
        refs in prop::collection::vec((1i64..4, 1i32..61), 1..6),
    ) {
        let data = DataFrame::new(vec![
            Column::new("idp".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new(
                "dat".into(),
                rows.iter().map(|r| compact(r.1)).collect::<Vec<_>>(),
            ),
            Column::new("val".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        ])
        .expect("data frame");

        let goal = DataFrame::new(vec![
            Column::new("idp".into(), refs.iter().map(|r| r.0).collect::<Vec<_>>()),
            Int32Chunked::from_vec(
                "t0".into(),
                refs.iter().map(|r| offset_to_days_since_epoch(r.1)).collect(),
            )
            .into_series()
            .cast(&DataType::Date)
            .expect("date column")
            .into_column(),
        ])
        .expect("goal frame");

        let spec = LatestValueSpec::new("dat", "t0", "val", ValueKind::Numeric);
        let out = attach_latest_value(&goal, &data, &spec).expect("attach");

        prop_assert_eq!(out.height(), refs.len());
        let attached = out.column("val").expect("column").i64().expect("i64");
        for (row, &(id, ref_offset)) in refs.iter().enumerate() {
            prop_assert_eq!(attached.get(row), oracle(&rows, id, ref_offset));
        }
    }
}
