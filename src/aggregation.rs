//! Aggregate views over filtered ranking rows.
//!
//! Every function is a pure function of its input frame and returns a freshly
//! collected result. Empty input yields zero, `None` or an empty frame, never
//! an error; asking for a column the frame lacks is `ColumnNotFound`.

use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::DashError;
use crate::schema::{output, ranking, require_columns};
use crate::vocabulary::{self, field_order_expr};

const FIELD_ORDER_COL: &str = "_field_order";

/// What a distribution reports per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measure {
    /// Summed `access_count`, kept under the `access_count` name.
    #[default]
    Sum,
    /// Number of rows, under `count`.
    Count,
}

impl Measure {
    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::Sum => ranking::ACCESS_COUNT,
            Measure::Count => output::COUNT,
        }
    }

    fn expr(&self) -> Expr {
        match self {
            Measure::Sum => col(ranking::ACCESS_COUNT).cast(DataType::Int64).sum(),
            Measure::Count => col(ranking::ACCESS_COUNT)
                .count()
                .cast(DataType::Int64)
                .alias(output::COUNT),
        }
    }
}

fn key_exprs(keys: &[&str]) -> Vec<Expr> {
    keys.iter().map(|k| col(*k)).collect()
}

// ── Scalars ─────────────────────────────────────────────────────────────────

/// Sum of `access_count`; 0 for an empty frame.
pub fn total_access(df: &DataFrame) -> Result<i64, DashError> {
    require_columns(df, &[ranking::ACCESS_COUNT])?;
    let total = df
        .column(ranking::ACCESS_COUNT)?
        .cast(&DataType::Int64)?
        .i64()?
        .sum()
        .unwrap_or(0);
    Ok(total)
}

/// Distinct non-null values in `column`.
pub fn distinct_count(df: &DataFrame, column: &str) -> Result<usize, DashError> {
    require_columns(df, &[column])?;
    let n = df
        .column(column)?
        .as_materialized_series()
        .drop_nulls()
        .n_unique()?;
    Ok(n)
}

/// Distinct dates present; for one series this is its days in the ranking.
pub fn distinct_dates(df: &DataFrame) -> Result<usize, DashError> {
    distinct_count(df, ranking::DATE)
}

/// Total access over the number of distinct dates; 0 when there are none.
pub fn average_daily_access(df: &DataFrame) -> Result<f64, DashError> {
    let total = total_access(df)?;
    let days = distinct_dates(df)?;
    if days == 0 {
        return Ok(0.0);
    }
    Ok(total as f64 / days as f64)
}

/// Mean `rank` of `series` within `df`; `None` when the series has no rows
/// (or no parseable ranks) there.
pub fn average_rank(df: &DataFrame, series: &str) -> Result<Option<f64>, DashError> {
    require_columns(df, &[ranking::SERIES_NAME, ranking::RANK])?;
    let rows = df
        .clone()
        .lazy()
        .filter(col(ranking::SERIES_NAME).eq(lit(series)))
        .select([col(ranking::RANK)])
        .collect()?;
    Ok(rows.column(ranking::RANK)?.as_materialized_series().mean())
}

// ── Grouped views ───────────────────────────────────────────────────────────

/// Group by `keys` and apply `measure`. Groups appear in first-encounter order.
pub fn group_totals(df: &DataFrame, keys: &[&str], measure: Measure) -> Result<DataFrame, DashError> {
    require_columns(df, keys)?;
    require_columns(df, &[ranking::ACCESS_COUNT])?;
    let out = df
        .clone()
        .lazy()
        .group_by_stable(key_exprs(keys))
        .agg([measure.expr()])
        .collect()?;
    Ok(out)
}

/// Distribution over a single categorical column, no reordering.
pub fn distribution(df: &DataFrame, key: &str, measure: Measure) -> Result<DataFrame, DashError> {
    group_totals(df, &[key], measure)
}

/// Distribution over `field_major` in the vocabulary's display order.
/// Null and unknown fields follow, in first-encounter order.
pub fn field_distribution(df: &DataFrame, measure: Measure) -> Result<DataFrame, DashError> {
    let grouped = group_totals(df, &[ranking::FIELD_MAJOR], measure)?;
    let out = grouped
        .lazy()
        .with_column(field_order_expr().alias(FIELD_ORDER_COL))
        .sort(
            [FIELD_ORDER_COL],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([col(ranking::FIELD_MAJOR), col(measure.column_name())])
        .collect()?;
    Ok(out)
}

/// All groups of `keys` ordered by summed access, descending.
/// Ties are broken by the key columns ascending.
pub fn rank_by(df: &DataFrame, keys: &[&str]) -> Result<DataFrame, DashError> {
    ranked_groups(df, keys, None)
}

/// The `n` groups of `keys` with the highest summed access.
pub fn top_n_by(df: &DataFrame, keys: &[&str], n: usize) -> Result<DataFrame, DashError> {
    ranked_groups(df, keys, Some(n))
}

fn ranked_groups(df: &DataFrame, keys: &[&str], limit: Option<usize>) -> Result<DataFrame, DashError> {
    let grouped = group_totals(df, keys, Measure::Sum)?;

    let mut by = vec![col(ranking::ACCESS_COUNT)];
    by.extend(key_exprs(keys));
    let mut descending = vec![true];
    descending.extend(keys.iter().map(|_| false));

    let mut lazy = grouped.lazy().sort_by_exprs(
        by,
        SortMultipleOptions {
            descending,
            nulls_last: vec![true],
            maintain_order: true,
            ..Default::default()
        },
    );
    if let Some(n) = limit {
        lazy = lazy.limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX));
    }
    Ok(lazy.collect()?)
}

/// Re-sort a key/value frame by `value`, ties kept in their current order.
pub fn sort_by_total(df: &DataFrame, value: &str, descending: bool) -> Result<DataFrame, DashError> {
    require_columns(df, &[value])?;
    let out = df
        .clone()
        .lazy()
        .sort(
            [value],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(out)
}

/// Summed access per calendar month, optionally split by `key`.
///
/// Only months that have rows appear. A month without data is a gap in the
/// output, never a zero point.
pub fn monthly_series(df: &DataFrame, key: Option<&str>) -> Result<DataFrame, DashError> {
    let mut keys: Vec<&str> = key.into_iter().collect();
    keys.push(ranking::YEAR_MONTH);

    let grouped = group_totals(df, &keys, Measure::Sum)?;
    let out = grouped
        .lazy()
        .sort_by_exprs(key_exprs(&keys), SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Summed access per (parent, child) pair, skipping rows where either is null.
pub fn hierarchy(df: &DataFrame, parent: &str, child: &str) -> Result<DataFrame, DashError> {
    require_columns(df, &[parent, child])?;
    let complete = df
        .clone()
        .lazy()
        .filter(col(parent).is_not_null().and(col(child).is_not_null()))
        .collect()?;
    group_totals(&complete, &[parent, child], Measure::Sum)
}

// ── Key listings ────────────────────────────────────────────────────────────

/// Fields present in `df`, in display order.
pub fn fields_present(df: &DataFrame) -> Result<Vec<String>, DashError> {
    require_columns(df, &[ranking::FIELD_MAJOR])?;
    let unique = df
        .column(ranking::FIELD_MAJOR)?
        .as_materialized_series()
        .drop_nulls()
        .unique_stable()?;
    let names: Vec<String> = unique
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    Ok(vocabulary::order_fields(names))
}

/// Distinct non-null values of `column`, sorted.
pub fn sorted_unique(df: &DataFrame, column: &str) -> Result<Vec<String>, DashError> {
    require_columns(df, &[column])?;
    let names: BTreeSet<String> = df
        .column(column)?
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    Ok(names.into_iter().collect())
}

/// Series present in `df`, sorted by name.
pub fn series_present(df: &DataFrame) -> Result<Vec<String>, DashError> {
    sorted_unique(df, ranking::SERIES_NAME)
}

/// Series names by ascending total access (ties by name).
pub fn series_order(df: &DataFrame) -> Result<Vec<String>, DashError> {
    let totals = group_totals(df, &[ranking::SERIES_NAME], Measure::Sum)?
        .lazy()
        .filter(col(ranking::SERIES_NAME).is_not_null())
        .sort_by_exprs(
            [col(ranking::ACCESS_COUNT), col(ranking::SERIES_NAME)],
            SortMultipleOptions::default(),
        )
        .collect()?;
    let names = totals
        .column(ranking::SERIES_NAME)?
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    Ok(names)
}
