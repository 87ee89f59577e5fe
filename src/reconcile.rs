//! Ranked / unranked partition of the series catalog.
//!
//! A catalog row is "ranked" when its series name appears in the filtered
//! ranking rows, "unranked" otherwise. Series missing from the catalog are
//! simply not part of either side.

use std::fmt;

use polars::prelude::*;

use crate::error::DashError;
use crate::schema::{catalog, output, ranking, require_columns};

/// A count with its share of a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub count: usize,
    pub total: usize,
}

impl Share {
    pub fn new(count: usize, total: usize) -> Self {
        Self { count, total }
    }

    /// Percentage of the total, `None` when the total is zero.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.count as f64 * 100.0 / self.total as f64)
        }
    }
}

/// `"N (P.P%)"`, or plain `"N"` when there is no total to divide by.
impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(p) => write!(f, "{} ({:.1}%)", self.count, p),
            None => write!(f, "{}", self.count),
        }
    }
}

/// Catalog rows split by ranking status.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub ranked: DataFrame,
    pub unranked: DataFrame,
    /// Catalog scope with a boolean `ranked` column.
    pub flagged: DataFrame,
}

impl Reconciliation {
    pub fn ranked_count(&self) -> Result<usize, DashError> {
        distinct_series(&self.ranked)
    }

    pub fn unranked_count(&self) -> Result<usize, DashError> {
        distinct_series(&self.unranked)
    }

    pub fn total_count(&self) -> Result<usize, DashError> {
        distinct_series(&self.flagged)
    }

    pub fn ranked_share(&self) -> Result<Share, DashError> {
        Ok(Share::new(self.ranked_count()?, self.total_count()?))
    }

    pub fn unranked_share(&self) -> Result<Share, DashError> {
        Ok(Share::new(self.unranked_count()?, self.total_count()?))
    }

    /// Ranked catalog rows per organization, most first.
    pub fn ranked_by_organization(&self) -> Result<DataFrame, DashError> {
        value_counts(&self.ranked, catalog::ORGANIZATION)
    }

    /// Unranked catalog rows per organization, most first.
    pub fn unranked_by_organization(&self) -> Result<DataFrame, DashError> {
        value_counts(&self.unranked, catalog::ORGANIZATION)
    }

    /// `(series_name, ranked, organization)` sorted by series name.
    pub fn status_table(&self) -> Result<DataFrame, DashError> {
        let out = self
            .flagged
            .clone()
            .lazy()
            .select([
                col(catalog::SERIES_NAME),
                col(output::RANKED),
                col(catalog::ORGANIZATION),
            ])
            .sort(
                [catalog::SERIES_NAME],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        Ok(out)
    }
}

fn distinct_series(df: &DataFrame) -> Result<usize, DashError> {
    let n = df
        .column(catalog::SERIES_NAME)?
        .as_materialized_series()
        .drop_nulls()
        .n_unique()?;
    Ok(n)
}

/// Rows per value of `column`, descending, ties by value.
fn value_counts(df: &DataFrame, column: &str) -> Result<DataFrame, DashError> {
    let out = df
        .clone()
        .lazy()
        .group_by_stable([col(column)])
        .agg([col(catalog::SERIES_NAME)
            .count()
            .cast(DataType::Int64)
            .alias(output::COUNT)])
        .sort_by_exprs(
            [col(output::COUNT), col(column)],
            SortMultipleOptions {
                descending: vec![true, false],
                maintain_order: true,
                ..Default::default()
            },
        )
        .collect()?;
    Ok(out)
}

/// Partition `catalog_rows` (optionally restricted to `field`) by whether
/// each series name occurs in `ranking_rows`.
pub fn reconcile(
    catalog_rows: &DataFrame,
    ranking_rows: &DataFrame,
    field: Option<&str>,
) -> Result<Reconciliation, DashError> {
    require_columns(
        catalog_rows,
        &[catalog::SERIES_NAME, catalog::ORGANIZATION, catalog::FIELD_MAJOR],
    )?;
    require_columns(ranking_rows, &[ranking::SERIES_NAME])?;

    let ranked_names = ranking_rows
        .column(ranking::SERIES_NAME)?
        .as_materialized_series()
        .drop_nulls()
        .unique()?;

    let mut scope = catalog_rows.clone().lazy();
    if let Some(field) = field {
        scope = scope.filter(col(catalog::FIELD_MAJOR).eq(lit(field)));
    }

    let flagged = scope
        .with_column(
            col(catalog::SERIES_NAME)
                .is_in(lit(ranked_names), false)
                .fill_null(lit(false))
                .alias(output::RANKED),
        )
        .collect()?;

    let ranked = flagged
        .clone()
        .lazy()
        .filter(col(output::RANKED))
        .collect()?;
    let unranked = flagged
        .clone()
        .lazy()
        .filter(col(output::RANKED).not())
        .collect()?;

    Ok(Reconciliation {
        ranked,
        unranked,
        flagged,
    })
}
