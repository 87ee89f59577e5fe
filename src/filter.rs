use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::DashError;
use crate::schema::{ranking, require_columns};
use crate::window::DateWindow;

/// Rows in a date window, optionally narrowed to one field and/or one series.
/// The predicates combine with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub window: DateWindow,
    pub field: Option<String>,
    pub series: Option<String>,
}

impl RowFilter {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            field: None,
            series: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn predicate(&self) -> Expr {
        let mut predicate = col(ranking::DATE)
            .gt_eq(lit(self.window.start))
            .and(col(ranking::DATE).lt_eq(lit(self.window.end)));
        if let Some(field) = &self.field {
            predicate = predicate.and(col(ranking::FIELD_MAJOR).eq(lit(field.as_str())));
        }
        if let Some(series) = &self.series {
            predicate = predicate.and(col(ranking::SERIES_NAME).eq(lit(series.as_str())));
        }
        predicate
    }

    pub fn apply(&self, table: &DataFrame) -> Result<DataFrame, DashError> {
        let mut needed = vec![ranking::DATE];
        if self.field.is_some() {
            needed.push(ranking::FIELD_MAJOR);
        }
        if self.series.is_some() {
            needed.push(ranking::SERIES_NAME);
        }
        require_columns(table, &needed)?;

        let df = table.clone().lazy().filter(self.predicate()).collect()?;
        Ok(df)
    }
}

/// Rows with `start_date <= date <= end_date`, narrowed by exact `field` and
/// `series` matches when given.
pub fn filter_rows(
    table: &DataFrame,
    start_date: NaiveDate,
    end_date: NaiveDate,
    field: Option<&str>,
    series: Option<&str>,
) -> Result<DataFrame, DashError> {
    let mut filter = RowFilter::new(DateWindow::new(start_date, end_date));
    if let Some(field) = field {
        filter = filter.with_field(field);
    }
    if let Some(series) = series {
        filter = filter.with_series(series);
    }
    filter.apply(table)
}
