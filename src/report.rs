//! Page-level compositions of the aggregate views.
//!
//! Each report filters the dataset once for its window and scope, then runs
//! the aggregation functions over the filtered rows. Nothing here computes
//! anything the aggregation, reconcile and catalog modules don't already.

use polars::prelude::DataFrame;
use tracing::debug;

use crate::aggregation::{self as agg, Measure};
use crate::catalog::{self, CatalogGroup};
use crate::error::DashError;
use crate::filter::RowFilter;
use crate::reconcile::{reconcile, Share};
use crate::schema::ranking;
use crate::source::Dataset;
use crate::window::DateWindow;

/// Key columns identifying one downloadable file.
pub const FILE_KEYS: [&str; 3] = [ranking::SERIES_NAME, ranking::FILE_NAME, ranking::MAIN_LINK];

/// Whole-portal view for one window.
#[derive(Debug, Clone)]
pub struct OverviewReport {
    pub window: DateWindow,
    pub total_access: i64,
    pub ranked: Share,
    pub unranked: Share,
    pub monthly_totals: DataFrame,
    pub by_field: DataFrame,
    pub by_organization: DataFrame,
    pub field_series: DataFrame,
    pub organization_series: DataFrame,
    pub monthly_by_field: DataFrame,
    pub monthly_by_organization: DataFrame,
    /// Catalog series absent from the whole ranking table, regardless of window.
    pub unranked_by_field: Vec<CatalogGroup>,
}

impl OverviewReport {
    pub fn build(dataset: &Dataset, window: DateWindow) -> Result<Self, DashError> {
        let rows = RowFilter::new(window).apply(dataset.ranking())?;
        debug!(%window, rows = rows.height(), "building overview report");

        let reconciliation = reconcile(dataset.catalog(), &rows, None)?;
        let by_organization = agg::sort_by_total(
            &agg::distribution(&rows, ranking::ORGANIZATION, Measure::Sum)?,
            ranking::ACCESS_COUNT,
            true,
        )?;

        Ok(Self {
            window,
            total_access: agg::total_access(&rows)?,
            ranked: reconciliation.ranked_share()?,
            unranked: reconciliation.unranked_share()?,
            monthly_totals: agg::monthly_series(&rows, None)?,
            by_field: agg::field_distribution(&rows, Measure::Sum)?,
            by_organization,
            field_series: agg::hierarchy(&rows, ranking::FIELD_MAJOR, ranking::SERIES_NAME)?,
            organization_series: agg::hierarchy(&rows, ranking::ORGANIZATION, ranking::SERIES_NAME)?,
            monthly_by_field: agg::monthly_series(&rows, Some(ranking::FIELD_MAJOR))?,
            monthly_by_organization: agg::monthly_series(&rows, Some(ranking::ORGANIZATION))?,
            unranked_by_field: catalog::unranked_by_field(dataset.catalog(), dataset.ranking())?,
        })
    }
}

/// One field inside one window.
#[derive(Debug, Clone)]
pub struct FieldReport {
    pub window: DateWindow,
    pub field: String,
    pub total_access: i64,
    pub average_daily_access: f64,
    pub organizations: usize,
    pub monthly_totals: DataFrame,
    pub top_files: DataFrame,
    pub organization_ranking: DataFrame,
    pub monthly_by_series: DataFrame,
    pub ranked: Share,
    pub unranked: Share,
    pub ranked_by_organization: DataFrame,
    pub unranked_by_organization: DataFrame,
    pub status: DataFrame,
    pub file_types: DataFrame,
    pub file_types_by_series: DataFrame,
    /// Series by ascending total, for chart category order.
    pub series_order: Vec<String>,
    /// Series available for drill-down, sorted by name.
    pub series_choices: Vec<String>,
}

impl FieldReport {
    pub fn build(
        dataset: &Dataset,
        window: DateWindow,
        field: &str,
        top_n: usize,
    ) -> Result<Self, DashError> {
        let rows = RowFilter::new(window).with_field(field).apply(dataset.ranking())?;
        debug!(%window, field, rows = rows.height(), "building field report");

        let reconciliation = reconcile(dataset.catalog(), &rows, Some(field))?;

        Ok(Self {
            window,
            field: field.to_string(),
            total_access: agg::total_access(&rows)?,
            average_daily_access: agg::average_daily_access(&rows)?,
            organizations: agg::distinct_count(&rows, ranking::ORGANIZATION)?,
            monthly_totals: agg::monthly_series(&rows, None)?,
            top_files: agg::top_n_by(&rows, &FILE_KEYS, top_n)?,
            organization_ranking: agg::rank_by(&rows, &[ranking::ORGANIZATION])?,
            monthly_by_series: agg::monthly_series(&rows, Some(ranking::SERIES_NAME))?,
            ranked: reconciliation.ranked_share()?,
            unranked: reconciliation.unranked_share()?,
            ranked_by_organization: reconciliation.ranked_by_organization()?,
            unranked_by_organization: reconciliation.unranked_by_organization()?,
            status: reconciliation.status_table()?,
            file_types: agg::distribution(&rows, ranking::FILE_TYPE, Measure::Count)?,
            file_types_by_series: agg::group_totals(
                &rows,
                &[ranking::SERIES_NAME, ranking::FILE_TYPE],
                Measure::Count,
            )?,
            series_order: agg::series_order(&rows)?,
            series_choices: agg::series_present(&rows)?,
        })
    }
}

/// One series inside one field and window.
#[derive(Debug, Clone)]
pub struct SeriesDrilldown {
    pub window: DateWindow,
    pub series: String,
    pub total_access: i64,
    pub average_rank: Option<f64>,
    pub days_in_ranking: usize,
    pub days_in_window: i64,
    /// `(file_name, main_link, access_count)`, most accessed first.
    pub files: DataFrame,
}

impl SeriesDrilldown {
    pub fn build(
        dataset: &Dataset,
        window: DateWindow,
        field: &str,
        series: &str,
    ) -> Result<Self, DashError> {
        let rows = RowFilter::new(window)
            .with_field(field)
            .with_series(series)
            .apply(dataset.ranking())?;
        debug!(%window, field, series, rows = rows.height(), "building series drill-down");

        Ok(Self {
            window,
            series: series.to_string(),
            total_access: agg::total_access(&rows)?,
            average_rank: agg::average_rank(&rows, series)?,
            days_in_ranking: agg::distinct_dates(&rows)?,
            days_in_window: window.days(),
            files: agg::rank_by(&rows, &[ranking::FILE_NAME, ranking::MAIN_LINK])?,
        })
    }
}
