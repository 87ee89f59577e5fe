use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::aggregation::{self as agg, Measure};
use crate::catalog::{self, CatalogGroup};
use crate::config::DashboardConfig;
use crate::error::DashError;
use crate::filter::filter_rows;
use crate::reconcile::{reconcile, Share};
use crate::source::{CachedSource, CsvSource, Dataset};
use crate::vocabulary::FIELD_ORDER;
use crate::window::WindowSelector;

#[pyclass]
pub struct EstatModel {
    config: DashboardConfig,
    source: Option<CachedSource<CsvSource>>,
}

impl EstatModel {
    fn dataset(&self) -> Result<Arc<Dataset>, DashError> {
        self.source
            .as_ref()
            .ok_or(DashError::NotLoaded("ranking and catalog".into()))?
            .get()
    }
}

fn parse_measure(measure: &str) -> PyResult<Measure> {
    match measure {
        "sum" => Ok(Measure::Sum),
        "count" => Ok(Measure::Count),
        other => Err(PyValueError::new_err(format!(
            "measure must be 'sum' or 'count', got '{other}'"
        ))),
    }
}

fn groups_to_py(groups: Vec<CatalogGroup>) -> Vec<(String, PyDataFrame)> {
    groups
        .into_iter()
        .map(|g| (g.key, PyDataFrame(g.rows)))
        .collect()
}

#[pymethods]
impl EstatModel {
    /// `data_dir` overrides `ESTAT_DATA_DIR`; every other setting comes from
    /// the environment or its default.
    #[new]
    #[pyo3(signature = (data_dir=None))]
    fn new(data_dir: Option<String>) -> Self {
        let mut config = DashboardConfig::from_env();
        if let Some(dir) = data_dir {
            config.data_dir = dir.into();
        }
        Self {
            config,
            source: None,
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load both CSVs and return the ranking date bounds. Later calls reuse
    /// the loaded tables until either file changes on disk.
    fn load(&mut self) -> PyResult<(NaiveDate, NaiveDate)> {
        let source = self
            .source
            .get_or_insert_with(|| CachedSource::new(CsvSource::new(self.config.clone())));
        let bounds = source.get()?.bounds();
        Ok((bounds.min, bounds.max))
    }

    /// Forget the loaded tables; the next access reads the files again.
    fn invalidate(&self) {
        if let Some(source) = &self.source {
            source.invalidate();
        }
    }

    fn date_bounds(&self) -> PyResult<(NaiveDate, NaiveDate)> {
        let bounds = self.dataset()?.bounds();
        Ok((bounds.min, bounds.max))
    }

    fn ranking(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.dataset()?.ranking().clone()))
    }

    fn catalog(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.dataset()?.catalog().clone()))
    }

    // ── Windows and filtering ───────────────────────────────────────────────

    /// Resolve a selector (kebab-case name or Japanese label) into
    /// `(start, end, warning)`. The warning is set when a custom range was
    /// rejected and the full range used instead.
    #[pyo3(signature = (selector, custom=None))]
    fn resolve_window(
        &self,
        selector: &str,
        custom: Option<Vec<NaiveDate>>,
    ) -> PyResult<(NaiveDate, NaiveDate, Option<String>)> {
        let selector = WindowSelector::from_str(selector)?;
        let resolution = self.dataset()?.resolve_window(selector, custom.as_deref());
        Ok((
            resolution.window.start,
            resolution.window.end,
            resolution.warning.map(|w| w.to_string()),
        ))
    }

    /// Ranking rows in `[start, end]`, optionally narrowed by field and series.
    #[pyo3(signature = (start, end, field=None, series=None))]
    fn filter_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        field: Option<&str>,
        series: Option<&str>,
    ) -> PyResult<PyDataFrame> {
        let df = filter_rows(self.dataset()?.ranking(), start, end, field, series)?;
        Ok(PyDataFrame(df))
    }

    /// `(as_str, label)` for every selector, in menu order.
    #[staticmethod]
    fn window_selectors() -> Vec<(&'static str, &'static str)> {
        WindowSelector::ALL
            .iter()
            .map(|s| (s.as_str(), s.label()))
            .collect()
    }

    #[staticmethod]
    fn field_order() -> Vec<&'static str> {
        FIELD_ORDER.to_vec()
    }

    // ── Aggregates over filtered rows ───────────────────────────────────────

    #[staticmethod]
    fn total_access(rows: PyDataFrame) -> PyResult<i64> {
        Ok(agg::total_access(&rows.0)?)
    }

    #[staticmethod]
    fn distinct_count(rows: PyDataFrame, column: &str) -> PyResult<usize> {
        Ok(agg::distinct_count(&rows.0, column)?)
    }

    #[staticmethod]
    fn distinct_dates(rows: PyDataFrame) -> PyResult<usize> {
        Ok(agg::distinct_dates(&rows.0)?)
    }

    #[staticmethod]
    fn average_daily_access(rows: PyDataFrame) -> PyResult<f64> {
        Ok(agg::average_daily_access(&rows.0)?)
    }

    #[staticmethod]
    fn average_rank(rows: PyDataFrame, series: &str) -> PyResult<Option<f64>> {
        Ok(agg::average_rank(&rows.0, series)?)
    }

    /// `measure` is `"sum"` (summed access) or `"count"` (row count).
    #[staticmethod]
    #[pyo3(signature = (rows, keys, measure="sum"))]
    fn group_totals(rows: PyDataFrame, keys: Vec<String>, measure: &str) -> PyResult<PyDataFrame> {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let df = agg::group_totals(&rows.0, &keys, parse_measure(measure)?)?;
        Ok(PyDataFrame(df))
    }

    #[staticmethod]
    #[pyo3(signature = (rows, measure="sum"))]
    fn field_distribution(rows: PyDataFrame, measure: &str) -> PyResult<PyDataFrame> {
        let df = agg::field_distribution(&rows.0, parse_measure(measure)?)?;
        Ok(PyDataFrame(df))
    }

    #[staticmethod]
    fn rank_by(rows: PyDataFrame, keys: Vec<String>) -> PyResult<PyDataFrame> {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        Ok(PyDataFrame(agg::rank_by(&rows.0, &keys)?))
    }

    #[staticmethod]
    fn top_n(rows: PyDataFrame, keys: Vec<String>, n: usize) -> PyResult<PyDataFrame> {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        Ok(PyDataFrame(agg::top_n_by(&rows.0, &keys, n)?))
    }

    #[staticmethod]
    #[pyo3(signature = (df, value, descending=true))]
    fn sort_by_total(df: PyDataFrame, value: &str, descending: bool) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(agg::sort_by_total(&df.0, value, descending)?))
    }

    #[staticmethod]
    #[pyo3(signature = (rows, key=None))]
    fn monthly_series(rows: PyDataFrame, key: Option<&str>) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(agg::monthly_series(&rows.0, key)?))
    }

    #[staticmethod]
    fn hierarchy(rows: PyDataFrame, parent: &str, child: &str) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(agg::hierarchy(&rows.0, parent, child)?))
    }

    #[staticmethod]
    fn fields_present(rows: PyDataFrame) -> PyResult<Vec<String>> {
        Ok(agg::fields_present(&rows.0)?)
    }

    #[staticmethod]
    fn series_present(rows: PyDataFrame) -> PyResult<Vec<String>> {
        Ok(agg::series_present(&rows.0)?)
    }

    #[staticmethod]
    fn series_order(rows: PyDataFrame) -> PyResult<Vec<String>> {
        Ok(agg::series_order(&rows.0)?)
    }

    // ── Ranked / unranked ───────────────────────────────────────────────────

    /// Split the catalog (optionally one field) by presence in `rows`.
    /// Returns `(ranked, unranked, ranked_share, unranked_share)`.
    #[pyo3(signature = (rows, field=None))]
    fn reconcile(
        &self,
        rows: PyDataFrame,
        field: Option<&str>,
    ) -> PyResult<(PyDataFrame, PyDataFrame, String, String)> {
        let r = reconcile(self.dataset()?.catalog(), &rows.0, field)?;
        let ranked_share = r.ranked_share()?.to_string();
        let unranked_share = r.unranked_share()?.to_string();
        Ok((
            PyDataFrame(r.ranked),
            PyDataFrame(r.unranked),
            ranked_share,
            unranked_share,
        ))
    }

    /// Organization value counts for `(ranked, unranked)`.
    #[pyo3(signature = (rows, field=None))]
    fn reconcile_by_organization(
        &self,
        rows: PyDataFrame,
        field: Option<&str>,
    ) -> PyResult<(PyDataFrame, PyDataFrame)> {
        let r = reconcile(self.dataset()?.catalog(), &rows.0, field)?;
        Ok((
            PyDataFrame(r.ranked_by_organization()?),
            PyDataFrame(r.unranked_by_organization()?),
        ))
    }

    #[pyo3(signature = (rows, field=None))]
    fn status_table(&self, rows: PyDataFrame, field: Option<&str>) -> PyResult<PyDataFrame> {
        let r = reconcile(self.dataset()?.catalog(), &rows.0, field)?;
        Ok(PyDataFrame(r.status_table()?))
    }

    #[staticmethod]
    fn share_text(count: usize, total: usize) -> String {
        Share::new(count, total).to_string()
    }

    // ── Catalog ─────────────────────────────────────────────────────────────

    fn catalog_by_field(&self) -> PyResult<Vec<(String, PyDataFrame)>> {
        Ok(groups_to_py(catalog::by_field(self.dataset()?.catalog())?))
    }

    fn catalog_by_organization(&self) -> PyResult<Vec<(String, PyDataFrame)>> {
        Ok(groups_to_py(catalog::by_organization(self.dataset()?.catalog())?))
    }

    #[pyo3(signature = (fields=Vec::new(), organizations=Vec::new()))]
    fn filter_catalog(
        &self,
        fields: Vec<String>,
        organizations: Vec<String>,
    ) -> PyResult<PyDataFrame> {
        let df = catalog::filter_catalog(self.dataset()?.catalog(), &fields, &organizations)?;
        Ok(PyDataFrame(df))
    }

    /// Catalog series never seen in the ranking, grouped by field.
    fn unranked_by_field(&self) -> PyResult<Vec<(String, PyDataFrame)>> {
        let dataset = self.dataset()?;
        Ok(groups_to_py(catalog::unranked_by_field(
            dataset.catalog(),
            dataset.ranking(),
        )?))
    }
}
