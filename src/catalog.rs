//! Browsing the series catalog by field and by organization.

use polars::prelude::*;

use crate::aggregation::{fields_present, sorted_unique};
use crate::error::DashError;
use crate::reconcile::reconcile;
use crate::schema::{catalog, require_columns};

/// One heading of a catalog listing and the rows under it.
#[derive(Debug, Clone)]
pub struct CatalogGroup {
    pub key: String,
    /// `(series_name, organization, overview)` in catalog order.
    pub rows: DataFrame,
}

fn listing(catalog_rows: &DataFrame, column: &str, key: &str) -> Result<DataFrame, DashError> {
    let rows = catalog_rows
        .clone()
        .lazy()
        .filter(col(column).eq(lit(key)))
        .select([
            col(catalog::SERIES_NAME),
            col(catalog::ORGANIZATION),
            col(catalog::OVERVIEW),
        ])
        .collect()?;
    Ok(rows)
}

fn group_on(
    catalog_rows: &DataFrame,
    column: &str,
    keys: Vec<String>,
) -> Result<Vec<CatalogGroup>, DashError> {
    keys.into_iter()
        .map(|key| {
            let rows = listing(catalog_rows, column, &key)?;
            Ok(CatalogGroup { key, rows })
        })
        .collect()
}

/// Catalog grouped by field, fields in display order.
pub fn by_field(catalog_rows: &DataFrame) -> Result<Vec<CatalogGroup>, DashError> {
    require_columns(catalog_rows, &catalog::REQUIRED)?;
    let fields = fields_present(catalog_rows)?;
    group_on(catalog_rows, catalog::FIELD_MAJOR, fields)
}

/// Catalog grouped by organization, organizations sorted by name.
pub fn by_organization(catalog_rows: &DataFrame) -> Result<Vec<CatalogGroup>, DashError> {
    require_columns(catalog_rows, &catalog::REQUIRED)?;
    let orgs = sorted_unique(catalog_rows, catalog::ORGANIZATION)?;
    group_on(catalog_rows, catalog::ORGANIZATION, orgs)
}

/// Rows whose field is in `fields` and whose organization is in
/// `organizations`. An empty set does not restrict.
pub fn filter_catalog(
    catalog_rows: &DataFrame,
    fields: &[String],
    organizations: &[String],
) -> Result<DataFrame, DashError> {
    require_columns(catalog_rows, &catalog::REQUIRED)?;

    let mut predicate = lit(true);
    if !fields.is_empty() {
        let set = Series::new(catalog::FIELD_MAJOR.into(), fields);
        predicate = predicate.and(col(catalog::FIELD_MAJOR).is_in(lit(set), false));
    }
    if !organizations.is_empty() {
        let set = Series::new(catalog::ORGANIZATION.into(), organizations);
        predicate = predicate.and(col(catalog::ORGANIZATION).is_in(lit(set), false));
    }

    let out = catalog_rows.clone().lazy().filter(predicate).collect()?;
    Ok(out)
}

/// Catalog series that never appear in `ranking_rows`, grouped by field.
pub fn unranked_by_field(
    catalog_rows: &DataFrame,
    ranking_rows: &DataFrame,
) -> Result<Vec<CatalogGroup>, DashError> {
    let reconciliation = reconcile(catalog_rows, ranking_rows, None)?;
    by_field(&reconciliation.unranked)
}
