//! Column-name constants for the ranking and catalog tables.
//! Single source of truth - exported to Python via PyO3.

use polars::prelude::DataFrame;

use crate::error::DashError;

// ── Ranking columns ─────────────────────────────────────────────────────────
pub mod ranking {
    pub const DATE: &str = "date";
    pub const SERIES_NAME: &str = "series_name";
    pub const FILE_NAME: &str = "file_name";
    pub const MAIN_LINK: &str = "main_link";
    pub const ORGANIZATION: &str = "organization";
    pub const FIELD_MAJOR: &str = "field_major";
    pub const FILE_TYPE: &str = "file_type";
    pub const RANK: &str = "rank";
    pub const ACCESS_COUNT: &str = "access_count";

    /// Derived at load from `date`.
    pub const YEAR_MONTH: &str = "year_month";

    pub const REQUIRED: [&str; 9] = [
        DATE,
        SERIES_NAME,
        FILE_NAME,
        MAIN_LINK,
        ORGANIZATION,
        FIELD_MAJOR,
        FILE_TYPE,
        RANK,
        ACCESS_COUNT,
    ];
}

// ── Series catalog columns ──────────────────────────────────────────────────
pub mod catalog {
    pub const SERIES_NAME: &str = "series_name";
    pub const ORGANIZATION: &str = "organization";
    pub const FIELD_MAJOR: &str = "field_major";
    pub const OVERVIEW: &str = "overview";

    pub const REQUIRED: [&str; 3] = [SERIES_NAME, ORGANIZATION, FIELD_MAJOR];
}

// ── Aggregate output columns ────────────────────────────────────────────────
pub mod output {
    /// Row count produced by count-style distributions.
    pub const COUNT: &str = "count";
    /// Boolean flag on catalog rows: name present in the filtered ranking.
    pub const RANKED: &str = "ranked";
}

/// Fail with `ColumnNotFound` unless every name is a column of `df`.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashError::ColumnNotFound(col_name.to_string()));
        }
    }
    Ok(())
}
