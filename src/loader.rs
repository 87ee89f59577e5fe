//! CSV loading and column typing for the two source tables.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use crate::error::DashError;
use crate::schema::{catalog, ranking};

/// Unicode hyphen some exports use inside series names.
const UNICODE_HYPHEN: &str = "\u{2010}";
const WHITESPACE: &str = " \t\r\n";

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names.
pub fn read_csv_as_strings(path: &Path) -> Result<DataFrame, DashError> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

/// Fail with `MissingColumn` unless the source frame carries every column.
fn require_source_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Type a string-only ranking frame.
///
/// `date` is parsed strictly with `date_format`; one bad or empty value
/// rejects the whole table. `access_count` coerces to a non-negative
/// integer, `rank` to an integer (null when unparseable), and `year_month`
/// is derived from `date`.
pub fn prepare_ranking(raw: DataFrame, date_format: &str) -> Result<DataFrame, DashError> {
    require_source_columns(&raw, &ranking::REQUIRED)?;

    let df = parse_date_column(raw, ranking::DATE, date_format)?;

    let df = df
        .lazy()
        .with_columns([
            col(ranking::ACCESS_COUNT)
                .str()
                .strip_chars(lit(WHITESPACE))
                .cast(DataType::Float64)
                .cast(DataType::Int64)
                .fill_null(lit(0i64)),
            col(ranking::RANK)
                .str()
                .strip_chars(lit(WHITESPACE))
                .cast(DataType::Float64)
                .cast(DataType::Int64),
            normalized_series_name(),
            col(ranking::DATE)
                .dt()
                .strftime("%Y-%m")
                .alias(ranking::YEAR_MONTH),
        ])
        .with_column(
            when(col(ranking::ACCESS_COUNT).lt(lit(0i64)))
                .then(lit(0i64))
                .otherwise(col(ranking::ACCESS_COUNT))
                .alias(ranking::ACCESS_COUNT),
        )
        .collect()?;

    Ok(df)
}

/// Type a string-only catalog frame.
///
/// Rows missing a series name, organization or field are dropped. A missing
/// `overview` column is added as nulls.
pub fn prepare_catalog(raw: DataFrame) -> Result<DataFrame, DashError> {
    require_source_columns(&raw, &catalog::REQUIRED)?;

    let mut lazy = raw.clone().lazy();
    if raw.column(catalog::OVERVIEW).is_err() {
        lazy = lazy.with_column(lit(NULL).cast(DataType::String).alias(catalog::OVERVIEW));
    }

    let df = lazy
        .with_column(normalized_series_name())
        .filter(
            col(catalog::SERIES_NAME)
                .is_not_null()
                .and(col(catalog::ORGANIZATION).is_not_null())
                .and(col(catalog::FIELD_MAJOR).is_not_null()),
        )
        .collect()?;

    Ok(df)
}

/// Load and type the ranking CSV.
pub fn load_ranking(path: &Path, date_format: &str) -> Result<DataFrame, DashError> {
    let raw = read_csv_as_strings(path)?;
    let df = prepare_ranking(raw, date_format)?;
    info!(path = %path.display(), rows = df.height(), "loaded ranking table");
    Ok(df)
}

/// Load and type the series catalog CSV.
pub fn load_catalog(path: &Path) -> Result<DataFrame, DashError> {
    let raw = read_csv_as_strings(path)?;
    let raw_rows = raw.height();
    let df = prepare_catalog(raw)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        dropped = raw_rows - df.height(),
        "loaded series catalog"
    );
    Ok(df)
}

/// Earliest and latest `date` of a typed ranking frame.
pub fn date_bounds(df: &DataFrame) -> Result<(NaiveDate, NaiveDate), DashError> {
    let bounds = df
        .clone()
        .lazy()
        .select([
            col(ranking::DATE).min().alias("min"),
            col(ranking::DATE).max().alias("max"),
        ])
        .collect()?;

    let min = bounds.column("min")?.get(0)?;
    let max = bounds.column("max")?.get(0)?;
    match (min, max) {
        (AnyValue::Date(min), AnyValue::Date(max)) => Ok((days_to_date(min)?, days_to_date(max)?)),
        _ => Err(DashError::InvalidData(
            "ranking table has no dates to anchor the date window".to_string(),
        )),
    }
}

/// Convert a polars Date (days since the Unix epoch) to a calendar date.
pub fn days_to_date(days: i32) -> Result<NaiveDate, DashError> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
        .ok_or_else(|| DashError::InvalidData(format!("date out of range: {days} days")))
}

fn normalized_series_name() -> Expr {
    col(ranking::SERIES_NAME)
        .str()
        .replace_all(lit(UNICODE_HYPHEN), lit("-"), true)
}

/// Parse a string column to Date. Any value that fails to parse, or is
/// empty, is a load error.
fn parse_date_column(df: DataFrame, column: &str, format: &str) -> Result<DataFrame, DashError> {
    let df = df
        .lazy()
        .with_columns([col(column)
            .str()
            .strip_chars(lit(WHITESPACE))
            .str()
            .to_date(StrptimeOptions {
                format: Some(format.into()),
                strict: true,
                ..Default::default()
            })])
        .collect()
        .map_err(|e| DashError::InvalidData(format!("unparseable value in '{column}': {e}")))?;

    let null_count = df.column(column)?.null_count();
    if null_count > 0 {
        return Err(DashError::InvalidData(format!(
            "Column '{}' has {} empty values; every row needs a date",
            column, null_count
        )));
    }
    Ok(df)
}
