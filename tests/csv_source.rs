use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use estat_dashboard::schema::{catalog, ranking};
use estat_dashboard::{
    CachedSource, CsvSource, DashError, DashboardConfig, OverviewReport, TableSource,
    WindowSelector,
};
use polars::prelude::*;
use tempfile::TempDir;

const RANKING_HEADER: &str =
    " date ,series_name,file_name,main_link,organization,field_major,file_type,rank,access_count";

const RANKING_ROWS: &str = "\
2024-04-01,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,120
2024-04-01,家計調査,kakei.csv,https://example.jp/2,総務省,企業・家計・経済,CSV,2,-5
2024-04-15,住宅‐土地統計調査,jutaku.csv,https://example.jp/3,総務省,住宅・土地・建設,CSV,n/a,12.7
2024-05-02,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,abc
";

const CATALOG: &str = "\
series_name,organization,field_major,overview
国勢調査,総務省,人口・世帯,census
家計調査,総務省,企業・家計・経済,household budget
住宅‐土地統計調査,総務省,住宅・土地・建設,housing
学校基本調査,文部科学省,教育・文化・スポーツ・生活,schools
欠損,,国際,dropped
";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn write_sources(dir: &Path, ranking_rows: &str, catalog_csv: &str) -> DashboardConfig {
    let config = DashboardConfig::with_data_dir(dir);
    fs::write(config.ranking_path(), format!("{RANKING_HEADER}\n{ranking_rows}")).unwrap();
    fs::write(config.catalog_path(), catalog_csv).unwrap();
    config
}

fn i64_column(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name).unwrap().i64().unwrap().into_iter().collect()
}

fn str_column(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn loads_and_types_both_tables() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path(), RANKING_ROWS, CATALOG);
    let dataset = CsvSource::new(config).load().unwrap();

    let bounds = dataset.bounds();
    assert_eq!((bounds.min, bounds.max), (d(2024, 4, 1), d(2024, 5, 2)));

    let table = dataset.ranking();
    assert_eq!(table.column(ranking::DATE).unwrap().dtype(), &DataType::Date);
    assert_eq!(
        i64_column(table, ranking::ACCESS_COUNT),
        vec![Some(120), Some(0), Some(12), Some(0)]
    );
    assert_eq!(
        i64_column(table, ranking::RANK),
        vec![Some(1), Some(2), None, Some(1)]
    );
    assert_eq!(
        str_column(table, ranking::YEAR_MONTH),
        vec!["2024-04", "2024-04", "2024-04", "2024-05"]
    );
    assert_eq!(str_column(table, ranking::SERIES_NAME)[2], "住宅-土地統計調査");

    let cat = dataset.catalog();
    assert_eq!(cat.height(), 4);
    assert_eq!(str_column(cat, catalog::SERIES_NAME)[2], "住宅-土地統計調査");
}

#[test]
fn normalised_names_reconcile_across_tables() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path(), RANKING_ROWS, CATALOG);
    let dataset = CsvSource::new(config).load().unwrap();

    let window = dataset.resolve_window(WindowSelector::AllTime, None).window;
    let report = OverviewReport::build(&dataset, window).unwrap();
    assert_eq!(report.total_access, 132);
    assert_eq!(report.ranked.to_string(), "3 (75.0%)");
    assert_eq!(report.unranked.to_string(), "1 (25.0%)");
}

#[test]
fn catalog_without_overview_column_still_loads() {
    let dir = TempDir::new().unwrap();
    let catalog_csv = "series_name,organization,field_major\n国勢調査,総務省,人口・世帯\n";
    let config = write_sources(dir.path(), RANKING_ROWS, catalog_csv);
    let dataset = CsvSource::new(config).load().unwrap();
    assert!(dataset.catalog().column(catalog::OVERVIEW).is_ok());
}

#[test]
fn unparseable_date_rejects_the_load() {
    let dir = TempDir::new().unwrap();
    let rows = "2024-04-01,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,120\n\
                2024/04/02,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,80\n";
    let config = write_sources(dir.path(), rows, CATALOG);
    let err = CsvSource::new(config).load().unwrap_err();
    assert!(matches!(err, DashError::InvalidData(_)), "got {err:?}");
}

#[test]
fn configured_date_format_is_honoured() {
    let dir = TempDir::new().unwrap();
    let rows = "2024/04/02,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,80\n";
    let mut config = write_sources(dir.path(), rows, CATALOG);
    config.date_format = "%Y/%m/%d".to_string();
    let dataset = CsvSource::new(config).load().unwrap();
    assert_eq!(dataset.bounds().min, d(2024, 4, 2));
}

#[test]
fn missing_ranking_column_is_reported_by_name() {
    let dir = TempDir::new().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    fs::write(
        config.ranking_path(),
        "date,series_name,file_name,main_link,organization,field_major,file_type,rank\n\
         2024-04-01,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1\n",
    )
    .unwrap();
    fs::write(config.catalog_path(), CATALOG).unwrap();

    let err = CsvSource::new(config).load().unwrap_err();
    assert!(matches!(err, DashError::MissingColumn(c) if c == ranking::ACCESS_COUNT));
}

#[test]
fn empty_ranking_table_has_no_date_anchors() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path(), "", CATALOG);
    let err = CsvSource::new(config).load().unwrap_err();
    assert!(matches!(err, DashError::InvalidData(_)), "got {err:?}");
}

#[test]
fn missing_file_is_an_io_or_polars_error() {
    let dir = TempDir::new().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    let err = CsvSource::new(config).load().unwrap_err();
    assert!(matches!(err, DashError::Io(_) | DashError::Polars(_)), "got {err:?}");
}

#[test]
fn cache_reloads_after_file_changes() {
    let dir = TempDir::new().unwrap();
    let config = write_sources(dir.path(), RANKING_ROWS, CATALOG);
    let cache = CachedSource::new(CsvSource::new(config.clone()));

    let first = cache.get().unwrap();
    let again = cache.get().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &again));
    assert_eq!(first.bounds().max, d(2024, 5, 2));

    let extra = "2024-06-30,国勢調査,pop.xlsx,https://example.jp/1,総務省,人口・世帯,Excel,1,10\n";
    fs::write(
        config.ranking_path(),
        format!("{RANKING_HEADER}\n{RANKING_ROWS}{extra}"),
    )
    .unwrap();

    let reloaded = cache.get().unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &reloaded));
    assert_eq!(reloaded.bounds().max, d(2024, 6, 30));
}
