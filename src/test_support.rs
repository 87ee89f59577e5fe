//! Shared fixtures for unit tests.
//!
//! Ranking rows (date, series, organization, field, file type, rank, access):
//!
//! | date       | series     | org    | field      | type  | rank | access |
//! |------------|------------|--------|------------|-------|------|--------|
//! | 2024-01-05 | 国勢調査   | 総務省 | 人口・世帯 | Excel | 1    | 100    |
//! | 2024-01-05 | 労働力調査 | 総務省 | 労働・賃金 | CSV   | 2    | 50     |
//! | 2024-01-20 | 貿易統計   | 財務省 | 国際       | CSV   | 3    | 30     |
//! | 2024-02-10 | 国勢調査   | 総務省 | 人口・世帯 | Excel | 1    | 80     |
//! | 2024-02-10 | 人口推計   | 総務省 | 人口・世帯 | PDF   | 3    | 20     |
//! | 2024-03-30 | 未分類統計 | 内閣府 | (null)     | CSV   | 5    | 10     |
//! | 2024-03-31 | 国勢調査   | 総務省 | 人口・世帯 | CSV   | 2    | 40     |
//! | 2024-03-31 | 貿易統計   | 財務省 | 国際       | CSV   | 1    | 60     |

use chrono::NaiveDate;
use polars::prelude::*;

use crate::loader::{prepare_catalog, prepare_ranking};
use crate::schema::{catalog, ranking};
use crate::source::Dataset;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn raw_ranking() -> DataFrame {
    df!(
        ranking::DATE => [
            "2024-01-05", "2024-01-05", "2024-01-20", "2024-02-10",
            "2024-02-10", "2024-03-30", "2024-03-31", "2024-03-31",
        ],
        ranking::SERIES_NAME => [
            "国勢調査", "労働力調査", "貿易統計", "国勢調査",
            "人口推計", "未分類統計", "国勢調査", "貿易統計",
        ],
        ranking::FILE_NAME => [
            "pop.xlsx", "labour.csv", "trade.csv", "pop.xlsx",
            "estimate.pdf", "misc.csv", "pop2.csv", "trade.csv",
        ],
        ranking::MAIN_LINK => [
            "https://example.jp/1", "https://example.jp/2", "https://example.jp/5",
            "https://example.jp/1", "https://example.jp/3", "https://example.jp/6",
            "https://example.jp/4", "https://example.jp/5",
        ],
        ranking::ORGANIZATION => [
            "総務省", "総務省", "財務省", "総務省",
            "総務省", "内閣府", "総務省", "財務省",
        ],
        ranking::FIELD_MAJOR => [
            Some("人口・世帯"), Some("労働・賃金"), Some("国際"), Some("人口・世帯"),
            Some("人口・世帯"), None, Some("人口・世帯"), Some("国際"),
        ],
        ranking::FILE_TYPE => ["Excel", "CSV", "CSV", "Excel", "PDF", "CSV", "CSV", "CSV"],
        ranking::RANK => ["1", "2", "3", "1", "3", "5", "2", "1"],
        ranking::ACCESS_COUNT => ["100", "50", "30", "80", "20", "10", "40", "60"]
    )
    .unwrap()
}

pub fn raw_catalog() -> DataFrame {
    df!(
        catalog::SERIES_NAME => [
            "国勢調査", "人口推計", "人口動態調査", "労働力調査",
            "毎月勤労統計調査", "貿易統計", "科学技術研究調査",
        ],
        catalog::ORGANIZATION => [
            "総務省", "総務省", "厚生労働省", "総務省",
            "厚生労働省", "財務省", "総務省",
        ],
        catalog::FIELD_MAJOR => [
            "人口・世帯", "人口・世帯", "人口・世帯", "労働・賃金",
            "労働・賃金", "国際", "情報通信・科学技術",
        ],
        catalog::OVERVIEW => [
            "census", "estimates", "vital statistics", "labour force",
            "monthly labour", "trade", "R&D survey",
        ]
    )
    .unwrap()
}

pub fn ranking_frame() -> DataFrame {
    prepare_ranking(raw_ranking(), "%Y-%m-%d").unwrap()
}

pub fn catalog_frame() -> DataFrame {
    prepare_catalog(raw_catalog()).unwrap()
}

pub fn dataset() -> Dataset {
    Dataset::new(ranking_frame(), catalog_frame()).unwrap()
}

/// Read a (string key, i64 value) frame into pairs, in row order.
pub fn pairs(df: &DataFrame, key: &str, value: &str) -> Vec<(String, i64)> {
    let keys = df.column(key).unwrap().str().unwrap();
    let values = df.column(value).unwrap().i64().unwrap();
    keys.into_iter()
        .zip(values)
        .map(|(k, v)| (k.unwrap_or("<null>").to_string(), v.unwrap()))
        .collect()
}

/// Read a string column into a vector, in row order.
pub fn strings(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or("<null>").to_string())
        .collect()
}
