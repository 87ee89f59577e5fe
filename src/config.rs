use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::window::WindowSelector;

pub const DEFAULT_RANKING_FILE: &str = "estat_ranking_merged.csv";
pub const DEFAULT_CATALOG_FILE: &str = "estat_all_series_details_normalized.csv";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TOP_N: usize = 10;

/// Where the two source tables live and how the dashboard starts up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub ranking_file: String,
    pub catalog_file: String,
    /// strftime format of the ranking `date` column.
    pub date_format: String,
    pub default_window: WindowSelector,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            ranking_file: DEFAULT_RANKING_FILE.to_string(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            default_window: WindowSelector::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DashboardConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `ESTAT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("ESTAT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("ESTAT_RANKING_FILE") {
            config.ranking_file = file;
        }
        if let Some(file) = lookup("ESTAT_CATALOG_FILE") {
            config.catalog_file = file;
        }
        if let Some(format) = lookup("ESTAT_DATE_FORMAT") {
            config.date_format = format;
        }
        if let Some(value) = lookup("ESTAT_DEFAULT_WINDOW") {
            match value.parse() {
                Ok(selector) => config.default_window = selector,
                Err(e) => warn!(%value, error = %e, "ignoring ESTAT_DEFAULT_WINDOW"),
            }
        }
        if let Some(value) = lookup("ESTAT_TOP_N") {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.top_n = n,
                _ => warn!(%value, "ignoring ESTAT_TOP_N, expected a positive integer"),
            }
        }

        config
    }

    pub fn ranking_path(&self) -> PathBuf {
        self.data_dir.join(&self.ranking_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }
}
