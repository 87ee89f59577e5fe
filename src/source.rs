//! Data access: the loaded tables, where they come from, and reload caching.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::DashError;
use crate::loader;
use crate::window::{resolve_window, WindowResolution, WindowSelector};

/// First and last ranking date; anchors for every window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// The two typed tables, immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    ranking: DataFrame,
    catalog: DataFrame,
    bounds: DateBounds,
}

impl Dataset {
    /// Build from already typed frames (see `loader::prepare_*`).
    pub fn new(ranking: DataFrame, catalog: DataFrame) -> Result<Self, DashError> {
        let (min, max) = loader::date_bounds(&ranking)?;
        Ok(Self {
            ranking,
            catalog,
            bounds: DateBounds { min, max },
        })
    }

    pub fn ranking(&self) -> &DataFrame {
        &self.ranking
    }

    pub fn catalog(&self) -> &DataFrame {
        &self.catalog
    }

    pub fn bounds(&self) -> DateBounds {
        self.bounds
    }

    pub fn resolve_window(
        &self,
        selector: WindowSelector,
        custom: Option<&[NaiveDate]>,
    ) -> WindowResolution {
        resolve_window(selector, self.bounds.min, self.bounds.max, custom)
    }
}

/// Modification stamp of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

pub type SourceSignature = Vec<FileStamp>;

/// Anything that can hand over the two validated tables.
pub trait TableSource {
    fn load(&self) -> Result<Dataset, DashError>;

    /// Identifies the current state of the underlying data. `None` means the
    /// data never changes and a cached copy stays valid forever.
    fn signature(&self) -> Result<Option<SourceSignature>, DashError> {
        Ok(None)
    }
}

/// Reads both tables from CSV files named by the config.
#[derive(Debug, Clone)]
pub struct CsvSource {
    config: DashboardConfig,
}

impl CsvSource {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    fn stamp(path: PathBuf) -> Result<FileStamp, DashError> {
        let meta = fs::metadata(&path)?;
        Ok(FileStamp {
            modified: meta.modified().ok(),
            len: meta.len(),
            path,
        })
    }
}

impl TableSource for CsvSource {
    fn load(&self) -> Result<Dataset, DashError> {
        let ranking = loader::load_ranking(&self.config.ranking_path(), &self.config.date_format)?;
        let catalog = loader::load_catalog(&self.config.catalog_path())?;
        let dataset = Dataset::new(ranking, catalog)?;
        info!(
            min_date = %dataset.bounds.min,
            max_date = %dataset.bounds.max,
            "dataset ready"
        );
        Ok(dataset)
    }

    fn signature(&self) -> Result<Option<SourceSignature>, DashError> {
        Ok(Some(vec![
            Self::stamp(self.config.ranking_path())?,
            Self::stamp(self.config.catalog_path())?,
        ]))
    }
}

/// Tables already in memory.
#[derive(Debug, Clone)]
pub struct FrameSource {
    ranking: DataFrame,
    catalog: DataFrame,
}

impl FrameSource {
    pub fn new(ranking: DataFrame, catalog: DataFrame) -> Self {
        Self { ranking, catalog }
    }
}

impl TableSource for FrameSource {
    fn load(&self) -> Result<Dataset, DashError> {
        Dataset::new(self.ranking.clone(), self.catalog.clone())
    }
}

/// Caching decorator: loads once and reloads only when the inner source's
/// signature changes.
pub struct CachedSource<S> {
    inner: S,
    cached: Mutex<Option<(Option<SourceSignature>, Arc<Dataset>)>>,
}

impl<S: TableSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn get(&self) -> Result<Arc<Dataset>, DashError> {
        let signature = self.inner.signature()?;
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| DashError::General("dataset cache lock poisoned".into()))?;

        if let Some((cached_sig, dataset)) = cached.as_ref() {
            if *cached_sig == signature {
                debug!("dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
            debug!("source files changed, reloading");
        }

        let dataset = Arc::new(self.inner.load()?);
        *cached = Some((signature, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached copy; the next `get` reloads. Also clears a poisoned
    /// lock.
    pub fn invalidate(&self) {
        let mut cached = self.cached.lock().unwrap_or_else(|poisoned| {
            warn!("dataset cache lock poisoned, discarding cached copy");
            poisoned.into_inner()
        });
        *cached = None;
        drop(cached);
        self.cached.clear_poison();
    }
}

impl<S: TableSource> TableSource for CachedSource<S> {
    fn load(&self) -> Result<Dataset, DashError> {
        self.get().map(|dataset| (*dataset).clone())
    }

    fn signature(&self) -> Result<Option<SourceSignature>, DashError> {
        self.inner.signature()
    }
}
