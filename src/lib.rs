pub mod aggregation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod reconcile;
pub mod report;
pub mod schema;
pub mod source;
pub mod vocabulary;
pub mod window;

#[cfg(feature = "python")]
mod model;
#[cfg(test)]
mod test_support;

pub use aggregation::Measure;
pub use config::DashboardConfig;
pub use error::DashError;
pub use filter::{filter_rows, RowFilter};
pub use reconcile::{reconcile, Reconciliation, Share};
pub use report::{FieldReport, OverviewReport, SeriesDrilldown};
pub use source::{CachedSource, CsvSource, Dataset, DateBounds, FrameSource, TableSource};
pub use window::{resolve_window, DateWindow, WindowResolution, WindowSelector, WindowWarning};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::model::EstatModel;
    use crate::schema;

    /// Export schema constants as Python submodules
    fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Ranking
        let ranking = PyModule::new(m.py(), "ranking")?;
        ranking.add("DATE", schema::ranking::DATE)?;
        ranking.add("SERIES_NAME", schema::ranking::SERIES_NAME)?;
        ranking.add("FILE_NAME", schema::ranking::FILE_NAME)?;
        ranking.add("MAIN_LINK", schema::ranking::MAIN_LINK)?;
        ranking.add("ORGANIZATION", schema::ranking::ORGANIZATION)?;
        ranking.add("FIELD_MAJOR", schema::ranking::FIELD_MAJOR)?;
        ranking.add("FILE_TYPE", schema::ranking::FILE_TYPE)?;
        ranking.add("RANK", schema::ranking::RANK)?;
        ranking.add("ACCESS_COUNT", schema::ranking::ACCESS_COUNT)?;
        ranking.add("YEAR_MONTH", schema::ranking::YEAR_MONTH)?;
        m.add_submodule(&ranking)?;

        // Catalog
        let catalog = PyModule::new(m.py(), "catalog")?;
        catalog.add("SERIES_NAME", schema::catalog::SERIES_NAME)?;
        catalog.add("ORGANIZATION", schema::catalog::ORGANIZATION)?;
        catalog.add("FIELD_MAJOR", schema::catalog::FIELD_MAJOR)?;
        catalog.add("OVERVIEW", schema::catalog::OVERVIEW)?;
        m.add_submodule(&catalog)?;

        // Derived output columns
        let output = PyModule::new(m.py(), "output")?;
        output.add("COUNT", schema::output::COUNT)?;
        output.add("RANKED", schema::output::RANKED)?;
        m.add_submodule(&output)?;

        Ok(())
    }

    #[pymodule]
    fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<EstatModel>()?;
        add_schema_exports(m)?;
        Ok(())
    }
}
