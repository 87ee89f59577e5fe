#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    /// An aggregate or filter referenced a column the frame does not carry.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A source file lacks a column the loader requires.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Unknown window selector: {0}")]
    InvalidSelector(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),
}

#[cfg(feature = "python")]
impl From<DashError> for PyErr {
    fn from(err: DashError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PyErr> for DashError {
    fn from(err: PyErr) -> Self {
        DashError::General(err.to_string())
    }
}
