use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Data directory not found: {}", .0.display())]
    DataDirNotFound(PathBuf),

    #[error("Missing source files in {}: {}", .dir.display(), .files.join(", "))]
    MissingSourceFiles { dir: PathBuf, files: Vec<String> },

    #[error("No rows were loaded from any source file")]
    EmptyConsolidation,

    #[error("Unknown text encoding label: {0}")]
    UnknownEncoding(String),

    #[error("Column length mismatch for '{column}': expected {expected} rows, got {actual}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
