use thiserror::Error;

/// Errors that make a data file unusable.
///
/// Recoverable per-cell problems (malformed tag lists, unknown gender labels)
/// never surface here; they are resolved during decoding.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: invalid year {value:?}")]
    InvalidYear { row: usize, value: String },

    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
