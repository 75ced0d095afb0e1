use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no usable dates found in the selected column '{column}'")]
    EmptyDateDomain { column: String },

    #[error("column '{0}' not found in dataset")]
    UnknownColumn(String),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
