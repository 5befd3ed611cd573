use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Unresolved parameter {name}: no entry for {key:?}")]
    UnresolvedParameter { name: &'static str, key: String },

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("DuckDB error: {0}")]
    Store(#[from] duckdb::Error),

    #[error("Query did not finish within {0:?}")]
    StoreTimeout(Duration),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl ReportError {
    /// Whether the error rejects the request itself, so the caller should
    /// redisplay the form rather than report a failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ReportError::Validation(_) | ReportError::UnresolvedParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
