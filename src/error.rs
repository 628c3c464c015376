use std::path::PathBuf;
use thiserror::Error;

pub type TallyResult<T> = Result<T, TallyError>;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },

    #[error("Strategies disagree on: {0}")]
    Mismatch(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TallyError {
    /// Container-level failure for `path` (unreadable archive, no worksheet, ...)
    pub fn workbook(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        TallyError::Workbook {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
