use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MangaBatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External process error: {0}")]
    Process(String),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Start point '{name}' is not an entry of {}", .root.display())]
    StartPointNotFound { root: PathBuf, name: String },

    #[error("No files to process under {}", .0.display())]
    EmptyQueue(PathBuf),

    #[error("Invalid {field} '{value}': numeric values must be valid (e.g. 0.5, 1.0)")]
    InvalidThreshold { field: &'static str, value: String },

    #[error("Processing failed for '{}': {detail}", .path.display())]
    ExternalCommandFailed { path: PathBuf, detail: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Translation backend failed: {detail}")]
    TranslationBackendFailed { detail: String },

    #[error("Batch cancelled after {completed}/{total} files")]
    Cancelled { completed: usize, total: usize },

    #[error("Batch worker terminated abnormally: {0}")]
    WorkerPanicked(String),
}

impl MangaBatchError {
    /// True for errors raised before any external work was started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound(_)
                | Self::StartPointNotFound { .. }
                | Self::EmptyQueue(_)
                | Self::InvalidThreshold { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MangaBatchError>;
