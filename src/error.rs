// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("No usable records: input is empty or no row has a group value")]
    EmptyInput,

    #[error("Cannot lay out a graph with zero nodes")]
    EmptyGraph,

    #[error("Unsupported layout '{0}' (expected spring, circular, shell or kamada_kawai)")]
    UnsupportedLayout(String),

    #[error("Invalid group key '{0}' (expected genre or studio)")]
    InvalidGroupKey(String),

    #[error("No position computed for node '{0}'")]
    MissingPosition(String),

    #[error("Hierarchy invariant violated: {0}")]
    Invariant(String),

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Wraps an I/O error with the path that produced it.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ReelError::Io {
            source,
            path: path.into(),
        }
    }

    /// True for errors caused by caller input rather than the environment.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLayout(_) | Self::InvalidGroupKey(_)
        )
    }
}

// Allow `?` on std::io::Error by converting to ReelError::Io with unknown path.
impl From<std::io::Error> for ReelError {
    fn from(source: std::io::Error) -> Self {
        ReelError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
