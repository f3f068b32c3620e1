//! Error types for the backup pipeline.
//!
//! Every failure is fatal to the run; the variants only exist so callers can
//! tell the failure classes apart.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing config file, missing key, or an unusable source path.
    #[error("config error: {0}")]
    Config(String),

    /// Client secrets, consent flow or token endpoint failure.
    #[error("authentication error: {0}")]
    Auth(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Drive answered with a non-success status.
    #[error("Drive API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name lookups on Drive that did not land on exactly one item.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unable to find any folder named '{name}'")]
    FolderNotFound { name: String },

    #[error("{count} folders match the name '{name}'")]
    AmbiguousFolder { name: String, count: usize },

    #[error("{count} files match in folder '{folder_id}'")]
    AmbiguousFile { folder_id: String, count: usize },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
