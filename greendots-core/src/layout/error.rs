use http::StatusCode;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("path component '{component}' is not allowed")]
    Traversal { component: String },

    #[error("{path} does not exist")]
    NotFound { path: PathBuf },

    #[error("failed to decode run plan {path}: {source}")]
    MalformedPlan {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LayoutError {
    /// Classify an I/O failure on `path`; a missing file is its own variant.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// A run whose plan cannot be read is as good as absent to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Traversal { .. } | Self::NotFound { .. } | Self::MalformedPlan { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
