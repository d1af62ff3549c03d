use crate::layout::LayoutError;
use http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to read status shard {path}: {source}")]
    ReadShard {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("poll request must list at least one shard")]
    EmptyPoll,
}

impl StatusError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Layout(err) => err.status_code(),
            Self::ReadShard { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmptyPoll => StatusCode::BAD_REQUEST,
        }
    }
}
