use crate::layout::LayoutError;
use crate::static_files::ServeError;
use crate::status::StatusError;
use http::StatusCode;
use thiserror::Error;

/// Anything that ends a request before a successful response is started.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request path is not valid UTF-8 once decoded")]
    BadPath,

    #[error("poll body is not a JSON array of sizes: {0}")]
    BadPollBody(#[source] serde_json::Error),

    #[error("poll body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("`lines` must be an integer, got '{0}'")]
    BadLineCount(String),

    #[error("route not available")]
    NotFound,

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing to (or reading from) the client failed.
    #[error("client transport error: {0}")]
    Transport(#[from] Box<pingora::Error>),

    #[error("failed to read {what}: {source}")]
    Io {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadPath | Self::BadPollBody(_) | Self::BadLineCount(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Layout(err) => err.status_code(),
            Self::Status(err) => err.status_code(),
            Self::Serve(err) => err.status_code(),
            Self::Encode(_) | Self::Io { .. } | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
