use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("file not found")]
    NotFound,

    #[error("access denied")]
    Forbidden,

    #[error("malformed path")]
    BadPath,

    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    /// Classify an error from opening or reading a file.
    pub(crate) fn from_open(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadPath => StatusCode::BAD_REQUEST,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub enum StaticBody {
    Empty,
    /// Small files, compressed bodies and in-memory slices.
    Bytes(Bytes),
    /// Streamed from disk. `remaining` is fixed when the response is built, so
    /// a file that keeps growing never overruns its `Content-Length`.
    File { file: fs::File, remaining: u64 },
}

pub struct StaticResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: StaticBody,
}

/// Conditional request headers for cache validation and content negotiation.
#[derive(Debug, Default)]
pub struct ConditionalHeaders {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub accept_encoding: Option<String>,
    pub range: Option<String>,
}

impl ConditionalHeaders {
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let get = |name: http::header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            if_none_match: get(http::header::IF_NONE_MATCH),
            if_modified_since: get(http::header::IF_MODIFIED_SINCE),
            accept_encoding: get(http::header::ACCEPT_ENCODING),
            range: get(http::header::RANGE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// API data and the frontend entry points: never cached anywhere.
    NoStore,
    /// Content-hashed build output.
    Immutable,
}

#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    /// Overrides the type guessed from the extension.
    pub content_type: Option<&'static str>,
    pub cache: CachePolicy,
    /// Whether small text bodies may be brotli/gzip encoded.
    pub compress: bool,
}

impl ServeOptions {
    /// Raw data files under `/api`: exact bytes, never cached.
    pub fn api_data(content_type: &'static str) -> Self {
        Self {
            content_type: Some(content_type),
            cache: CachePolicy::NoStore,
            compress: false,
        }
    }

    pub fn frontend(cache: CachePolicy) -> Self {
        Self {
            content_type: None,
            cache,
            compress: true,
        }
    }
}
