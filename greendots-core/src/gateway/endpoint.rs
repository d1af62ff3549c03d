use crate::gateway::RequestError;
use http::Method;
use percent_encoding::percent_decode_str;
use std::str::FromStr;

const API_PREFIX: &str = "/api/v1/";

/// Every route the dashboard answers. Path parameters are percent-decoded but
/// not yet checked against the filesystem layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Config,
    Version,
    Projects,
    Runs { project: String },
    Plan { project: String, run: String },
    StatusSummary { project: String, run: String },
    StatusPoll { project: String, run: String },
    StatusStream { project: String, run: String, worker: String },
    LogStream { project: String, run: String, test: String },
    LogTail { project: String, run: String, test: String },
    /// Any other `/api` path.
    ApiDocs,
    /// Path below `/assets/`, still percent-encoded.
    Asset { path: String },
    Favicon,
    /// Single-page app entry for every other path.
    Frontend,
}

impl FromStr for Endpoint {
    type Err = RequestError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = path.strip_prefix("/assets/") {
            return Ok(Self::Asset {
                path: rest.to_string(),
            });
        }
        if path == "/favicon.ico" {
            return Ok(Self::Favicon);
        }

        let Some(rest) = path.strip_prefix(API_PREFIX) else {
            return Ok(if path == "/api" || path.starts_with("/api/") {
                Self::ApiDocs
            } else {
                Self::Frontend
            });
        };

        // Split first, decode second: an encoded '/' stays inside its segment.
        let segments = rest
            .split('/')
            .map(decode_segment)
            .collect::<Result<Vec<_>, _>>()?;
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        let endpoint = match segments.as_slice() {
            ["config"] => Self::Config,
            ["version"] => Self::Version,
            ["projects"] => Self::Projects,
            ["projects", project, "runs"] => Self::Runs {
                project: project.to_string(),
            },
            ["projects", project, "runs", run, leaf] => {
                let (project, run) = (project.to_string(), run.to_string());
                match *leaf {
                    "plan" => Self::Plan { project, run },
                    "status_summary" => Self::StatusSummary { project, run },
                    "status_poll" => Self::StatusPoll { project, run },
                    _ => Self::ApiDocs,
                }
            }
            ["projects", project, "runs", run, "status_stream", worker] => Self::StatusStream {
                project: project.to_string(),
                run: run.to_string(),
                worker: worker.to_string(),
            },
            ["projects", project, "runs", run, "test", test, leaf] => {
                let (project, run, test) = (project.to_string(), run.to_string(), test.to_string());
                match *leaf {
                    "log_stream" => Self::LogStream { project, run, test },
                    "log_tail" => Self::LogTail { project, run, test },
                    _ => Self::ApiDocs,
                }
            }
            _ => Self::ApiDocs,
        };

        Ok(endpoint)
    }
}

impl Endpoint {
    /// Methods the endpoint answers; HEAD is implied wherever GET is listed.
    pub(crate) fn method(&self) -> Method {
        match self {
            Self::StatusPoll { .. } => Method::POST,
            _ => Method::GET,
        }
    }

    /// Whether a wrong method gets `405` (named API routes) or `404`.
    pub(crate) fn is_named_api(&self) -> bool {
        !matches!(
            self,
            Self::ApiDocs | Self::Asset { .. } | Self::Favicon | Self::Frontend
        )
    }

    pub(crate) fn accepts(&self, method: &Method) -> bool {
        let expected = self.method();
        *method == expected || (expected == Method::GET && *method == Method::HEAD)
    }

    /// Responses under `/api` must never be cached.
    pub(crate) fn is_api(&self) -> bool {
        self.is_named_api() || matches!(self, Self::ApiDocs)
    }
}

fn decode_segment(segment: &str) -> Result<String, RequestError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| RequestError::BadPath)
}

/// Value of `name` in a raw query string, percent-decoded. A bare flag
/// (`?notrunc`) yields an empty string.
pub(crate) fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then(|| {
            percent_decode_str(&value.replace('+', " "))
                .decode_utf8_lossy()
                .into_owned()
        })
    })
}
