use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Effective server configuration.
///
/// Built once at startup and shared by `Arc` with every component. Every key is
/// optional in the TOML file; missing keys take the defaults below.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root directory holding `{project}/{run}/...`.
    pub projects_dir: PathBuf,

    /// e.g. "0.0.0.0:8080" or ":8080"
    pub listen_address: String,

    /// Directory containing the built frontend (`index.html`, `favicon.ico`, `assets/`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_dir: Option<PathBuf>,

    /// Optional number of worker threads - default is decided by Pingora.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    pub status_poll: StatusPollConfig,
    pub status_stream: StatusStreamConfig,
    pub log_tail: LogTailConfig,
    pub client: ClientConfig,

    /// Extra log levels understood by the line formatter, keyed by level name.
    pub additional_log_levels: BTreeMap<String, LogLevelStyle>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::new(),
            listen_address: ":8080".to_string(),
            frontend_dir: None,
            threads: None,
            status_poll: StatusPollConfig::default(),
            status_stream: StatusStreamConfig::default(),
            log_tail: LogTailConfig::default(),
            client: ClientConfig::default(),
            additional_log_levels: BTreeMap::new(),
        }
    }
}

impl DashboardConfig {
    /// Listen address in a form pingora accepts. A bare `:port` binds all interfaces.
    pub fn listen_addr(&self) -> String {
        match self.listen_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.listen_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusPollConfig {
    pub sleep_ms: u64,
    pub timeout_ms: u64,
}

impl Default for StatusPollConfig {
    fn default() -> Self {
        Self {
            sleep_ms: 1000,
            timeout_ms: 30_000,
        }
    }
}

impl StatusPollConfig {
    pub fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusStreamConfig {
    /// Bytes read from a log file per chunk.
    pub chunk_size: usize,
    /// Wait between reads once the follower has caught up with the producer.
    pub eof_sleep_ms: u64,
    /// Upper bound on how long formatted output may sit unflushed.
    pub flush_sleep_ms: u64,
    /// Formatted bytes after which a follow stream is cut off (unless `notrunc`).
    pub log_truncation_size: usize,
}

impl Default for StatusStreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 128 * 1024, // 128 KiB
            eof_sleep_ms: 500,
            flush_sleep_ms: 300,
            log_truncation_size: 1024 * 1024, // 1 MiB
        }
    }
}

impl StatusStreamConfig {
    pub fn eof_sleep(&self) -> Duration {
        Duration::from_millis(self.eof_sleep_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogTailConfig {
    pub default_line_count: usize,
    /// How far back from the end of a log the tail reader starts scanning.
    pub window_bytes: u64,
}

impl Default for LogTailConfig {
    fn default() -> Self {
        Self {
            default_line_count: 25,
            window_bytes: 128 * 1024, // 128 KiB
        }
    }
}

/// Settings only the UI consumes; served verbatim through `/api/v1/config`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub test_status: ClientTestStatusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientTestStatusConfig {
    pub poll_interval_ms: u64,
    pub backoff_ms: u64,
    pub backoff_jitter_ms: u64,
}

impl Default for ClientTestStatusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            backoff_ms: 2000,
            backoff_jitter_ms: 1000,
        }
    }
}

/// Display style for a log level outside the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogLevelStyle {
    /// CSS class applied to the whole line.
    pub class: String,
    /// Glyph shown in the severity column.
    pub shortname: String,
}
