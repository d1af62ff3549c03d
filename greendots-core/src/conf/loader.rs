use crate::conf::error::ConfigError;
use crate::conf::types::DashboardConfig;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

/// Read, parse, and validate a configuration file.
pub fn load_config(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let cfg: DashboardConfig =
        toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;

    validate_config(&cfg)?;

    tracing::debug!(
        path = %path.display(),
        projects_dir = %cfg.projects_dir.display(),
        extra_levels = cfg.additional_log_levels.len(),
        "configuration loaded"
    );

    Ok(cfg)
}

/// Reject configurations the engine cannot run with.
pub fn validate_config(cfg: &DashboardConfig) -> Result<(), ConfigError> {
    if cfg.projects_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingProjectsDir);
    }

    if cfg.listen_addr().parse::<SocketAddr>().is_err() {
        return Err(ConfigError::InvalidListenAddress {
            address: cfg.listen_address.clone(),
        });
    }

    let non_zero = [
        ("status_poll.sleep_ms", cfg.status_poll.sleep_ms as usize),
        ("status_stream.chunk_size", cfg.status_stream.chunk_size),
        (
            "status_stream.eof_sleep_ms",
            cfg.status_stream.eof_sleep_ms as usize,
        ),
    ];
    if let Some((field, _)) = non_zero.into_iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ZeroValue { field });
    }

    if let Some((level, _)) = cfg
        .additional_log_levels
        .iter()
        .find(|(_, style)| style.shortname.is_empty())
    {
        return Err(ConfigError::EmptyLevelShortname {
            level: level.clone(),
        });
    }

    Ok(())
}

impl FromStr for DashboardConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cfg: Self = toml::from_str(s).map_err(|e| ConfigError::parse("<inline>", e))?;
        validate_config(&cfg)?;
        Ok(cfg)
    }
}
