use crate::conf::{ConfigError, DashboardConfig, load_config};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub fn check(path: PathBuf, plain: bool) -> anyhow::Result<()> {
    match load_config(&path) {
        Ok(cfg) => {
            print_summary(&cfg, plain);
            Ok(())
        }
        Err(err) => {
            print_config_error(&err, plain);
            std::process::exit(1);
        }
    }
}

fn print_summary(cfg: &DashboardConfig, plain: bool) {
    let lines = [
        "Config loaded successfully".to_string(),
        format!("projects in {}", cfg.projects_dir.display()),
        format!("listening on {}", cfg.listen_addr()),
        match &cfg.frontend_dir {
            Some(dir) => format!("frontend served from {}", dir.display()),
            None => "no frontend configured".to_string(),
        },
        format!("{} additional log levels", cfg.additional_log_levels.len()),
    ];

    for line in lines {
        if plain {
            println!("✔ {line}");
        } else {
            println!("{} {line}", "✔".green());
        }
    }
}

fn print_config_error(err: &ConfigError, plain: bool) {
    if plain {
        eprintln!("{err}");
        return;
    }

    eprintln!("{} {err}", "error:".red().bold());
    if let Some(hint) = config_error_hint(err) {
        eprintln!();
        eprintln!("{}", hint.dimmed());
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::MissingProjectsDir => Some(
            "Point the dashboard at the directory your test runs write to.\n\
             \n\
             Example:\n\
             \n\
             projects_dir = \"/mnt/shared/greendots\"",
        ),

        ConfigError::InvalidListenAddress { .. } => Some(
            "Listen addresses are `host:port`, or `:port` to bind every interface.\n\
             \n\
             Example:\n\
             \n\
             listen_address = \":8080\"",
        ),

        ConfigError::ZeroValue { .. } => Some(
            "Chunk sizes and sleep intervals must be positive; remove the key to use its default.",
        ),

        ConfigError::EmptyLevelShortname { .. } => Some(
            "Every additional log level needs a glyph for the severity column.\n\
             \n\
             Example:\n\
             \n\
             [additional_log_levels.TRACE]\n\
             class = \"d\"\n\
             shortname = \"T\"",
        ),

        ConfigError::ReadFile { .. } | ConfigError::Parse { .. } => None,
    }
}
