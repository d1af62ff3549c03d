mod check;
mod dump;

pub use check::*;
use clap::Subcommand;
pub use dump::*;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration and exit
    Check {
        /// Path to the config file
        #[arg(default_value = "config.toml")]
        path: PathBuf,

        /// Print errors without color or hints
        #[arg(short, long, default_value = "false")]
        plain: bool,
    },

    /// Print resolved configuration, defaults included
    Dump {
        #[arg(default_value = "config.toml")]
        path: PathBuf,

        /// Output as TOML instead of JSON
        #[arg(long)]
        toml: bool,
    },
}

/// Execute a `config` subcommand.
pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Check { path, plain } => check(path, plain),
        ConfigCmd::Dump { path, toml } => dump(path, toml),
    }
}
