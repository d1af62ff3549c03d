use clap::{Parser, Subcommand};
use greendots_core::cli::{self, ConfigCmd};
use greendots_core::conf::load_config;
use greendots_core::logging::init_logging;
use greendots_core::server;
use greendots_core::version::{VERSION, full_version};
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(
    name = "greendots",
    version = VERSION,
    about = "greendots: live dashboard for distributed test runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard (default)
    Run {
        /// Path to the dashboard config file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Config { cmd }) => cli::run(cmd),

        Some(Command::Version) => {
            print!("{}", full_version());
            Ok(())
        }

        Some(Command::Run { config }) => serve(config),

        None => serve(PathBuf::from(DEFAULT_CONFIG)),
    };

    if let Err(e) = result {
        eprintln!("greendots: {e:#}");
        std::process::exit(1);
    }
}

fn serve(config_path: PathBuf) -> anyhow::Result<()> {
    init_logging();

    let cfg = load_config(&config_path)?;
    tracing::info!(config = %config_path.display(), "configuration loaded");

    server::run(cfg)
}
