use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tactile_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tactile")]
#[command(author, version, about = "A seamless, scroll-reactive terminal marquee")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of ~/.config/tactile/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Print the per-item loop schedule
    Schedule {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run the marquee headless with scripted scroll samples
    Simulate(commands::simulate::SimulateArgs),
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Write the default config
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Install the tracing subscriber.
///
/// While the TUI owns the terminal, logs go to a file in the data directory.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the file is broken
    if let Some(Commands::Config { action }) = &cli.command {
        let path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
        return match action {
            ConfigAction::Path => commands::config::path(&path),
            ConfigAction::Init { force } => commands::config::init(&path, *force),
        };
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = Arc::new(config);

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Schedule { json }) => commands::schedule::run(&config, json),
        Some(Commands::Simulate(args)) => commands::simulate::run(&config, &args),
        Some(Commands::Config { .. }) => Ok(()),
    }
}
