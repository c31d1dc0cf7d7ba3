//! Geosort CLI - sorts a folder of photos into per-city subfolders.
//!
//! Each photo's capture location is read from its EXIF GPS block (or the
//! OS metadata index as a fallback), reverse geocoded to a city, and the
//! file is moved into a folder named after that city. Photos that cannot
//! be placed go to `problematic_images`.
//!
//! # Usage
//!
//! ```bash
//! # Sort a folder in place
//! geosort sort ~/Pictures/inbox
//!
//! # Preview the moves and keep a report
//! geosort sort ~/Pictures/inbox --dry-run --report run.json
//!
//! # View configuration
//! geosort config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Geosort - sort photos into per-city folders by where they were taken.
#[derive(Parser, Debug)]
#[command(name = "geosort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a folder of photos and move them into per-city folders
    Sort(cli::sort::SortArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match geosort_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `geosort config path`."
            );
            geosort_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("geosort v{}", geosort_core::VERSION);

    match cli.command {
        Commands::Sort(args) => cli::sort::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
