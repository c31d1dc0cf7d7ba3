//! The `geosort sort` command: classify a directory and reorganize it.

mod batch;
mod setup;
pub mod types;

pub use types::ReportFormat;

use clap::Args;
use geosort_core::Config;
use std::path::PathBuf;

use batch::sort_directory;
use setup::setup_geosort;

/// Arguments for the `sort` command.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Directory of photos to sort (top level only)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Where to create locality folders (defaults to the input directory)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Number of images classified concurrently (overrides config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Classify and print the planned moves without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Only read embedded EXIF data; skip the OS metadata query
    #[arg(long)]
    pub no_os_metadata: bool,

    /// Write a report of the run to this file
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,

    /// HERE API key (overrides the configured key)
    #[arg(long, env = "HERE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Execute the sort command with the configuration resolved at startup.
pub async fn execute(args: SortArgs, config: Config) -> anyhow::Result<()> {
    let geosort = setup_geosort(&args, config)?;

    let images = geosort.discover(&args.input)?;
    if images.is_empty() {
        tracing::warn!("No candidate images found in {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to sort", images.len());

    sort_directory(&geosort, &args, images).await
}
