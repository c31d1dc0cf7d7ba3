//! Sort setup: config overrides and pipeline assembly.

use geosort_core::{Config, Geosort};

use super::SortArgs;

/// Validate input, apply CLI overrides to `config`, and build the pipeline.
pub fn setup_geosort(args: &SortArgs, mut config: Config) -> anyhow::Result<Geosort> {
    if !args.input.is_dir() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Pass the folder that holds your photos.",
            args.input
        );
    }

    apply_overrides(&mut config, args);
    config.validate()?;

    if !config.extraction.os_metadata.enabled {
        tracing::debug!("OS metadata fallback disabled; using EXIF only");
    }

    Ok(Geosort::new(config)?)
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &SortArgs) {
    if let Some(parallel) = args.parallel {
        config.pipeline.parallel_workers = parallel;
    }
    if args.no_os_metadata {
        config.extraction.os_metadata.enabled = false;
    }
    if let Some(destination) = &args.destination {
        config.organize.destination = Some(destination.clone());
    }
    if let Some(key) = &args.api_key {
        config.geocoding.api_key = key.clone();
    }
}
