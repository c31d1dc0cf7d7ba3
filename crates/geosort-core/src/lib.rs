//! Geosort Core - sorts photos into folders by where they were taken.
//!
//! Each image goes through a small pipeline that ends in exactly one of
//! three states: located in a city, quarantined as unsupported, or
//! quarantined as unresolvable.
//!
//! # Architecture
//!
//! ```text
//! List → Extract coordinates (EXIF, then OS metadata) → Reverse geocode → Partition → Move
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use geosort_core::{Config, Geosort};
//!
//! #[tokio::main]
//! async fn main() -> geosort_core::Result<()> {
//!     let geosort = Geosort::new(Config::load()?)?;
//!     let images = geosort.discover(Path::new("./photos"))?;
//!     let outcome = geosort.classify(images).await?;
//!     println!("{} located", outcome.located_count());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod geocode;
pub mod organize;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, GeosortError, PipelineError, PipelineResult, Result};
pub use geocode::{GeocoderFactory, ReverseGeocoder};
pub use organize::{OrganizeSummary, PlannedMove, Reorganizer};
pub use output::{OutputFormat, ReportWriter, RunReport};
pub use pipeline::{ClassificationPipeline, CoordinateExtractor, FileDiscovery};
pub use types::{BatchOutcome, Classification, Coordinates, ImageResource, Locality, ProblemReason};

use std::path::Path;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Geosort - the main entry point, assembled once from configuration.
pub struct Geosort {
    config: Config,
    discovery: FileDiscovery,
    pipeline: ClassificationPipeline,
}

impl Geosort {
    /// Build the extractor chain and geocoder stack from `config`.
    ///
    /// Fails when the geocoding API key cannot be resolved.
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = GeocoderFactory::create(&config.geocoding, &config.pipeline)?;
        Ok(Self::with_geocoder(config, geocoder))
    }

    /// Assemble with a caller-provided geocoder.
    pub fn with_geocoder(config: Config, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let extractor = CoordinateExtractor::from_config(&config.extraction);
        tracing::debug!(
            "Initializing geosort v{} (sources: {}, geocoder: {})",
            VERSION,
            extractor.source_names().join(" → "),
            geocoder.name()
        );

        Self {
            discovery: FileDiscovery::new(config.discovery.clone()),
            pipeline: ClassificationPipeline::new(
                Arc::new(extractor),
                geocoder,
                config.pipeline.parallel_workers,
            ),
            config,
        }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List the candidate images directly inside `dir`.
    pub fn discover(&self, dir: &Path) -> Result<Vec<ImageResource>> {
        self.discovery.discover(dir)
    }

    /// Classify every image.
    pub async fn classify(&self, images: Vec<ImageResource>) -> Result<BatchOutcome> {
        Ok(self.pipeline.run(images).await?)
    }

    /// Classify every image, reporting each result as it is recorded.
    pub async fn classify_with_progress<F>(
        &self,
        images: Vec<ImageResource>,
        on_result: F,
    ) -> Result<BatchOutcome>
    where
        F: FnMut(&Classification),
    {
        Ok(self.pipeline.run_with_progress(images, on_result).await?)
    }

    /// Reorganizer for images listed from `source`.
    pub fn reorganizer(&self, source: &Path) -> Reorganizer {
        Reorganizer::from_config(&self.config, source)
    }
}
