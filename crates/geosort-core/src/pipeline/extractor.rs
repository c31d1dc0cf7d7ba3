//! Coordinate extraction as an ordered chain of sources.

use async_trait::async_trait;
use std::path::Path;

use crate::config::ExtractionConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Coordinates, ImageResource};

use super::exif::ExifSource;
use super::os_metadata::OsMetadataSource;

/// What a single coordinate source learned about a file.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// Coordinates were found
    Found(Coordinates),
    /// Nothing usable here; the next source may try
    Missing(String),
    /// The file cannot carry coordinates at all; stop the chain
    Unsupported(String),
}

/// A way of getting coordinates for an image path.
///
/// `Err` is reserved for faults that must abort the run (I/O, task
/// failures). Expected outcomes such as "no GPS data" are `Ok` variants.
#[async_trait]
pub trait CoordinateSource: Send + Sync {
    /// Source name for logging (e.g., "exif", "os-metadata").
    fn name(&self) -> &str;

    /// Look for coordinates in the file at `path`.
    async fn probe(&self, path: &Path) -> PipelineResult<SourceOutcome>;
}

/// Tries each configured source in order; the first hit wins.
pub struct CoordinateExtractor {
    sources: Vec<Box<dyn CoordinateSource>>,
}

impl CoordinateExtractor {
    /// Create an extractor over an explicit list of sources.
    pub fn new(sources: Vec<Box<dyn CoordinateSource>>) -> Self {
        Self { sources }
    }

    /// Build the standard chain: EXIF first, then the OS metadata query
    /// when enabled.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut sources: Vec<Box<dyn CoordinateSource>> = vec![Box::new(ExifSource)];
        if config.os_metadata.enabled {
            sources.push(Box::new(OsMetadataSource::new(config.os_metadata.clone())));
        }
        Self::new(sources)
    }

    /// Names of the sources in the order they are tried.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve coordinates for one image.
    ///
    /// Fails with `UnsupportedFormat` when no source produces in-range
    /// coordinates. Other errors come from the sources themselves and are
    /// not per-image failures.
    pub async fn extract(&self, image: &ImageResource) -> PipelineResult<Coordinates> {
        let mut misses = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.probe(&image.path).await? {
                SourceOutcome::Found(coordinates) if coordinates.is_in_range() => {
                    tracing::debug!(
                        "{}: {} from {}",
                        image.name,
                        coordinates,
                        source.name()
                    );
                    return Ok(coordinates);
                }
                SourceOutcome::Found(coordinates) => {
                    tracing::warn!(
                        "{}: {} reported out-of-range coordinates {}",
                        image.name,
                        source.name(),
                        coordinates
                    );
                    misses.push(format!(
                        "{}: out-of-range coordinates {}",
                        source.name(),
                        coordinates
                    ));
                }
                SourceOutcome::Missing(reason) => {
                    tracing::trace!("{}: {} found nothing ({reason})", image.name, source.name());
                    misses.push(format!("{}: {reason}", source.name()));
                }
                SourceOutcome::Unsupported(reason) => {
                    return Err(PipelineError::UnsupportedFormat {
                        path: image.path.clone(),
                        message: format!("{}: {reason}", source.name()),
                    });
                }
            }
        }

        let message = if misses.is_empty() {
            "no coordinate sources configured".to_string()
        } else {
            misses.join("; ")
        };
        Err(PipelineError::UnsupportedFormat {
            path: image.path.clone(),
            message,
        })
    }
}
