//! Location-resolution pipeline components.
//!
//! - **discovery**: List candidate files in a source directory
//! - **extractor**: Ordered chain of coordinate sources
//! - **exif**: Embedded EXIF GPS source
//! - **os_metadata**: OS metadata query fallback source
//! - **classify**: Drives each image to a terminal state

pub mod classify;
pub mod discovery;
pub mod exif;
pub mod extractor;
pub mod os_metadata;

// Re-exports for convenient access
pub use classify::{classify_image, ClassificationPipeline};
pub use discovery::FileDiscovery;
pub use exif::ExifSource;
pub use extractor::{CoordinateExtractor, CoordinateSource, SourceOutcome};
pub use os_metadata::{parse_os_metadata, OsMetadataSource};
