//! Error types for the geosort pipeline.
//!
//! Errors are split by scope: [`ConfigError`] and discovery failures abort a
//! run at startup, [`PipelineError`] covers a single image's journey through
//! extraction and geocoding. Only the per-image kinds are recoverable; see
//! [`PipelineError::problem_reason`].

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ProblemReason;

/// Top-level error type for geosort operations.
#[derive(Error, Debug)]
pub enum GeosortError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors that could not be isolated to one image
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The source directory could not be listed
    #[error("Cannot list directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or folder could not be moved or created while reorganizing
    #[error("Cannot organize {path}: {source}")]
    Organize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The geocoding API key could not be resolved
    #[error("Geocoding API key not set. Set the {var} environment variable.")]
    MissingApiKey { var: String },
}

/// Errors raised while resolving one image's location.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// No coordinate source could produce a location for this file
    #[error("Unsupported format for {path}: {message}")]
    UnsupportedFormat { path: PathBuf, message: String },

    /// The geocoding service answered but had no usable place
    #[error("No locality for {coordinates}: {message}")]
    InvalidLocation { coordinates: String, message: String },

    /// The geocoding call failed at the transport or service level
    #[error("Geocoding service error: {message}")]
    Service {
        message: String,
        status_code: Option<u16>,
    },

    /// The file could not be opened or read
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A worker task failed to complete
    #[error("Task failed: {message}")]
    Task { message: String },
}

impl PipelineError {
    /// The quarantine bucket for this error, or `None` when the error must
    /// abort the run instead of being isolated to one image.
    pub fn problem_reason(&self) -> Option<ProblemReason> {
        match self {
            PipelineError::UnsupportedFormat { .. } => Some(ProblemReason::UnsupportedFormat),
            PipelineError::InvalidLocation { .. } | PipelineError::Service { .. } => {
                Some(ProblemReason::LocationUnresolvable)
            }
            PipelineError::Io { .. } | PipelineError::Task { .. } => None,
        }
    }
}

/// Convenience type alias for geosort results.
pub type Result<T> = std::result::Result<T, GeosortError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_image_errors_map_to_reasons() {
        let unsupported = PipelineError::UnsupportedFormat {
            path: PathBuf::from("a.txt"),
            message: "not an image".to_string(),
        };
        assert_eq!(
            unsupported.problem_reason(),
            Some(ProblemReason::UnsupportedFormat)
        );

        let invalid = PipelineError::InvalidLocation {
            coordinates: "0.5,0.5".to_string(),
            message: "empty items".to_string(),
        };
        assert_eq!(
            invalid.problem_reason(),
            Some(ProblemReason::LocationUnresolvable)
        );

        let service = PipelineError::Service {
            message: "HTTP 503".to_string(),
            status_code: Some(503),
        };
        assert_eq!(
            service.problem_reason(),
            Some(ProblemReason::LocationUnresolvable)
        );
    }

    #[test]
    fn test_fatal_errors_have_no_reason() {
        let io = PipelineError::Io {
            path: PathBuf::from("gone.jpg"),
            message: "permission denied".to_string(),
        };
        assert!(io.problem_reason().is_none());

        let task = PipelineError::Task {
            message: "panicked".to_string(),
        };
        assert!(task.problem_reason().is_none());
    }

    #[test]
    fn test_missing_api_key_names_variable() {
        let err = ConfigError::MissingApiKey {
            var: "HERE_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("HERE_API_KEY"));
    }
}
