//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File-name suffixes to leave out (case-sensitive)
    pub exclude_suffixes: Vec<String>,

    /// If non-empty, only file names ending in one of these are listed
    pub include_suffixes: Vec<String>,

    /// Skip dot-files such as `.DS_Store`
    pub skip_hidden: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            exclude_suffixes: vec![
                ".MOV".to_string(),
                ".mov".to_string(),
                ".mp4".to_string(),
                ".MP4".to_string(),
            ],
            include_suffixes: Vec::new(),
            skip_hidden: true,
        }
    }
}

/// Coordinate extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OS metadata query used when a file carries no EXIF GPS block
    pub os_metadata: OsMetadataConfig,
}

/// How a literal `0.0` from the OS metadata query is interpreted.
///
/// The query reports missing coordinates inconsistently, so zero is
/// ambiguous between "on the equator/meridian" and "not recorded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroCoordinatePolicy {
    /// Either component equal to 0.0 counts as not found
    #[default]
    Absent,
    /// Only the exact origin (0.0, 0.0) counts as not found
    RejectOrigin,
    /// Zeros are accepted as real positions
    Trust,
}

/// OS-level metadata query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsMetadataConfig {
    /// Whether the fallback query runs at all
    pub enabled: bool,

    /// Program to invoke; the image path is appended as the last argument
    pub program: String,

    /// Arguments placed before the image path
    pub args: Vec<String>,

    /// Kill the query after this many milliseconds
    pub timeout_ms: u64,

    /// Interpretation of zero-valued coordinates
    pub zero_policy: ZeroCoordinatePolicy,
}

impl Default for OsMetadataConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(target_os = "macos"),
            program: "mdls".to_string(),
            args: vec![
                "-name".to_string(),
                "kMDItemLatitude".to_string(),
                "-name".to_string(),
                "kMDItemLongitude".to_string(),
            ],
            timeout_ms: 5000,
            zero_policy: ZeroCoordinatePolicy::default(),
        }
    }
}

/// Reverse geocoding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Reverse geocoding endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Response language
    pub language: String,

    /// Number of results requested per query
    pub result_limit: u32,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://revgeocode.search.hereapi.com/v1/revgeocode".to_string(),
            api_key: "${HERE_API_KEY}".to_string(),
            language: "en-US".to_string(),
            result_limit: 1,
            timeout_ms: 10_000,
        }
    }
}

/// Pipeline settings for concurrency and retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max images in flight at once (1 = strictly sequential)
    pub parallel_workers: usize,

    /// Max retry attempts for transient geocoding failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// Share geocoding results between images with identical coordinates
    pub cache_results: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 1,
            retry_attempts: 2,
            retry_delay_ms: 500,
            cache_results: true,
        }
    }
}

/// Reorganization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Where locality folders are created; defaults to the source directory
    pub destination: Option<PathBuf>,

    /// Folder name for quarantined images
    pub problematic_dir: String,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            destination: None,
            problematic_dir: "problematic_images".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
