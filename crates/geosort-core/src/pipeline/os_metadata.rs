//! OS-level metadata query (Spotlight `mdls` on macOS) as a coordinate source.
//!
//! The query prints one `key = value` line per attribute:
//!
//! ```text
//! kMDItemLatitude  = 48.8566
//! kMDItemLongitude = 2.3522
//! ```
//!
//! Missing attributes print `(null)`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::{OsMetadataConfig, ZeroCoordinatePolicy};
use crate::error::PipelineResult;
use crate::types::Coordinates;

use super::extractor::{CoordinateSource, SourceOutcome};

/// Attribute holding the latitude in the query output.
pub const LATITUDE_KEY: &str = "kMDItemLatitude";

/// Attribute holding the longitude in the query output.
pub const LONGITUDE_KEY: &str = "kMDItemLongitude";

/// Runs an external metadata command and parses coordinates from its output.
///
/// Every failure of the command itself (not installed, non-zero exit,
/// timeout) is reported as `Missing`, never as an error.
pub struct OsMetadataSource {
    config: OsMetadataConfig,
}

impl OsMetadataSource {
    pub fn new(config: OsMetadataConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }
}

#[async_trait]
impl CoordinateSource for OsMetadataSource {
    fn name(&self) -> &str {
        "os-metadata"
    }

    async fn probe(&self, path: &Path) -> PipelineResult<SourceOutcome> {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.timeout(), command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!("Failed to run {}: {e}", self.config.program);
                return Ok(SourceOutcome::Missing(format!(
                    "failed to run {}: {e}",
                    self.config.program
                )));
            }
            Err(_) => {
                tracing::warn!(
                    "{} timed out after {}ms for {:?}",
                    self.config.program,
                    self.config.timeout_ms,
                    path
                );
                return Ok(SourceOutcome::Missing(format!(
                    "{} timed out after {}ms",
                    self.config.program, self.config.timeout_ms
                )));
            }
        };

        if !output.status.success() {
            return Ok(SourceOutcome::Missing(format!(
                "{} exited with {}",
                self.config.program, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(match parse_os_metadata(&stdout, self.config.zero_policy) {
            Some(coordinates) => SourceOutcome::Found(coordinates),
            None => SourceOutcome::Missing("no latitude/longitude in query output".to_string()),
        })
    }
}

/// Parse coordinates from `key = value` query output.
///
/// Returns `None` unless both keys carry a finite number that survives the
/// zero policy. Pure: the same text always gives the same answer.
pub fn parse_os_metadata(output: &str, policy: ZeroCoordinatePolicy) -> Option<Coordinates> {
    let mut latitude = None;
    let mut longitude = None;

    for line in output.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite());
        match key.trim() {
            LATITUDE_KEY => latitude = value,
            LONGITUDE_KEY => longitude = value,
            _ => {}
        }
    }

    let (latitude, longitude) = (latitude?, longitude?);
    let treated_as_missing = match policy {
        ZeroCoordinatePolicy::Absent => latitude == 0.0 || longitude == 0.0,
        ZeroCoordinatePolicy::RejectOrigin => latitude == 0.0 && longitude == 0.0,
        ZeroCoordinatePolicy::Trust => false,
    };
    if treated_as_missing {
        return None;
    }
    Some(Coordinates::new(latitude, longitude))
}
