//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.parallel_workers must be > 0".into(),
            ));
        }
        if self.geocoding.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "geocoding.endpoint must not be empty".into(),
            ));
        }
        if self.geocoding.result_limit == 0 {
            return Err(ConfigError::ValidationError(
                "geocoding.result_limit must be > 0".into(),
            ));
        }
        if self.geocoding.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "geocoding.timeout_ms must be > 0".into(),
            ));
        }
        let os = &self.extraction.os_metadata;
        if os.enabled && os.program.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "extraction.os_metadata.program must not be empty".into(),
            ));
        }
        if os.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.os_metadata.timeout_ms must be > 0".into(),
            ));
        }
        let problematic = self.organize.problematic_dir.as_str();
        if problematic.trim().is_empty()
            || problematic.contains(['/', '\\'])
            || problematic == "."
            || problematic == ".."
        {
            return Err(ConfigError::ValidationError(
                "organize.problematic_dir must be a single folder name".into(),
            ));
        }
        Ok(())
    }
}
