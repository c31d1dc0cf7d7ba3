//! Reverse geocoder trait and the factory that assembles the client stack.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{GeocodingConfig, PipelineConfig};
use crate::error::{ConfigError, PipelineError};
use crate::types::{Coordinates, Locality};

use super::cache::CachedGeocoder;
use super::here::HereGeocoder;
use super::retry::{RetryPolicy, RetryingGeocoder};

/// Trait that all reverse geocoders implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn ReverseGeocoder>` to share one client across workers).
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Geocoder name for logging (e.g., "here").
    fn name(&self) -> &str;

    /// Resolve the locality (city) at `coordinates`.
    ///
    /// Fails with `InvalidLocation` when the service has no usable place
    /// and with `Service` when the call itself fails.
    async fn locate(&self, coordinates: &Coordinates) -> Result<Locality, PipelineError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Name of the variable a `${VAR}` reference points at, for error messages.
fn referenced_var(value: &str) -> String {
    value
        .strip_prefix("${")
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or("HERE_API_KEY")
        .to_string()
}

/// Factory that builds the geocoder stack from config.
pub struct GeocoderFactory;

impl GeocoderFactory {
    /// Create the HERE client wrapped in retries and, if enabled, the
    /// per-coordinate cache.
    ///
    /// The API key is resolved here, once. A missing key is a startup error.
    pub fn create(
        geocoding: &GeocodingConfig,
        pipeline: &PipelineConfig,
    ) -> Result<Arc<dyn ReverseGeocoder>, ConfigError> {
        let api_key =
            resolve_env_var(&geocoding.api_key).ok_or_else(|| ConfigError::MissingApiKey {
                var: referenced_var(&geocoding.api_key),
            })?;

        let here = HereGeocoder::new(geocoding, &api_key);
        let retrying = RetryingGeocoder::new(
            here,
            RetryPolicy {
                attempts: pipeline.retry_attempts,
                base_delay_ms: pipeline.retry_delay_ms,
            },
        );

        if pipeline.cache_results {
            Ok(Arc::new(CachedGeocoder::new(retrying)))
        } else {
            Ok(Arc::new(retrying))
        }
    }
}
