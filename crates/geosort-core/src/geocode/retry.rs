//! Retry utilities for transient geocoding failures.
//!
//! Provides classification of retryable errors, exponential backoff, and a
//! geocoder wrapper that applies both.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::PipelineError;
use crate::types::{Coordinates, Locality};

use super::provider::ReverseGeocoder;

/// Determine whether a pipeline error is worth retrying.
///
/// Retryable errors: rate limits (429), server errors (5xx), and transport
/// failures without a status. Non-retryable: auth failures, bad requests,
/// and any answer that simply had no locality.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Service { status_code, .. } => match status_code {
            Some(code) => *code == 429 || (500..=599).contains(code),
            None => true,
        },
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// How many times, and how patiently, to retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

/// Wraps a geocoder and retries transient service failures.
pub struct RetryingGeocoder<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: ReverseGeocoder> RetryingGeocoder<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<G: ReverseGeocoder> ReverseGeocoder for RetryingGeocoder<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn locate(&self, coordinates: &Coordinates) -> Result<Locality, PipelineError> {
        let mut attempt = 0;
        loop {
            match self.inner.locate(coordinates).await {
                Ok(locality) => return Ok(locality),
                Err(e) if attempt < self.policy.attempts && is_retryable(&e) => {
                    let delay = backoff_duration(attempt, self.policy.base_delay_ms);
                    attempt += 1;
                    tracing::debug!(
                        "Retry {attempt}/{} for {coordinates} after {delay:?}: {e}",
                        self.policy.attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
