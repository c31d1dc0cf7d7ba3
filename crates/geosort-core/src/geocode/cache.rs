//! Per-coordinate memoization of geocoding results.
//!
//! Photos taken in one spot share coordinates, so a batch often asks the
//! same question many times. At most one request per coordinate pair is in
//! flight; concurrent callers for the same pair wait for that request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::error::PipelineError;
use crate::types::{Coordinates, Locality, COORDINATE_PRECISION};

use super::provider::ReverseGeocoder;

/// Coordinates as fixed-point integers at the rounding precision.
type CoordinateKey = (i64, i64);

fn key_for(coordinates: &Coordinates) -> CoordinateKey {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    (
        (coordinates.latitude * scale).round() as i64,
        (coordinates.longitude * scale).round() as i64,
    )
}

/// A settled answer: a locality, or a definitive "no locality here".
type Settled = Result<Locality, PipelineError>;

/// Wraps a geocoder and shares results between identical coordinates.
///
/// Successes and `InvalidLocation` answers are kept for the life of the
/// cache. Service errors are not, so a later image can try again.
pub struct CachedGeocoder<G> {
    inner: G,
    entries: Mutex<HashMap<CoordinateKey, Arc<OnceCell<Settled>>>>,
}

impl<G: ReverseGeocoder> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of coordinate pairs with a settled answer.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CoordinateKey, Arc<OnceCell<Settled>>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cell_for(&self, coordinates: &Coordinates) -> Arc<OnceCell<Settled>> {
        self.lock()
            .entry(key_for(coordinates))
            .or_default()
            .clone()
    }
}

#[async_trait]
impl<G: ReverseGeocoder> ReverseGeocoder for CachedGeocoder<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn locate(&self, coordinates: &Coordinates) -> Result<Locality, PipelineError> {
        let cell = self.cell_for(coordinates);
        let settled = cell
            .get_or_try_init(|| async {
                match self.inner.locate(coordinates).await {
                    Ok(locality) => Ok(Ok(locality)),
                    Err(e @ PipelineError::InvalidLocation { .. }) => Ok(Err(e)),
                    Err(e) => Err(e),
                }
            })
            .await?;
        settled.clone()
    }
}
