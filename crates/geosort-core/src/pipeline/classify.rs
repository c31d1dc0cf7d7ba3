//! Classification: drives each image from path to terminal state.

use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};

use crate::error::{PipelineError, PipelineResult};
use crate::geocode::ReverseGeocoder;
use crate::types::{BatchOutcome, Classification, ImageResource};

use super::extractor::CoordinateExtractor;

/// Resolves a batch of images into located groups and problematic files.
///
/// Per-image failures are quarantined; I/O and task failures abort the run.
pub struct ClassificationPipeline {
    extractor: Arc<CoordinateExtractor>,
    geocoder: Arc<dyn ReverseGeocoder>,
    parallel: usize,
}

impl ClassificationPipeline {
    /// Create a pipeline with at most `parallel` images in flight.
    pub fn new(
        extractor: Arc<CoordinateExtractor>,
        geocoder: Arc<dyn ReverseGeocoder>,
        parallel: usize,
    ) -> Self {
        Self {
            extractor,
            geocoder,
            parallel: parallel.max(1),
        }
    }

    /// Classify every image and partition the results.
    pub async fn run(&self, images: Vec<ImageResource>) -> PipelineResult<BatchOutcome> {
        self.run_with_progress(images, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_result` for each classification
    /// in input order as it is recorded.
    pub async fn run_with_progress<F>(
        &self,
        images: Vec<ImageResource>,
        mut on_result: F,
    ) -> PipelineResult<BatchOutcome>
    where
        F: FnMut(&Classification),
    {
        let total = images.len();
        tracing::info!(
            "Classifying {total} images ({} in flight)",
            self.parallel
        );

        // Tasks run concurrently; `buffered` yields them in submission order.
        // Returning early drops the stream, which aborts whatever is in flight.
        let mut results = stream::iter(images)
            .map(|image| {
                let extractor = self.extractor.clone();
                let geocoder = self.geocoder.clone();
                TaskGuard(tokio::spawn(async move {
                    classify_image(&extractor, &*geocoder, image).await
                }))
            })
            .buffered(self.parallel);

        let mut outcome = BatchOutcome::new();
        while let Some(joined) = results.next().await {
            let classification = joined.map_err(|e| PipelineError::Task {
                message: e.to_string(),
            })??;
            on_result(&classification);
            outcome.record(classification);
        }

        tracing::info!(
            "Classified {total} images: {} located in {} places, {} problematic",
            outcome.located_count(),
            outcome.located().len(),
            outcome.problematic_count()
        );
        Ok(outcome)
    }
}

/// A spawned task that is aborted when its handle is dropped.
struct TaskGuard<T>(JoinHandle<T>);

impl<T> Future for TaskGuard<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for TaskGuard<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Take one image through extraction and geocoding.
///
/// Returns `Err` only for failures that must abort the whole run.
pub async fn classify_image(
    extractor: &CoordinateExtractor,
    geocoder: &dyn ReverseGeocoder,
    image: ImageResource,
) -> PipelineResult<Classification> {
    let coordinates = match extractor.extract(&image).await {
        Ok(coordinates) => coordinates,
        Err(e) => return quarantine(image, e),
    };

    match geocoder.locate(&coordinates).await {
        Ok(locality) => {
            tracing::debug!("{}: located in {locality}", image.name);
            Ok(Classification::Located {
                image,
                coordinates,
                locality,
            })
        }
        Err(e) => quarantine(image, e),
    }
}

fn quarantine(image: ImageResource, error: PipelineError) -> PipelineResult<Classification> {
    match error.problem_reason() {
        Some(reason) => {
            tracing::debug!("{}: {reason} ({error})", image.name);
            Ok(Classification::Problematic {
                image,
                reason,
                detail: error.to_string(),
            })
        }
        None => Err(error),
    }
}
