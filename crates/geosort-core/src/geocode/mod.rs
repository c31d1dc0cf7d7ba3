//! Reverse geocoding: coordinates in, locality out.
//!
//! The HERE client does the actual lookup. Retries and the per-coordinate
//! cache are layered on top as wrappers implementing the same trait.

pub mod cache;
pub mod here;
pub mod provider;
pub mod retry;

pub use cache::CachedGeocoder;
pub use here::HereGeocoder;
pub use provider::{GeocoderFactory, ReverseGeocoder};
pub use retry::{RetryPolicy, RetryingGeocoder};
