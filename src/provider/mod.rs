//! External provider capabilities
//!
//! The biometric data source (platform authorization, sample retrieval,
//! day/timezone normalization) lives entirely behind these traits. This
//! crate consumes them; it never implements them:
//!
//! - [`EnergyProvider`]: raw per-day energy sums for a date interval
//! - [`BiometricProvider`]: authorization handshake and scalar facts
//!
//! Providers are assumed stateless and safely callable concurrently for
//! disjoint metrics; per-metric serialization is the cache's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::types::{DailySample, DateInterval, EnergyMetric};

/// Errors reported by a provider implementation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The external source is not reachable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The caller has not been granted read access to the data source
    #[error("Not authorized to read from the data source")]
    NotAuthorized,

    /// A request to the source failed
    #[error("Provider request failed: {0}")]
    Request(String),
}

/// Biological sex as recorded by the data source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Female,
    Male,
    Other,
}

/// Capability to fetch raw daily energy sums for a date range
#[async_trait]
pub trait EnergyProvider: Send + Sync {
    /// Fetch per-day summed values for `interval`, aggregated at day
    /// granularity with a day-aligned anchor, ascending by day.
    ///
    /// Days without data may be omitted; the cache treats them as zero.
    async fn fetch_daily_sums(
        &self,
        metric: EnergyMetric,
        interval: DateInterval,
    ) -> Result<Vec<DailySample>, ProviderError>;
}

/// Authorization handshake and scalar biometric facts
///
/// These are pass-throughs with no caching or conversion logic on this
/// side; absent facts are `None`, not errors.
#[async_trait]
pub trait BiometricProvider: Send + Sync {
    /// Ask the platform for read access; returns whether it was granted
    async fn request_authorization(&self) -> Result<bool, ProviderError>;

    /// Most recent body weight in kilograms
    async fn latest_weight_kg(&self) -> Result<Option<f64>, ProviderError>;

    /// Most recent height in centimeters
    async fn latest_height_cm(&self) -> Result<Option<f64>, ProviderError>;

    /// Biological sex on record
    async fn biological_sex(&self) -> Result<Option<BiologicalSex>, ProviderError>;

    /// Age in full years
    async fn age_years(&self) -> Result<Option<u32>, ProviderError>;
}

/// The combined capability surface expected by the query facade
pub trait HealthProvider: EnergyProvider + BiometricProvider {}

impl<T: EnergyProvider + BiometricProvider> HealthProvider for T {}
