//! Cache error types
//!
//! Defines all errors that can occur in the aggregation cache layer.

use thiserror::Error;

use crate::cache::types::{DateInterval, Granularity};
use crate::provider::ProviderError;

/// Errors that can occur in the aggregation cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// A provider fetch for a specific sub-range failed
    ///
    /// Gaps merged before this one remain committed; a retried call only
    /// needs to fetch the still-missing range.
    #[error("Fetch failed for {range}: {source}")]
    FetchFailed {
        range: DateInterval,
        #[source]
        source: ProviderError,
    },

    /// The requested aggregation level is not served by this cache
    #[error("Unsupported granularity: {0}")]
    UnsupportedGranularity(Granularity),
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_display() {
        let range = DateInterval::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        );
        let err = CacheError::FetchFailed {
            range,
            source: ProviderError::Unavailable("source offline".into()),
        };
        assert_eq!(
            err.to_string(),
            "Fetch failed for [2024-01-01, 2024-01-04): Provider unavailable: source offline"
        );

        let err = CacheError::UnsupportedGranularity(Granularity::Week);
        assert_eq!(err.to_string(), "Unsupported granularity: week");
    }
}
