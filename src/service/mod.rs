//! Health data query facade
//!
//! [`HealthDataService`] is the per-metric dispatch layer consumed by
//! application code. It holds one [`AggregationCache`] per tracked metric
//! (all sharing one provider), routes range queries to the matching cache,
//! serves "today" reads live from the provider, and applies the optional
//! bias-correction delta in exactly one place, just before returning, so
//! the cached and live paths never disagree at day boundaries.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::cache::{
    AggregationCache, CacheError, CacheStats, DateInterval, EnergyInfo, EnergyMetric, Granularity,
};
use crate::provider::{BiologicalSex, BiometricProvider, EnergyProvider, ProviderError};

/// Errors surfaced to facade callers
#[derive(Error, Debug)]
pub enum QueryError {
    /// The metric is not tracked by this service instance
    #[error("Metric not tracked: {0}")]
    UnknownMetric(EnergyMetric),

    /// Cache layer error (failed gap fetch, unsupported granularity)
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Provider error on a cache-bypassing live read
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type for facade operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Constant per-day offset compensating a known systematic bias in one
/// metric of the source data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyCorrection {
    /// The metric whose values are adjusted
    pub metric: EnergyMetric,
    /// Kilocalories added to every returned day of that metric
    pub delta_kcal_per_day: f64,
}

/// Per-metric query facade over the aggregation caches
pub struct HealthDataService<P> {
    provider: Arc<P>,
    caches: HashMap<EnergyMetric, AggregationCache<P>>,
    correction: Option<EnergyCorrection>,
}

impl<P: EnergyProvider> HealthDataService<P> {
    /// Create a service tracking the given metrics, one empty cache each
    pub fn new(provider: Arc<P>, tracked: &[EnergyMetric]) -> Self {
        let caches = tracked
            .iter()
            .map(|&metric| (metric, AggregationCache::new(metric, Arc::clone(&provider))))
            .collect();

        Self {
            provider,
            caches,
            correction: None,
        }
    }

    /// Builder: apply a bias-correction delta to one metric
    pub fn with_correction(mut self, correction: EnergyCorrection) -> Self {
        self.correction = Some(correction);
        self
    }

    /// Metrics this service answers queries for
    pub fn tracked_metrics(&self) -> Vec<EnergyMetric> {
        let mut metrics: Vec<EnergyMetric> = self.caches.keys().copied().collect();
        metrics.sort_by_key(|metric| metric.to_string());
        metrics
    }

    fn cache(&self, metric: EnergyMetric) -> QueryResult<&AggregationCache<P>> {
        self.caches
            .get(&metric)
            .ok_or(QueryError::UnknownMetric(metric))
    }

    /// Per-day correction applicable to `metric` (zero when none configured)
    fn delta_for(&self, metric: EnergyMetric) -> f64 {
        match self.correction {
            Some(correction) if correction.metric == metric => correction.delta_kcal_per_day,
            _ => 0.0,
        }
    }

    /// Energy sums for a date interval at the requested granularity
    ///
    /// The core entry point: ensures coverage (fetching at most two missing
    /// sub-ranges), then serves the range-restricted slice. Untracked
    /// metrics are a caller error, never a silently empty result.
    pub async fn energy_sums(
        &self,
        metric: EnergyMetric,
        interval: DateInterval,
        granularity: Granularity,
    ) -> QueryResult<Vec<EnergyInfo>> {
        let mut rows = self.cache(metric)?.get_data(interval, granularity).await?;

        let delta = self.delta_for(metric);
        if delta != 0.0 {
            for row in &mut rows {
                match row {
                    EnergyInfo::Daily(sample) => sample.kcal += delta,
                    // Keep monthly totals equal to the sum of corrected
                    // dailies: one delta per sampled day.
                    EnergyInfo::Monthly(sample) => {
                        sample.total_kcal += delta * f64::from(sample.sampled_days);
                    }
                }
            }
        }

        Ok(rows)
    }

    /// Today's summed contribution for one metric, read live
    ///
    /// Today is a moving, incomplete window unsuitable for permanent
    /// caching, so this bypasses the cache entirely.
    pub async fn energy_today(&self, metric: EnergyMetric) -> QueryResult<f64> {
        // Still a dispatch error for untracked metrics, even though no
        // cache is consulted.
        self.cache(metric)?;

        let today = chrono::Local::now().date_naive();
        let samples = self
            .provider
            .fetch_daily_sums(metric, DateInterval::single_day(today))
            .await?;

        let total: f64 = samples.iter().map(|sample| sample.kcal).sum();
        Ok(total + self.delta_for(metric))
    }

    /// Today's total across all tracked metrics (e.g. active + basal)
    pub async fn energy_today_total(&self) -> QueryResult<f64> {
        let mut total = 0.0;
        for metric in self.tracked_metrics() {
            total += self.energy_today(metric).await?;
        }
        Ok(total)
    }

    /// Snapshot of one metric's cache contents
    pub async fn cache_stats(&self, metric: EnergyMetric) -> QueryResult<CacheStats> {
        Ok(self.cache(metric)?.stats().await)
    }
}

impl<P: BiometricProvider> HealthDataService<P> {
    /// Ask the platform for read access; returns whether it was granted
    pub async fn request_authorization(&self) -> QueryResult<bool> {
        let authorized = self.provider.request_authorization().await?;
        tracing::info!(authorized, "Data source authorization requested");
        Ok(authorized)
    }

    /// Most recent body weight in kilograms, if recorded
    pub async fn latest_weight_kg(&self) -> QueryResult<Option<f64>> {
        Ok(self.provider.latest_weight_kg().await?)
    }

    /// Most recent height in centimeters, if recorded
    pub async fn latest_height_cm(&self) -> QueryResult<Option<f64>> {
        Ok(self.provider.latest_height_cm().await?)
    }

    /// Biological sex on record, if any
    pub async fn biological_sex(&self) -> QueryResult<Option<BiologicalSex>> {
        Ok(self.provider.biological_sex().await?)
    }

    /// Age in full years, if a date of birth is on record
    pub async fn age_years(&self) -> QueryResult<Option<u32>> {
        Ok(self.provider.age_years().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DailySample;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Fake platform source: every requested day is worth `per_day_kcal`
    struct FakeSource {
        per_day_kcal: f64,
        energy_calls: Mutex<Vec<(EnergyMetric, DateInterval)>>,
        weight_kg: Option<f64>,
    }

    impl FakeSource {
        fn new(per_day_kcal: f64) -> Self {
            Self {
                per_day_kcal,
                energy_calls: Mutex::new(Vec::new()),
                weight_kg: Some(72.5),
            }
        }

        fn energy_calls(&self) -> Vec<(EnergyMetric, DateInterval)> {
            self.energy_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EnergyProvider for FakeSource {
        async fn fetch_daily_sums(
            &self,
            metric: EnergyMetric,
            interval: DateInterval,
        ) -> Result<Vec<DailySample>, ProviderError> {
            self.energy_calls.lock().unwrap().push((metric, interval));
            Ok(interval
                .days()
                .map(|day| DailySample::new(day, self.per_day_kcal))
                .collect())
        }
    }

    #[async_trait]
    impl BiometricProvider for FakeSource {
        async fn request_authorization(&self) -> Result<bool, ProviderError> {
            Ok(true)
        }

        async fn latest_weight_kg(&self) -> Result<Option<f64>, ProviderError> {
            Ok(self.weight_kg)
        }

        async fn latest_height_cm(&self) -> Result<Option<f64>, ProviderError> {
            Ok(Some(181.0))
        }

        async fn biological_sex(&self) -> Result<Option<BiologicalSex>, ProviderError> {
            Ok(Some(BiologicalSex::Female))
        }

        async fn age_years(&self) -> Result<Option<u32>, ProviderError> {
            Ok(Some(34))
        }
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn both_metrics(provider: &Arc<FakeSource>) -> HealthDataService<FakeSource> {
        HealthDataService::new(
            Arc::clone(provider),
            &[EnergyMetric::ActiveEnergy, EnergyMetric::BasalEnergy],
        )
    }

    #[tokio::test]
    async fn test_untracked_metric_is_a_caller_error() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service =
            HealthDataService::new(Arc::clone(&provider), &[EnergyMetric::ActiveEnergy]);

        let interval = DateInterval::new(jan(1), jan(4));
        let result = service
            .energy_sums(EnergyMetric::BasalEnergy, interval, Granularity::Day)
            .await;
        assert!(matches!(result, Err(QueryError::UnknownMetric(_))));

        let result = service.energy_today(EnergyMetric::BasalEnergy).await;
        assert!(matches!(result, Err(QueryError::UnknownMetric(_))));

        // The provider was never consulted for the bad dispatch
        assert!(provider.energy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_caches_are_isolated_per_metric() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider);

        let interval = DateInterval::new(jan(1), jan(4));
        service
            .energy_sums(EnergyMetric::ActiveEnergy, interval, Granularity::Day)
            .await
            .unwrap();

        // Only the active-energy cache fetched anything
        assert_eq!(
            provider.energy_calls(),
            vec![(EnergyMetric::ActiveEnergy, interval)]
        );
        let basal = service
            .cache_stats(EnergyMetric::BasalEnergy)
            .await
            .unwrap();
        assert_eq!(basal.daily_samples, 0);
    }

    #[tokio::test]
    async fn test_correction_applies_to_cached_and_live_paths_alike() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider).with_correction(EnergyCorrection {
            metric: EnergyMetric::ActiveEnergy,
            delta_kcal_per_day: 50.0,
        });

        let interval = DateInterval::new(jan(1), jan(4));
        let rows = service
            .energy_sums(EnergyMetric::ActiveEnergy, interval, Granularity::Day)
            .await
            .unwrap();
        assert!(rows.iter().all(|row| row.kcal() == 150.0));

        // The live today path agrees with the cached per-day values
        let today = service
            .energy_today(EnergyMetric::ActiveEnergy)
            .await
            .unwrap();
        assert_eq!(today, 150.0);

        // Monthly totals equal the sum of the corrected dailies
        let monthly = service
            .energy_sums(EnergyMetric::ActiveEnergy, interval, Granularity::Month)
            .await
            .unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].kcal(), 3.0 * 150.0);
    }

    #[tokio::test]
    async fn test_correction_leaves_other_metric_untouched() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider).with_correction(EnergyCorrection {
            metric: EnergyMetric::ActiveEnergy,
            delta_kcal_per_day: 50.0,
        });

        let interval = DateInterval::new(jan(1), jan(4));
        let rows = service
            .energy_sums(EnergyMetric::BasalEnergy, interval, Granularity::Day)
            .await
            .unwrap();
        assert!(rows.iter().all(|row| row.kcal() == 100.0));

        let today = service
            .energy_today(EnergyMetric::BasalEnergy)
            .await
            .unwrap();
        assert_eq!(today, 100.0);
    }

    #[tokio::test]
    async fn test_energy_today_bypasses_the_cache() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider);

        service
            .energy_today(EnergyMetric::ActiveEnergy)
            .await
            .unwrap();
        service
            .energy_today(EnergyMetric::ActiveEnergy)
            .await
            .unwrap();

        // Two live reads, two provider calls, and no coverage was created
        assert_eq!(provider.energy_calls().len(), 2);
        let stats = service
            .cache_stats(EnergyMetric::ActiveEnergy)
            .await
            .unwrap();
        assert_eq!(stats.covered, None);
    }

    #[tokio::test]
    async fn test_today_total_composes_tracked_metrics() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider).with_correction(EnergyCorrection {
            metric: EnergyMetric::ActiveEnergy,
            delta_kcal_per_day: 50.0,
        });

        let total = service.energy_today_total().await.unwrap();
        assert_eq!(total, 150.0 + 100.0);
    }

    #[tokio::test]
    async fn test_biometric_pass_throughs() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider);

        assert!(service.request_authorization().await.unwrap());
        assert_eq!(service.latest_weight_kg().await.unwrap(), Some(72.5));
        assert_eq!(service.latest_height_cm().await.unwrap(), Some(181.0));
        assert_eq!(
            service.biological_sex().await.unwrap(),
            Some(BiologicalSex::Female)
        );
        assert_eq!(service.age_years().await.unwrap(), Some(34));
    }

    #[tokio::test]
    async fn test_tracked_metrics_sorted_by_name() {
        let provider = Arc::new(FakeSource::new(100.0));
        let service = both_metrics(&provider);
        assert_eq!(
            service.tracked_metrics(),
            vec![EnergyMetric::ActiveEnergy, EnergyMetric::BasalEnergy]
        );
    }
}
