//! Aggregation cache engine
//!
//! One [`AggregationCache`] per tracked metric orchestrates fetch-merge-serve:
//!
//! - Read path: covered query → range-restrict daily/monthly store → results
//! - Write path: gap plan → provider fetch per gap → densify → merge →
//!   rebuild monthly roll-ups → extend coverage
//!
//! Thread-safe via Tokio's async RwLock: covered queries proceed
//! concurrently under the read lock, while the write lock serializes every
//! mutation and is held across the provider await, so a half-merged store
//! is never observable. Each gap's merge commits immediately after that
//! gap's fetch succeeds; a later gap's failure never loses merged data, and
//! a caller abandoning an in-flight fetch leaves the store untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::cache::coverage::Coverage;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::types::{
    month_start_of, DailySample, DateInterval, EnergyInfo, EnergyMetric, Granularity,
    MonthlySample,
};
use crate::provider::EnergyProvider;

/// Snapshot of a cache's current contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Contiguous range the daily store is complete for
    pub covered: Option<DateInterval>,
    /// Number of daily samples held
    pub daily_samples: usize,
    /// Number of derived monthly buckets
    pub monthly_buckets: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.covered {
            Some(range) => write!(
                f,
                "{} daily samples, {} monthly buckets, covering {}",
                self.daily_samples, self.monthly_buckets, range
            ),
            None => write!(f, "empty cache"),
        }
    }
}

/// Mutable cache contents, guarded by the engine's RwLock
#[derive(Debug, Default)]
struct CacheState {
    /// Range the daily store is known complete for
    coverage: Coverage,
    /// Strictly ascending by day, no duplicates, no holes inside coverage
    daily: Vec<DailySample>,
    /// Derived from `daily` after every merge, ascending by month start
    monthly: Vec<MonthlySample>,
}

impl CacheState {
    /// Merge a completed gap fetch into the store and commit coverage
    fn merge_fetched(&mut self, range: DateInterval, samples: Vec<DailySample>) {
        let mut fetched = densify(range, samples);

        // Non-overlapping gaps should never resend a cached day, but if one
        // arrives the newer samples win.
        self.daily.retain(|sample| !range.contains(sample.day));

        if self.daily.is_empty() || range.end <= self.daily[0].day {
            fetched.append(&mut self.daily);
            self.daily = fetched;
        } else if self.daily[self.daily.len() - 1].day < range.start {
            self.daily.append(&mut fetched);
        } else {
            self.daily.append(&mut fetched);
            self.daily.sort_by_key(|sample| sample.day);
        }

        self.coverage.extend(range);
        self.rebuild_monthly();
    }

    /// Recompute the monthly roll-ups from scratch
    ///
    /// O(n) in daily sample count; runs only after a cache-extending fetch,
    /// never on reads. The daily store is sorted, so consecutive grouping
    /// yields an ascending monthly sequence.
    fn rebuild_monthly(&mut self) {
        self.monthly.clear();
        for sample in &self.daily {
            let month_start = month_start_of(sample.day);
            match self.monthly.last_mut() {
                Some(bucket) if bucket.month_start == month_start => {
                    bucket.total_kcal += sample.kcal;
                    bucket.sampled_days += 1;
                }
                _ => self.monthly.push(MonthlySample {
                    month_start,
                    total_kcal: sample.kcal,
                    sampled_days: 1,
                }),
            }
        }
    }

    /// Range-restrict the sequence matching `granularity` to `[start, end)`
    fn slice(&self, interval: DateInterval, granularity: Granularity) -> CacheResult<Vec<EnergyInfo>> {
        match granularity {
            Granularity::Day => {
                let lo = self.daily.partition_point(|s| s.day < interval.start);
                let hi = self.daily.partition_point(|s| s.day < interval.end);
                Ok(self.daily[lo..hi]
                    .iter()
                    .copied()
                    .map(EnergyInfo::Daily)
                    .collect())
            }
            Granularity::Month => {
                let lo = self
                    .monthly
                    .partition_point(|s| s.month_start < interval.start);
                let hi = self.monthly.partition_point(|s| s.month_start < interval.end);
                Ok(self.monthly[lo..hi]
                    .iter()
                    .copied()
                    .map(EnergyInfo::Monthly)
                    .collect())
            }
            // Weekly roll-ups were never implemented; reject loudly rather
            // than answer with a silent empty sequence.
            Granularity::Week => Err(CacheError::UnsupportedGranularity(Granularity::Week)),
        }
    }
}

/// Normalize a provider response to exactly one sample per day of the
/// fetched range: omitted days become explicit zeros, duplicate days keep
/// the newest value, days outside the range are dropped.
fn densify(range: DateInterval, samples: Vec<DailySample>) -> Vec<DailySample> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sample in samples {
        if range.contains(sample.day) {
            by_day.insert(sample.day, sample.kcal);
        }
    }

    range
        .days()
        .map(|day| DailySample::new(day, by_day.get(&day).copied().unwrap_or(0.0)))
        .collect()
}

/// Interval-aware aggregation cache for one energy metric
///
/// Owns the coverage range, the gapless daily store and the derived monthly
/// store, and fetches only the sub-ranges a query is missing.
pub struct AggregationCache<P> {
    metric: EnergyMetric,
    provider: Arc<P>,
    state: RwLock<CacheState>,
}

impl<P: EnergyProvider> AggregationCache<P> {
    /// Create an empty cache (no coverage) for `metric`
    pub fn new(metric: EnergyMetric, provider: Arc<P>) -> Self {
        Self {
            metric,
            provider,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// The metric this cache serves
    pub fn metric(&self) -> EnergyMetric {
        self.metric
    }

    /// Serve a range query at the requested granularity, fetching any
    /// missing sub-ranges from the provider first
    ///
    /// Queries fully inside existing coverage never call the provider.
    pub async fn get_data(
        &self,
        interval: DateInterval,
        granularity: Granularity,
    ) -> CacheResult<Vec<EnergyInfo>> {
        if granularity == Granularity::Week {
            return Err(CacheError::UnsupportedGranularity(Granularity::Week));
        }

        // Fast path: fully covered, no provider calls and no exclusive lock.
        {
            let state = self.state.read().await;
            if state.coverage.covers(interval) {
                return state.slice(interval, granularity);
            }
        }

        let mut state = self.state.write().await;

        // Recompute under the write lock: a concurrent call may have filled
        // these gaps while we waited, making this a covered no-op.
        let plan = state.coverage.gaps(interval);
        if let Some(gap) = plan.left {
            self.fill_gap(&mut state, gap).await?;
        }
        if let Some(gap) = plan.right {
            self.fill_gap(&mut state, gap).await?;
        }

        state.slice(interval, granularity)
    }

    /// Fetch one gap and commit its merge immediately
    async fn fill_gap(&self, state: &mut CacheState, gap: DateInterval) -> CacheResult<()> {
        let samples = self
            .provider
            .fetch_daily_sums(self.metric, gap)
            .await
            .map_err(|source| CacheError::FetchFailed { range: gap, source })?;

        state.merge_fetched(gap, samples);
        tracing::debug!(
            metric = %self.metric,
            range = %gap,
            daily_samples = state.daily.len(),
            "Gap fetched and merged"
        );

        Ok(())
    }

    /// The contiguous range currently covered, if any
    pub async fn coverage(&self) -> Option<DateInterval> {
        self.state.read().await.coverage.range()
    }

    /// Snapshot of the cache contents
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        CacheStats {
            covered: state.coverage.range(),
            daily_samples: state.daily.len(),
            monthly_buckets: state.monthly.len(),
        }
    }
}
