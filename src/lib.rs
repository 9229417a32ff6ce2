//! # Burnrate
//!
//! Interval-aware data-access layer for daily energy expenditure metrics,
//! backed by an external biometric data source.
//!
//! ## Features
//!
//! - **Incremental fetching**: range queries only fetch the sub-ranges the
//!   cache is missing, at most two provider calls per query
//! - **Monotonic coverage**: the cached range only ever grows, and repeat
//!   queries over covered territory are free
//! - **Derived roll-ups**: monthly aggregates are rebuilt from the daily
//!   store after every merge, never mutated independently
//! - **Safe concurrency**: per-metric mutation is serialized; abandoned
//!   in-flight fetches leave the cache untouched
//!
//! ## Modules
//!
//! - [`cache`]: The interval-aware aggregation cache
//! - [`provider`]: Capability traits the external data source implements
//! - [`service`]: Per-metric query facade consumed by application code
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use burnrate::{
//!     DailySample, DateInterval, EnergyMetric, EnergyProvider, Granularity,
//!     HealthDataService, ProviderError,
//! };
//!
//! struct PlatformSource;
//!
//! #[async_trait]
//! impl EnergyProvider for PlatformSource {
//!     async fn fetch_daily_sums(
//!         &self,
//!         metric: EnergyMetric,
//!         interval: DateInterval,
//!     ) -> Result<Vec<DailySample>, ProviderError> {
//!         // Query the platform's daily collection endpoint here
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HealthDataService::new(
//!         Arc::new(PlatformSource),
//!         &[EnergyMetric::ActiveEnergy, EnergyMetric::BasalEnergy],
//!     );
//!
//!     let january = DateInterval::new(
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
//!     );
//!
//!     // First call fetches the whole month; repeats are served from memory
//!     let days = service
//!         .energy_sums(EnergyMetric::ActiveEnergy, january, Granularity::Day)
//!         .await?;
//!     println!("Cached {} daily sums", days.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod logging;
pub mod provider;
pub mod service;

// Re-export top-level types for convenience
pub use cache::{
    AggregationCache, CacheError, CacheResult, CacheStats, Coverage, DailySample, DateInterval,
    EnergyInfo, EnergyMetric, GapPlan, Granularity, MonthlySample,
};

pub use provider::{BiologicalSex, BiometricProvider, EnergyProvider, HealthProvider, ProviderError};

pub use service::{EnergyCorrection, HealthDataService, QueryError, QueryResult};

pub use config::{Config, ConfigError, CorrectionConfig, LoggingConfig, TrackingConfig};
