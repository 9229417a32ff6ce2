//! Interval-aware energy aggregation cache
//!
//! This module provides the core caching functionality:
//!
//! - **types**: Core data structures (DailySample, MonthlySample, DateInterval)
//! - **coverage**: Contiguous coverage tracking and gap computation
//! - **engine**: The aggregation cache orchestrating fetch-merge-serve
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Query Path:
//!   DateInterval → Coverage.gaps → Provider fetch per gap → Densify →
//!   Merge (prepend/append) → Rebuild monthly → Slice [start, end)
//!
//! Covered Path:
//!   DateInterval → Slice [start, end)   (zero provider calls)
//! ```
//!
//! Coverage only ever grows: samples are added or replaced by a newer
//! fetch, never evicted, and everything lives in process memory for the
//! process lifetime.

pub mod coverage;
pub mod engine;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use coverage::{Coverage, GapPlan};
pub use engine::{AggregationCache, CacheStats};
pub use error::{CacheError, CacheResult};
pub use types::{
    days_in_month, month_start_of, DailySample, DateInterval, EnergyInfo, EnergyMetric,
    Granularity, MonthlySample,
};
