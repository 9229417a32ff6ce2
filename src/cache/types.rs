//! Core data types for the energy aggregation cache
//!
//! This module defines the fundamental types used throughout the cache layer:
//! - `DailySample`: one calendar day's summed energy expenditure
//! - `MonthlySample`: a calendar month's roll-up derived from daily samples
//! - `EnergyInfo`: a query result row at the requested granularity
//! - `DateInterval`: a half-open calendar-day interval for queries
//! - `EnergyMetric` and `Granularity`: identifier and aggregation-level enums

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifier for a tracked energy metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnergyMetric {
    /// Energy burned through movement and exercise
    ActiveEnergy,
    /// Resting metabolic energy
    BasalEnergy,
}

impl EnergyMetric {
    /// Get all known metrics for iteration
    pub fn all() -> &'static [EnergyMetric] {
        &[EnergyMetric::ActiveEnergy, EnergyMetric::BasalEnergy]
    }
}

impl std::fmt::Display for EnergyMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyMetric::ActiveEnergy => write!(f, "active_energy"),
            EnergyMetric::BasalEnergy => write!(f, "basal_energy"),
        }
    }
}

/// Aggregation level of a query result
///
/// `Week` is part of the public vocabulary but is rejected at query time
/// with [`CacheError::UnsupportedGranularity`](crate::cache::CacheError);
/// it is never answered with a silent empty sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

/// Half-open calendar-day interval: `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateInterval {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// First day past the interval (exclusive)
    pub end: NaiveDate,
}

impl DateInterval {
    /// Create a new interval
    ///
    /// # Panics
    /// Panics if start >= end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start < end, "DateInterval: start must be before end");
        Self { start, end }
    }

    /// Create an interval, returning None if invalid
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// The one-day interval covering exactly `day`
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day + Duration::days(1),
        }
    }

    /// Check if a day falls within this interval
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }

    /// Number of calendar days covered
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Iterate over every day in the interval, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days() as usize)
    }
}

impl std::fmt::Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One calendar day's summed energy expenditure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailySample {
    /// The calendar day (local calendar, day-aligned)
    pub day: NaiveDate,
    /// Summed energy for that day in kilocalories
    pub kcal: f64,
}

impl DailySample {
    pub fn new(day: NaiveDate, kcal: f64) -> Self {
        Self { day, kcal }
    }
}

/// A calendar month's roll-up, always re-derived from the daily store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlySample {
    /// First day of the month
    pub month_start: NaiveDate,
    /// Sum of the daily samples falling in this month
    pub total_kcal: f64,
    /// Number of daily samples that contributed to the total
    pub sampled_days: u32,
}

impl MonthlySample {
    /// Average over the full calendar month, not just the sampled days
    pub fn average_kcal(&self) -> f64 {
        self.total_kcal / f64::from(days_in_month(self.month_start))
    }
}

/// A single query result row at the requested granularity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "granularity", rename_all = "lowercase")]
pub enum EnergyInfo {
    Daily(DailySample),
    Monthly(MonthlySample),
}

impl EnergyInfo {
    /// First day of the period this row covers
    pub fn period_start(&self) -> NaiveDate {
        match self {
            EnergyInfo::Daily(sample) => sample.day,
            EnergyInfo::Monthly(sample) => sample.month_start,
        }
    }

    /// Energy value of this row: the day's sum or the month's total
    pub fn kcal(&self) -> f64 {
        match self {
            EnergyInfo::Daily(sample) => sample.kcal,
            EnergyInfo::Monthly(sample) => sample.total_kcal,
        }
    }
}

/// First day of the month `day` belongs to
pub fn month_start_of(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap()
}

/// Number of calendar days in the month `day` belongs to
pub fn days_in_month(day: NaiveDate) -> u32 {
    let start = month_start_of(day);
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1).unwrap()
    };
    (next - start).num_days() as u32
}
