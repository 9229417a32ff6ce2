//! Coverage tracking and gap computation
//!
//! The cache guarantees completeness for a single contiguous date range.
//! [`Coverage`] records that range and computes the delta sub-ranges (gaps)
//! a requested interval still needs fetched. This is intentionally one
//! contiguous interval rather than a general interval set: query patterns
//! are assumed mostly expanding, and every emitted gap is adjacent to the
//! current range, so coverage never fragments.

use crate::cache::types::DateInterval;

/// The contiguous date range for which the daily store is known complete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    range: Option<DateInterval>,
}

/// Sub-intervals that must be fetched to cover a requested interval
///
/// Both sides can fire for a request straddling the covered range. An
/// initial fill on an empty cache is reported on the append side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapPlan {
    /// Gap strictly before the covered range: `[s, cs)`
    pub left: Option<DateInterval>,
    /// Gap at or after the end of the covered range: `[ce, e)`
    pub right: Option<DateInterval>,
}

impl GapPlan {
    /// True when the requested interval is already fully covered
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The covered range, if anything has been cached yet
    pub fn range(&self) -> Option<DateInterval> {
        self.range
    }

    /// Check whether a requested interval lies fully inside coverage
    pub fn covers(&self, interval: DateInterval) -> bool {
        match self.range {
            Some(covered) => interval.start >= covered.start && interval.end <= covered.end,
            None => false,
        }
    }

    /// Compute the gaps needed to extend coverage over `requested`
    ///
    /// Gaps start or end at the current coverage bounds, so fetching them
    /// keeps coverage contiguous even for a request disjoint from it.
    pub fn gaps(&self, requested: DateInterval) -> GapPlan {
        let Some(covered) = self.range else {
            return GapPlan {
                left: None,
                right: Some(requested),
            };
        };

        GapPlan {
            left: DateInterval::try_new(requested.start, covered.start),
            right: DateInterval::try_new(covered.end, requested.end),
        }
    }

    /// Extend coverage to the union bounding interval with `fetched`
    ///
    /// The fetched range is trusted to have no internal holes, which holds
    /// for every gap emitted by [`Coverage::gaps`].
    pub fn extend(&mut self, fetched: DateInterval) {
        self.range = Some(match self.range {
            Some(covered) => DateInterval {
                start: covered.start.min(fetched.start),
                end: covered.end.max(fetched.end),
            },
            None => fetched,
        });
    }
}
