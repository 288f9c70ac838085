//! Inclusive date ranges.
//!
//! Every analysis covers one `DateRange`; derived analyses are keyed by
//! the range they cover, so the type is hashable and orderable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a date sits relative to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePosition {
    Before,
    Within,
    After,
}

/// An inclusive `[start, end]` calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range. `start` must not be after `end`; the arguments are
    /// swapped if it is, so a range is always well formed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            DateRange { start, end }
        } else {
            DateRange {
                start: end,
                end: start,
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Classifies `date` against this range.
    pub fn position(&self, date: NaiveDate) -> RangePosition {
        if date < self.start {
            RangePosition::Before
        } else if date > self.end {
            RangePosition::After
        } else {
            RangePosition::Within
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date) == RangePosition::Within
    }

    /// The sub-range of `self` ending at `cutoff` (clamped to `self`).
    pub fn up_to(&self, cutoff: NaiveDate) -> DateRange {
        let end = cutoff.min(self.end).max(self.start);
        DateRange::new(self.start, end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
