//! Per-event value snapshots.

use chrono::NaiveDate;
use serde::Serialize;

use super::{BucketAttr, ValueMap};
use crate::events::EventId;

/// An immutable copy of a bucket's values, tagged with the event that
/// produced it. Created exactly once when the event is registered and
/// never mutated afterwards; re-basing produces a new snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSnapshot<A: BucketAttr> {
    event: EventId,
    date: NaiveDate,
    values: ValueMap<A>,
}

impl<A: BucketAttr> BucketSnapshot<A> {
    pub(crate) fn new(event: EventId, date: NaiveDate, values: ValueMap<A>) -> Self {
        BucketSnapshot {
            event,
            date,
            values,
        }
    }

    pub fn event(&self) -> EventId {
        self.event
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn values(&self) -> &ValueMap<A> {
        &self.values
    }

    /// A new snapshot carrying the period-relative delta of this one
    /// against `base`. The original is untouched.
    pub fn rebase(&self, base: &ValueMap<A>) -> Self {
        let mut values = self.values.snapshot();
        values.adjust_to_base_values(base);
        BucketSnapshot {
            event: self.event,
            date: self.date,
            values,
        }
    }
}
