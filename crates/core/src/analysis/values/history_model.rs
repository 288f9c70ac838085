//! Event-keyed bucket histories.
//!
//! A history owns the live value map a bucket mutates, the base map
//! holding the state at the start of the covered period, and the
//! ordered snapshot record. Dated and ranged histories are derived by
//! replaying recorded snapshots; raw events are never re-scanned.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{BucketAttr, BucketSnapshot, ValueMap};
use crate::events::EventId;
use crate::utils::{DateRange, RangePosition};

/// The snapshot history of one bucket over one period.
///
/// Snapshots are held in registration order, which the caller guarantees
/// is also non-decreasing date order; the derivation constructors rely
/// on that for their early exits.
#[derive(Debug, Clone)]
pub struct BucketHistory<A: BucketAttr> {
    values: ValueMap<A>,
    base_values: ValueMap<A>,
    snapshots: Vec<BucketSnapshot<A>>,
    index: HashMap<EventId, usize>,
}

impl<A: BucketAttr> Default for BucketHistory<A> {
    fn default() -> Self {
        BucketHistory {
            values: ValueMap::new(),
            base_values: ValueMap::new(),
            snapshots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<A: BucketAttr> BucketHistory<A> {
    /// A fresh history with empty live and base maps.
    pub fn new() -> Self {
        BucketHistory::default()
    }

    pub fn values(&self) -> &ValueMap<A> {
        &self.values
    }

    /// Mutable access to the live map. Mutations become visible in the
    /// snapshot record only once `register_event` runs.
    pub fn values_mut(&mut self) -> &mut ValueMap<A> {
        &mut self.values
    }

    pub fn base_values(&self) -> &ValueMap<A> {
        &self.base_values
    }

    /// Base-map access for opening-balance priming and valuation
    /// refresh; the base is otherwise immutable until `adjust_to_base`.
    pub(crate) fn base_values_mut(&mut self) -> &mut ValueMap<A> {
        &mut self.base_values
    }

    /// Records a snapshot of the live map against `event`. Registration
    /// is unconditional - a zero-amount event still snapshots, so that
    /// per-event lookups stay complete.
    pub fn register_event(&mut self, event: EventId, date: NaiveDate) -> &ValueMap<A> {
        let snapshot = BucketSnapshot::new(event, date, self.values.snapshot());
        let pos = self.snapshots.len();
        self.index.insert(event, pos);
        self.snapshots.push(snapshot);
        self.snapshots[pos].values()
    }

    /// The values recorded when `event` was registered.
    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<A>> {
        self.index
            .get(&event)
            .and_then(|&pos| self.snapshots.get(pos))
            .map(|s| s.values())
    }

    /// The change a single event made to a decimal attribute: its
    /// snapshot value minus the preceding snapshot's (or the base's,
    /// for the first event).
    pub fn delta_for_event(&self, event: EventId, attr: A) -> Option<Decimal> {
        let pos = *self.index.get(&event)?;
        let current = self.snapshots.get(pos)?.values().decimal_or_zero(attr);
        let previous = if pos == 0 {
            self.base_values.decimal_or_zero(attr)
        } else {
            self.snapshots[pos - 1].values().decimal_or_zero(attr)
        };
        Some(current - previous)
    }

    /// True iff no snapshot was recorded in the covered period.
    pub fn is_idle(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &BucketSnapshot<A>> {
        self.snapshots.iter()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.snapshots.last().map(|s| s.date())
    }

    /// Derives the history truncated at `cutoff`.
    ///
    /// Snapshots are date-ordered, so the walk stops at the first entry
    /// past the cutoff. The live map becomes the latest kept snapshot,
    /// or the base when nothing qualified.
    pub fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        let mut history = BucketHistory {
            values: ValueMap::new(),
            base_values: base.base_values.snapshot(),
            snapshots: Vec::new(),
            index: HashMap::new(),
        };

        for snapshot in &base.snapshots {
            if snapshot.date() > cutoff {
                break;
            }
            history.index.insert(snapshot.event(), history.snapshots.len());
            history.snapshots.push(snapshot.clone());
        }

        history.values = match history.snapshots.last() {
            Some(snapshot) => snapshot.values().snapshot(),
            None => history.base_values.snapshot(),
        };
        history
    }

    /// Derives the history restricted to `range`.
    ///
    /// The last snapshot dated at or before the range start defines the
    /// base (an entry exactly at the start is both base and first
    /// in-range entry). In-range snapshots are stored re-based against
    /// that base so each carries its period-relative delta; the live
    /// map keeps the last in-range entry's absolute values, so that the
    /// bucket-level `adjust_to_base` subtraction happens exactly once.
    pub fn ranged(base: &Self, range: &DateRange) -> Self {
        let mut base_source: Option<&BucketSnapshot<A>> = None;
        let mut in_range: Vec<&BucketSnapshot<A>> = Vec::new();

        for snapshot in &base.snapshots {
            match range.position(snapshot.date()) {
                RangePosition::After => break,
                RangePosition::Before => base_source = Some(snapshot),
                RangePosition::Within => {
                    if snapshot.date() == range.start() {
                        base_source = Some(snapshot);
                    }
                    in_range.push(snapshot);
                }
            }
        }

        let base_values = match base_source {
            Some(snapshot) => snapshot.values().snapshot(),
            None => base.base_values.snapshot(),
        };

        let mut history = BucketHistory {
            values: ValueMap::new(),
            base_values,
            snapshots: Vec::new(),
            index: HashMap::new(),
        };

        for snapshot in &in_range {
            history.index.insert(snapshot.event(), history.snapshots.len());
            history
                .snapshots
                .push(snapshot.rebase(&history.base_values));
        }

        history.values = match in_range.last() {
            Some(snapshot) => snapshot.values().snapshot(),
            None => history.base_values.snapshot(),
        };
        history
    }

    /// Folds the base into the live map: flows become period deltas and
    /// the base's flows are zeroed. Run once per derivation.
    pub fn adjust_to_base(&mut self) {
        let base = self.base_values.snapshot();
        self.values.adjust_to_base_values(&base);
        self.base_values.reset_base_values();
    }
}
