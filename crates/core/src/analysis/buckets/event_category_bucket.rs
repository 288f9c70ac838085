//! Event category buckets.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
use crate::categories::{EventCategory, EventCategoryId};
use crate::dataset::DataSet;
use crate::events::{Event, EventId};
use crate::utils::DateRange;

/// Attributes tracked per event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventCategoryAttr {
    /// Gross income booked against the category
    Income,
    /// Expense booked against the category
    Expense,
    /// Income - expense, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for EventCategoryAttr {
    const ALL: &'static [Self] = &[
        EventCategoryAttr::Income,
        EventCategoryAttr::Expense,
        EventCategoryAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        AttrKind::Money
    }

    fn is_flow(self) -> bool {
        matches!(self, EventCategoryAttr::Income | EventCategoryAttr::Expense)
    }
}

/// Aggregate flows against one event category. `category` is `None`
/// for the distinguished totals bucket at the root of the rollup tree.
#[derive(Debug, Clone)]
pub struct EventCategoryBucket {
    category: Option<Arc<EventCategory>>,
    history: BucketHistory<EventCategoryAttr>,
}

impl EventCategoryBucket {
    fn new(category: Arc<EventCategory>) -> Self {
        EventCategoryBucket {
            category: Some(category),
            history: BucketHistory::new(),
        }
    }

    fn new_totals() -> Self {
        EventCategoryBucket {
            category: None,
            history: BucketHistory::new(),
        }
    }

    pub fn category(&self) -> Option<&Arc<EventCategory>> {
        self.category.as_ref()
    }

    pub fn id(&self) -> Option<EventCategoryId> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(crate::constants::TOTALS_BUCKET_NAME)
    }

    pub fn values(&self) -> &ValueMap<EventCategoryAttr> {
        self.history.values()
    }

    pub fn base_values(&self) -> &ValueMap<EventCategoryAttr> {
        self.history.base_values()
    }

    pub fn income(&self) -> Decimal {
        self.values().decimal_or_zero(EventCategoryAttr::Income)
    }

    pub fn expense(&self) -> Decimal {
        self.values().decimal_or_zero(EventCategoryAttr::Expense)
    }

    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<EventCategoryAttr>> {
        self.history.values_for_event(event)
    }

    pub fn delta_for_event(&self, event: EventId, attr: EventCategoryAttr) -> Option<Decimal> {
        self.history.delta_for_event(event, attr)
    }

    /// Gross income for the category, including withheld side-amounts.
    pub(crate) fn add_income(&mut self, event: &Event) {
        let donation = event.charity_donation.unwrap_or_default();
        let values = self.history.values_mut();
        values.add_decimal(EventCategoryAttr::Income, event.gross_income() + donation);
        if !donation.is_zero() {
            values.add_decimal(EventCategoryAttr::Expense, donation);
        }
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn subtract_income(&mut self, event: &Event) {
        self.history
            .values_mut()
            .subtract_decimal(EventCategoryAttr::Income, event.gross_income());
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn add_expense(&mut self, event: &Event) {
        self.history
            .values_mut()
            .add_decimal(EventCategoryAttr::Expense, event.amount);
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn subtract_expense(&mut self, event: &Event) {
        self.history
            .values_mut()
            .subtract_decimal(EventCategoryAttr::Expense, event.amount);
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn fold(&mut self, other: &Self) {
        self.history.values_mut().add_all(other.values());
        self.history.base_values_mut().add_all(other.base_values());
    }

    pub(crate) fn calculate_delta(&mut self) {
        let delta = self.income() - self.expense();
        self.history
            .values_mut()
            .set_decimal(EventCategoryAttr::Delta, delta);
    }

    pub fn is_idle(&self) -> bool {
        self.history.is_idle()
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        EventCategoryBucket {
            category: base.category.clone(),
            history: BucketHistory::dated(&base.history, cutoff),
        }
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        EventCategoryBucket {
            category: base.category.clone(),
            history: BucketHistory::ranged(&base.history, range),
        }
    }

    pub(crate) fn adjust_to_base(&mut self) {
        self.history.adjust_to_base();
    }
}

impl PartialEq for EventCategoryBucket {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for EventCategoryBucket {}

impl PartialOrd for EventCategoryBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventCategoryBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

/// The event categories of one analysis, ordered by category id, plus
/// the totals bucket.
#[derive(Debug, Clone)]
pub struct EventCategoryBucketList {
    buckets: BTreeMap<EventCategoryId, EventCategoryBucket>,
    totals: EventCategoryBucket,
}

impl Default for EventCategoryBucketList {
    fn default() -> Self {
        EventCategoryBucketList {
            buckets: BTreeMap::new(),
            totals: EventCategoryBucket::new_totals(),
        }
    }
}

impl EventCategoryBucketList {
    pub(crate) fn new() -> Self {
        EventCategoryBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, category: &Arc<EventCategory>) -> &mut EventCategoryBucket {
        self.buckets
            .entry(category.id)
            .or_insert_with(|| EventCategoryBucket::new(category.clone()))
    }

    pub fn bucket(&self, id: EventCategoryId) -> Option<&EventCategoryBucket> {
        self.buckets.get(&id)
    }

    pub fn totals(&self) -> &EventCategoryBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventCategoryBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Two-pass hierarchical rollup.
    ///
    /// Pass 1 folds every leaf into its parent category (accumulated in
    /// a side buffer, since the parent may not exist as a bucket yet and
    /// the list cannot be grown while it is iterated) and into the
    /// totals bucket. Pass 2 merges the side buffer into the list.
    pub(crate) fn produce_totals(&mut self, data: &DataSet) {
        let mut parents: BTreeMap<EventCategoryId, EventCategoryBucket> = BTreeMap::new();

        for bucket in self.buckets.values_mut() {
            bucket.calculate_delta();
            self.totals.fold(bucket);

            let parent_id = match bucket.category().and_then(|c| c.parent) {
                Some(id) => id,
                None => continue,
            };
            match data.category(parent_id) {
                Some(parent) => parents
                    .entry(parent_id)
                    .or_insert_with(|| EventCategoryBucket::new(parent.clone()))
                    .fold(bucket),
                None => warn!(
                    "Parent category id {} is not in the dataset; rollup skipped",
                    parent_id.0
                ),
            }
        }

        for (id, mut parent) in parents {
            parent.calculate_delta();
            // A parent that also carried direct events folds into its
            // existing bucket instead of replacing it
            match self.buckets.get_mut(&id) {
                Some(existing) => {
                    existing.fold(&parent);
                    existing.calculate_delta();
                }
                None => {
                    self.buckets.insert(id, parent);
                }
            }
        }

        self.totals.calculate_delta();
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        let mut list = EventCategoryBucketList::new();
        for bucket in base.iter() {
            let derived = EventCategoryBucket::dated(bucket, cutoff);
            if !derived.is_idle() {
                if let Some(id) = derived.id() {
                    list.buckets.insert(id, derived);
                }
            }
        }
        list
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        let mut list = EventCategoryBucketList::new();
        for bucket in base.iter() {
            let mut derived = EventCategoryBucket::ranged(bucket, range);
            if !derived.is_idle() {
                derived.adjust_to_base();
                if let Some(id) = derived.id() {
                    list.buckets.insert(id, derived);
                }
            }
        }
        list
    }
}
