//! Payee buckets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
use crate::events::{Event, EventId};
use crate::payees::{Payee, PayeeId};
use crate::utils::DateRange;

/// Attributes tracked per payee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PayeeAttr {
    /// Gross money received from the payee
    Income,
    /// Money paid to the payee
    Expense,
    /// Income - expense, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for PayeeAttr {
    const ALL: &'static [Self] = &[PayeeAttr::Income, PayeeAttr::Expense, PayeeAttr::Delta];

    fn kind(self) -> AttrKind {
        AttrKind::Money
    }

    fn is_flow(self) -> bool {
        matches!(self, PayeeAttr::Income | PayeeAttr::Expense)
    }
}

/// Aggregate flows against one payee. `payee` is `None` for the
/// distinguished totals bucket.
#[derive(Debug, Clone)]
pub struct PayeeBucket {
    payee: Option<Arc<Payee>>,
    history: BucketHistory<PayeeAttr>,
}

impl PayeeBucket {
    fn new(payee: Arc<Payee>) -> Self {
        PayeeBucket {
            payee: Some(payee),
            history: BucketHistory::new(),
        }
    }

    fn new_totals() -> Self {
        PayeeBucket {
            payee: None,
            history: BucketHistory::new(),
        }
    }

    pub fn payee(&self) -> Option<&Arc<Payee>> {
        self.payee.as_ref()
    }

    pub fn id(&self) -> Option<PayeeId> {
        self.payee.as_ref().map(|p| p.id)
    }

    pub fn name(&self) -> &str {
        self.payee
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(crate::constants::TOTALS_BUCKET_NAME)
    }

    pub fn values(&self) -> &ValueMap<PayeeAttr> {
        self.history.values()
    }

    pub fn base_values(&self) -> &ValueMap<PayeeAttr> {
        self.history.base_values()
    }

    pub fn income(&self) -> Decimal {
        self.values().decimal_or_zero(PayeeAttr::Income)
    }

    pub fn expense(&self) -> Decimal {
        self.values().decimal_or_zero(PayeeAttr::Expense)
    }

    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<PayeeAttr>> {
        self.history.values_for_event(event)
    }

    pub fn delta_for_event(&self, event: EventId, attr: PayeeAttr) -> Option<Decimal> {
        self.history.delta_for_event(event, attr)
    }

    /// Income received from the payee: the gross amount including every
    /// withheld side-amount. A charity donation withheld at source also
    /// books as an expense.
    pub(crate) fn add_income(&mut self, event: &Event) {
        let donation = event.charity_donation.unwrap_or_default();
        let values = self.history.values_mut();
        values.add_decimal(PayeeAttr::Income, event.gross_income() + donation);
        if !donation.is_zero() {
            values.add_decimal(PayeeAttr::Expense, donation);
        }
        self.history.register_event(event.id, event.date);
    }

    /// An income reversal.
    pub(crate) fn subtract_income(&mut self, event: &Event) {
        self.history
            .values_mut()
            .subtract_decimal(PayeeAttr::Income, event.gross_income());
        self.history.register_event(event.id, event.date);
    }

    /// Money paid to the payee.
    pub(crate) fn add_expense(&mut self, event: &Event) {
        self.history
            .values_mut()
            .add_decimal(PayeeAttr::Expense, event.amount);
        self.history.register_event(event.id, event.date);
    }

    /// A refund from the payee.
    pub(crate) fn subtract_expense(&mut self, event: &Event) {
        self.history
            .values_mut()
            .subtract_decimal(PayeeAttr::Expense, event.amount);
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
            .set_decimal(PayeeAttr::Delta, delta);
    }

    pub fn is_idle(&self) -> bool {
        self.history.is_idle()
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        PayeeBucket {
            payee: base.payee.clone(),
            history: BucketHistory::dated(&base.history, cutoff),
        }
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        PayeeBucket {
            payee: base.payee.clone(),
            history: BucketHistory::ranged(&base.history, range),
        }
    }

    pub(crate) fn adjust_to_base(&mut self) {
        self.history.adjust_to_base();
    }
}

impl PartialEq for PayeeBucket {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for PayeeBucket {}

impl PartialOrd for PayeeBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PayeeBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

/// The payees of one analysis, ordered by payee id, plus the totals
/// bucket produced by the rollup pass.
#[derive(Debug, Clone)]
pub struct PayeeBucketList {
    buckets: BTreeMap<PayeeId, PayeeBucket>,
    totals: PayeeBucket,
}

impl Default for PayeeBucketList {
    fn default() -> Self {
        PayeeBucketList {
            buckets: BTreeMap::new(),
            totals: PayeeBucket::new_totals(),
        }
    }
}

impl PayeeBucketList {
    pub(crate) fn new() -> Self {
        PayeeBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, payee: &Arc<Payee>) -> &mut PayeeBucket {
        self.buckets
            .entry(payee.id)
            .or_insert_with(|| PayeeBucket::new(payee.clone()))
    }

    pub fn bucket(&self, id: PayeeId) -> Option<&PayeeBucket> {
        self.buckets.get(&id)
    }

    pub fn totals(&self) -> &PayeeBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayeeBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Payees are flat: the rollup folds every bucket straight into the
    /// totals bucket.
    pub(crate) fn produce_totals(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.calculate_delta();
            self.totals.fold(bucket);
        }
        self.totals.calculate_delta();
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        let mut list = PayeeBucketList::new();
        for bucket in base.iter() {
            let derived = PayeeBucket::dated(bucket, cutoff);
            if !derived.is_idle() {
                if let Some(id) = derived.id() {
                    list.buckets.insert(id, derived);
                }
            }
        }
        list
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        let mut list = PayeeBucketList::new();
        for bucket in base.iter() {
            let mut derived = PayeeBucket::ranged(bucket, range);
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
