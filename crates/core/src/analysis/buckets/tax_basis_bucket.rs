//! Tax basis buckets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
use crate::categories::TaxBasisClass;
use crate::events::{Event, EventId};
use crate::utils::DateRange;

/// Attributes tracked per tax basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxBasisAttr {
    /// Gross amount attributed to the basis
    Gross,
    /// Amount actually received after withholding
    Net,
    /// Tax withheld at source
    TaxCredit,
    /// Net movement over the period, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for TaxBasisAttr {
    const ALL: &'static [Self] = &[
        TaxBasisAttr::Gross,
        TaxBasisAttr::Net,
        TaxBasisAttr::TaxCredit,
        TaxBasisAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        AttrKind::Money
    }

    fn is_flow(self) -> bool {
        matches!(
            self,
            TaxBasisAttr::Gross | TaxBasisAttr::Net | TaxBasisAttr::TaxCredit
        )
    }
}

/// Aggregate flows for one tax basis. `basis` is `None` for the
/// distinguished totals bucket.
#[derive(Debug, Clone)]
pub struct TaxBasisBucket {
    basis: Option<TaxBasisClass>,
    history: BucketHistory<TaxBasisAttr>,
}

impl TaxBasisBucket {
    fn new(basis: TaxBasisClass) -> Self {
        TaxBasisBucket {
            basis: Some(basis),
            history: BucketHistory::new(),
        }
    }

    fn new_totals() -> Self {
        TaxBasisBucket {
            basis: None,
            history: BucketHistory::new(),
        }
    }

    pub fn basis(&self) -> Option<TaxBasisClass> {
        self.basis
    }

    pub fn values(&self) -> &ValueMap<TaxBasisAttr> {
        self.history.values()
    }

    pub fn base_values(&self) -> &ValueMap<TaxBasisAttr> {
        self.history.base_values()
    }

    pub fn gross(&self) -> Decimal {
        self.values().decimal_or_zero(TaxBasisAttr::Gross)
    }

    pub fn net(&self) -> Decimal {
        self.values().decimal_or_zero(TaxBasisAttr::Net)
    }

    pub fn tax_credit(&self) -> Decimal {
        self.values().decimal_or_zero(TaxBasisAttr::TaxCredit)
    }

    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<TaxBasisAttr>> {
        self.history.values_for_event(event)
    }

    pub fn delta_for_event(&self, event: EventId, attr: TaxBasisAttr) -> Option<Decimal> {
        self.history.delta_for_event(event, attr)
    }

    /// Income attributed to the basis: gross includes every withheld
    /// side-amount, net is what arrived in the account.
    pub(crate) fn add_income(&mut self, event: &Event) {
        let values = self.history.values_mut();
        values.add_decimal(TaxBasisAttr::Gross, event.gross_income());
        values.add_decimal(TaxBasisAttr::Net, event.amount);
        if let Some(credit) = event.tax_credit {
            values.add_decimal(TaxBasisAttr::TaxCredit, credit);
        }
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn subtract_income(&mut self, event: &Event) {
        let values = self.history.values_mut();
        values.subtract_decimal(TaxBasisAttr::Gross, event.gross_income());
        values.subtract_decimal(TaxBasisAttr::Net, event.amount);
        if let Some(credit) = event.tax_credit {
            values.subtract_decimal(TaxBasisAttr::TaxCredit, credit);
        }
        self.history.register_event(event.id, event.date);
    }

    /// Expense attributed to the basis (gross and net coincide).
    pub(crate) fn add_expense(&mut self, event: &Event) {
        let values = self.history.values_mut();
        values.add_decimal(TaxBasisAttr::Gross, event.amount);
        values.add_decimal(TaxBasisAttr::Net, event.amount);
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn subtract_expense(&mut self, event: &Event) {
        let values = self.history.values_mut();
        values.subtract_decimal(TaxBasisAttr::Gross, event.amount);
        values.subtract_decimal(TaxBasisAttr::Net, event.amount);
        self.history.register_event(event.id, event.date);
    }

    pub(crate) fn fold(&mut self, other: &Self) {
        self.history.values_mut().add_all(other.values());
        self.history.base_values_mut().add_all(other.base_values());
    }

    pub(crate) fn calculate_delta(&mut self) {
        let delta = self.net()
            - self
                .base_values()
                .decimal_or_zero(TaxBasisAttr::Net);
        self.history
            .values_mut()
            .set_decimal(TaxBasisAttr::Delta, delta);
    }

    pub fn is_idle(&self) -> bool {
        self.history.is_idle()
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        TaxBasisBucket {
            basis: base.basis,
            history: BucketHistory::dated(&base.history, cutoff),
        }
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        TaxBasisBucket {
            basis: base.basis,
            history: BucketHistory::ranged(&base.history, range),
        }
    }

    pub(crate) fn adjust_to_base(&mut self) {
        self.history.adjust_to_base();
    }
}

/// The tax bases of one analysis, ordered by basis class, plus the
/// totals bucket.
#[derive(Debug, Clone)]
pub struct TaxBasisBucketList {
    buckets: BTreeMap<TaxBasisClass, TaxBasisBucket>,
    totals: TaxBasisBucket,
}

impl Default for TaxBasisBucketList {
    fn default() -> Self {
        TaxBasisBucketList {
            buckets: BTreeMap::new(),
            totals: TaxBasisBucket::new_totals(),
        }
    }
}

impl TaxBasisBucketList {
    pub(crate) fn new() -> Self {
        TaxBasisBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, basis: TaxBasisClass) -> &mut TaxBasisBucket {
        self.buckets
            .entry(basis)
            .or_insert_with(|| TaxBasisBucket::new(basis))
    }

    pub fn bucket(&self, basis: TaxBasisClass) -> Option<&TaxBasisBucket> {
        self.buckets.get(&basis)
    }

    pub fn totals(&self) -> &TaxBasisBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBasisBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bases are flat: the rollup folds every bucket straight into the
    /// totals bucket.
    pub(crate) fn produce_totals(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.calculate_delta();
            self.totals.fold(bucket);
        }
        self.totals.calculate_delta();
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        let mut list = TaxBasisBucketList::new();
        for bucket in base.iter() {
            let derived = TaxBasisBucket::dated(bucket, cutoff);
            if !derived.is_idle() {
                if let Some(basis) = derived.basis() {
                    list.buckets.insert(basis, derived);
                }
            }
        }
        list
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        let mut list = TaxBasisBucketList::new();
        for bucket in base.iter() {
            let mut derived = TaxBasisBucket::ranged(bucket, range);
            if !derived.is_idle() {
                derived.adjust_to_base();
                if let Some(basis) = derived.basis() {
                    list.buckets.insert(basis, derived);
                }
            }
        }
        list
    }
}
