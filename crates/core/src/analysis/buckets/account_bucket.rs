//! Account buckets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accounts::{Account, AccountId};
use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
use crate::events::{Event, EventId};
use crate::rates::RateMap;
use crate::utils::DateRange;

/// Attributes tracked per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountAttr {
    /// Running balance
    Valuation,
    /// Money paid out of the account during the period
    Spend,
    /// Interest rate in force at the valuation date
    Rate,
    /// Expiry of that rate
    Maturity,
    /// Valuation movement over the period, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for AccountAttr {
    const ALL: &'static [Self] = &[
        AccountAttr::Valuation,
        AccountAttr::Spend,
        AccountAttr::Rate,
        AccountAttr::Maturity,
        AccountAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        match self {
            AccountAttr::Valuation | AccountAttr::Spend | AccountAttr::Delta => AttrKind::Money,
            AccountAttr::Rate => AttrKind::Rate,
            AccountAttr::Maturity => AttrKind::Date,
        }
    }

    fn is_flow(self) -> bool {
        matches!(self, AccountAttr::Spend)
    }
}

/// Aggregate state of one account within one analysis.
#[derive(Debug, Clone)]
pub struct AccountBucket {
    account: Arc<Account>,
    history: BucketHistory<AccountAttr>,
}

impl AccountBucket {
    fn new(account: Arc<Account>) -> Self {
        AccountBucket {
            account,
            history: BucketHistory::new(),
        }
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    pub fn id(&self) -> AccountId {
        self.account.id
    }

    pub fn name(&self) -> &str {
        &self.account.name
    }

    pub fn values(&self) -> &ValueMap<AccountAttr> {
        self.history.values()
    }

    pub fn base_values(&self) -> &ValueMap<AccountAttr> {
        self.history.base_values()
    }

    pub fn valuation(&self) -> Decimal {
        self.values().decimal_or_zero(AccountAttr::Valuation)
    }

    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<AccountAttr>> {
        self.history.values_for_event(event)
    }

    pub fn delta_for_event(&self, event: EventId, attr: AccountAttr) -> Option<Decimal> {
        self.history.delta_for_event(event, attr)
    }

    /// Books the opening balance as pre-existing capital: it raises the
    /// running valuation and the period-opening base alike, so it never
    /// shows up as period income.
    pub(crate) fn set_opening_balance(&mut self, balance: Decimal) {
        self.history
            .values_mut()
            .add_decimal(AccountAttr::Valuation, balance);
        self.history
            .base_values_mut()
            .add_decimal(AccountAttr::Valuation, balance);
    }

    /// Money leaving the account.
    pub(crate) fn adjust_for_debit(&mut self, event: &Event) {
        let values = self.history.values_mut();
        values.subtract_decimal(AccountAttr::Valuation, event.amount);
        values.add_decimal(AccountAttr::Spend, event.amount);
        self.history.register_event(event.id, event.date);
    }

    /// Money entering the account.
    pub(crate) fn adjust_for_credit(&mut self, event: &Event) {
        self.history
            .values_mut()
            .add_decimal(AccountAttr::Valuation, event.amount);
        self.history.register_event(event.id, event.date);
    }

    /// Stamps the rate in force at `date` onto the bucket.
    pub(crate) fn record_rate(&mut self, rates: &RateMap, date: NaiveDate) {
        if let Some(rate) = rates.rate_on(self.id(), date) {
            let values = self.history.values_mut();
            values.set_decimal(AccountAttr::Rate, rate.rate);
            if let Some(end_date) = rate.end_date {
                values.set_date(AccountAttr::Maturity, end_date);
            }
        }
    }

    /// Stores Delta = closing valuation - opening valuation. Run once
    /// per totals pass; never recomputed lazily.
    pub(crate) fn calculate_delta(&mut self) {
        let delta = self.values().decimal_or_zero(AccountAttr::Valuation)
            - self
                .base_values()
                .decimal_or_zero(AccountAttr::Valuation);
        self.history
            .values_mut()
            .set_decimal(AccountAttr::Delta, delta);
    }

    /// An account with a standing balance is active even when no event
    /// touched it in the covered period.
    pub fn is_active(&self) -> bool {
        !self.values().is_zero(AccountAttr::Valuation)
    }

    pub fn is_idle(&self) -> bool {
        self.history.is_idle()
    }

    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        AccountBucket {
            account: base.account.clone(),
            history: BucketHistory::dated(&base.history, cutoff),
        }
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        AccountBucket {
            account: base.account.clone(),
            history: BucketHistory::ranged(&base.history, range),
        }
    }

    pub(crate) fn adjust_to_base(&mut self) {
        self.history.adjust_to_base();
    }
}

impl PartialEq for AccountBucket {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for AccountBucket {}

impl PartialOrd for AccountBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccountBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

/// The accounts of one analysis, ordered by account id.
#[derive(Debug, Clone, Default)]
pub struct AccountBucketList {
    buckets: BTreeMap<AccountId, AccountBucket>,
}

impl AccountBucketList {
    pub(crate) fn new() -> Self {
        AccountBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, account: &Arc<Account>) -> &mut AccountBucket {
        self.buckets
            .entry(account.id)
            .or_insert_with(|| AccountBucket::new(account.clone()))
    }

    pub fn bucket(&self, id: AccountId) -> Option<&AccountBucket> {
        self.buckets.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountBucket> {
        self.buckets.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AccountBucket> {
        self.buckets.values_mut()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub(crate) fn record_rates(&mut self, rates: &RateMap, date: NaiveDate) {
        for bucket in self.buckets.values_mut() {
            bucket.record_rate(rates, date);
        }
    }

    /// Balance-as-of-date view: only accounts with a standing balance
    /// are kept.
    pub(crate) fn dated(base: &Self, cutoff: NaiveDate) -> Self {
        let mut list = AccountBucketList::new();
        for bucket in base.iter() {
            let derived = AccountBucket::dated(bucket, cutoff);
            if derived.is_active() {
                list.buckets.insert(derived.id(), derived);
            }
        }
        list
    }

    /// Period view: accounts with a standing balance or any event in
    /// range are kept, re-based so flows carry only the in-range delta.
    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        let mut list = AccountBucketList::new();
        for bucket in base.iter() {
            let mut derived = AccountBucket::ranged(bucket, range);
            if derived.is_active() || !derived.is_idle() {
                derived.adjust_to_base();
                list.buckets.insert(derived.id(), derived);
            }
        }
        list
    }
}
