//! Security buckets.
//!
//! Unlike money accounts, a security's valuation is not accumulated from
//! events: `value_asset` is invoked explicitly per target date and
//! multiplies the running unit balance by the price then in force.

use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
use crate::events::{Event, EventId};
use crate::prices::PriceMap;
use crate::securities::{Security, SecurityId};
use crate::utils::DateRange;
use log::warn;

/// Attributes tracked per security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityAttr {
    /// Running unit balance
    Units,
    /// Price in force at the valuation date
    Price,
    /// Units x price at the valuation date
    Valuation,
    /// Residual cost basis of the holding
    Cost,
    /// Net money put into the holding
    Invested,
    /// Dividends received, grossed up by tax credit
    Dividend,
    /// Realised gains on disposals
    Gains,
    /// Delta + realised gains + dividends, stored by `calculate_delta`
    Profit,
    /// Valuation movement over the period, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for SecurityAttr {
    const ALL: &'static [Self] = &[
        SecurityAttr::Units,
        SecurityAttr::Price,
        SecurityAttr::Valuation,
        SecurityAttr::Cost,
        SecurityAttr::Invested,
        SecurityAttr::Dividend,
        SecurityAttr::Gains,
        SecurityAttr::Profit,
        SecurityAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        match self {
            SecurityAttr::Units => AttrKind::Units,
            SecurityAttr::Price => AttrKind::Price,
            _ => AttrKind::Money,
        }
    }

    fn is_flow(self) -> bool {
        matches!(
            self,
            SecurityAttr::Cost
                | SecurityAttr::Invested
                | SecurityAttr::Dividend
                | SecurityAttr::Gains
        )
    }
}

/// Aggregate state of one security holding within one analysis.
#[derive(Debug, Clone)]
pub struct SecurityBucket {
    security: Arc<Security>,
    history: BucketHistory<SecurityAttr>,
}

impl SecurityBucket {
    fn new(security: Arc<Security>) -> Self {
        SecurityBucket {
            security,
            history: BucketHistory::new(),
        }
    }

    pub fn security(&self) -> &Arc<Security> {
        &self.security
    }

    pub fn id(&self) -> SecurityId {
        self.security.id
    }

    pub fn name(&self) -> &str {
        &self.security.name
    }

    pub fn values(&self) -> &ValueMap<SecurityAttr> {
        self.history.values()
    }

    pub fn base_values(&self) -> &ValueMap<SecurityAttr> {
        self.history.base_values()
    }

    pub fn units(&self) -> Decimal {
        self.values().decimal_or_zero(SecurityAttr::Units)
    }

    pub fn valuation(&self) -> Decimal {
        self.values().decimal_or_zero(SecurityAttr::Valuation)
    }

    pub fn values_for_event(&self, event: EventId) -> Option<&ValueMap<SecurityAttr>> {
        self.history.values_for_event(event)
    }

    pub fn delta_for_event(&self, event: EventId, attr: SecurityAttr) -> Option<Decimal> {
        self.history.delta_for_event(event, attr)
    }

    /// Units bought for cash.
    pub(crate) fn adjust_for_credit(&mut self, event: &Event, units: Decimal) {
        let values = self.history.values_mut();
        values.add_decimal(SecurityAttr::Units, units);
        values.add_decimal(SecurityAttr::Cost, event.amount);
        values.add_decimal(SecurityAttr::Invested, event.amount);
        self.history.register_event(event.id, event.date);
    }

    /// Units sold for cash. Cost is relieved proportionally to the units
    /// disposed of; a full disposal relieves the entire residual cost.
    pub(crate) fn adjust_for_debit(&mut self, event: &Event, units: Decimal) {
        let held = self.units();
        let cost = self.values().decimal_or_zero(SecurityAttr::Cost);
        let cost_relieved = if held.is_zero() || units >= held {
            cost
        } else {
            cost * units / held
        };

        let values = self.history.values_mut();
        values.subtract_decimal(SecurityAttr::Units, units);
        values.subtract_decimal(SecurityAttr::Cost, cost_relieved);
        values.subtract_decimal(SecurityAttr::Invested, event.amount);
        values.add_decimal(SecurityAttr::Gains, event.amount - cost_relieved);
        self.history.register_event(event.id, event.date);
    }

    /// Dividend paid out of the holding, grossed up by tax credit.
    pub(crate) fn add_dividend(&mut self, event: &Event) {
        let gross = event.amount + event.tax_credit.unwrap_or_default();
        self.history
            .values_mut()
            .add_decimal(SecurityAttr::Dividend, gross);
        self.history.register_event(event.id, event.date);
    }

    /// Unit movement with no cash leg (split, consolidation).
    pub(crate) fn adjust_units(&mut self, event: &Event, delta: Decimal) {
        self.history
            .values_mut()
            .add_decimal(SecurityAttr::Units, delta);
        self.history.register_event(event.id, event.date);
    }

    /// Rights taken up: extra cost into the holding, possibly with units.
    pub(crate) fn take_rights(&mut self, event: &Event) {
        let values = self.history.values_mut();
        if let Some(units) = event.credit_units {
            values.add_decimal(SecurityAttr::Units, units);
        }
        values.add_decimal(SecurityAttr::Cost, event.amount);
        values.add_decimal(SecurityAttr::Invested, event.amount);
        self.history.register_event(event.id, event.date);
    }

    /// Prices the holding at both ends of `range`: the closing price
    /// against the live units, the opening price against the base units.
    /// Must run before `calculate_delta`.
    pub(crate) fn value_asset(&mut self, prices: &PriceMap, range: &DateRange) {
        let (opening, closing) = prices.prices_in_range(self.id(), range);

        match closing {
            Some(price) => {
                let units = self.units();
                let values = self.history.values_mut();
                values.set_decimal(SecurityAttr::Price, price);
                values.set_decimal(SecurityAttr::Valuation, price * units);
            }
            None => warn!(
                "No price for security {} at {}; valuation left unset",
                self.name(),
                range.end()
            ),
        }

        if let Some(price) = opening {
            let base_units = self
                .base_values()
                .decimal_or_zero(SecurityAttr::Units);
            let base = self.history.base_values_mut();
            base.set_decimal(SecurityAttr::Price, price);
            base.set_decimal(SecurityAttr::Valuation, price * base_units);
        }
    }

    /// Stores Delta = closing valuation - opening valuation and
    /// Profit = delta + realised gains + dividends - net invested.
    /// `value_asset` must have run first.
    pub(crate) fn calculate_delta(&mut self) {
        let delta = self.valuation()
            - self
                .base_values()
                .decimal_or_zero(SecurityAttr::Valuation);
        let profit = delta + self.values().decimal_or_zero(SecurityAttr::Gains)
            + self.values().decimal_or_zero(SecurityAttr::Dividend)
            - self.values().decimal_or_zero(SecurityAttr::Invested);
        let values = self.history.values_mut();
        values.set_decimal(SecurityAttr::Delta, delta);
        values.set_decimal(SecurityAttr::Profit, profit);
    }

    /// A security still held is active even with no event in the period.
    pub fn is_active(&self) -> bool {
        !self.values().is_zero(SecurityAttr::Units)
    }

    pub fn is_idle(&self) -> bool {
        self.history.is_idle()
    }

    pub(crate) fn dated(base: &Self, cutoff: chrono::NaiveDate) -> Self {
        SecurityBucket {
            security: base.security.clone(),
            history: BucketHistory::dated(&base.history, cutoff),
        }
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange) -> Self {
        SecurityBucket {
            security: base.security.clone(),
            history: BucketHistory::ranged(&base.history, range),
        }
    }

    pub(crate) fn adjust_to_base(&mut self) {
        self.history.adjust_to_base();
    }
}

impl PartialEq for SecurityBucket {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SecurityBucket {}

impl PartialOrd for SecurityBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SecurityBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

/// The security holdings of one analysis, ordered by security id.
#[derive(Debug, Clone, Default)]
pub struct SecurityBucketList {
    buckets: BTreeMap<SecurityId, SecurityBucket>,
}

impl SecurityBucketList {
    pub(crate) fn new() -> Self {
        SecurityBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, security: &Arc<Security>) -> &mut SecurityBucket {
        self.buckets
            .entry(security.id)
            .or_insert_with(|| SecurityBucket::new(security.clone()))
    }

    pub fn bucket(&self, id: SecurityId) -> Option<&SecurityBucket> {
        self.buckets.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SecurityBucket> {
        self.buckets.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SecurityBucket> {
        self.buckets.values_mut()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Prices every holding at the ends of `range`.
    pub(crate) fn value_assets(&mut self, prices: &PriceMap, range: &DateRange) {
        for bucket in self.buckets.values_mut() {
            bucket.value_asset(prices, range);
        }
    }

    pub(crate) fn dated(base: &Self, range: &DateRange, prices: &PriceMap) -> Self {
        let mut list = SecurityBucketList::new();
        for bucket in base.iter() {
            let mut derived = SecurityBucket::dated(bucket, range.end());
            if derived.is_active() {
                derived.value_asset(prices, range);
                list.buckets.insert(derived.id(), derived);
            }
        }
        list
    }

    pub(crate) fn ranged(base: &Self, range: &DateRange, prices: &PriceMap) -> Self {
        let mut list = SecurityBucketList::new();
        for bucket in base.iter() {
            let mut derived = SecurityBucket::ranged(bucket, range);
            if derived.is_active() || !derived.is_idle() {
                derived.value_asset(prices, range);
                derived.adjust_to_base();
                list.buckets.insert(derived.id(), derived);
            }
        }
        list
    }
}
