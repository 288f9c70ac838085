//! Tax category buckets.
//!
//! Filled by the tax calculator after every other totals pass has run;
//! each bucket records the amount landing in one band, the rate applied
//! and the resulting taxation.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::values::{AttrKind, BucketAttr, ValueMap};

/// The bands and reliefs the calculator reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxCategoryClass {
    GrossIncome,
    PersonalAllowance,
    NonSavingsBasic,
    NonSavingsHigher,
    SavingsBasic,
    SavingsHigher,
    DividendBasic,
    DividendHigher,
    SlicedGains,
}

/// Attributes tracked per tax category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxCategoryAttr {
    /// Amount attributed to the band
    Amount,
    /// Rate applied to the band
    Rate,
    /// Tax arising from the band
    Taxation,
}

impl BucketAttr for TaxCategoryAttr {
    const ALL: &'static [Self] = &[
        TaxCategoryAttr::Amount,
        TaxCategoryAttr::Rate,
        TaxCategoryAttr::Taxation,
    ];

    fn kind(self) -> AttrKind {
        match self {
            TaxCategoryAttr::Rate => AttrKind::Rate,
            _ => AttrKind::Money,
        }
    }

    fn is_flow(self) -> bool {
        false
    }
}

/// One band of the liability computation. `class` is `None` for the
/// totals bucket.
#[derive(Debug, Clone)]
pub struct TaxCategoryBucket {
    class: Option<TaxCategoryClass>,
    values: ValueMap<TaxCategoryAttr>,
}

impl TaxCategoryBucket {
    fn new(class: TaxCategoryClass) -> Self {
        TaxCategoryBucket {
            class: Some(class),
            values: ValueMap::new(),
        }
    }

    fn new_totals() -> Self {
        TaxCategoryBucket {
            class: None,
            values: ValueMap::new(),
        }
    }

    pub fn class(&self) -> Option<TaxCategoryClass> {
        self.class
    }

    pub fn values(&self) -> &ValueMap<TaxCategoryAttr> {
        &self.values
    }

    pub fn amount(&self) -> Decimal {
        self.values.decimal_or_zero(TaxCategoryAttr::Amount)
    }

    pub fn taxation(&self) -> Decimal {
        self.values.decimal_or_zero(TaxCategoryAttr::Taxation)
    }

    pub(crate) fn record(&mut self, amount: Decimal, rate: Decimal, taxation: Decimal) {
        self.values.add_decimal(TaxCategoryAttr::Amount, amount);
        self.values.set_decimal(TaxCategoryAttr::Rate, rate);
        self.values.add_decimal(TaxCategoryAttr::Taxation, taxation);
    }
}

/// The banded liability breakdown of one analysis.
#[derive(Debug, Clone)]
pub struct TaxCategoryBucketList {
    buckets: BTreeMap<TaxCategoryClass, TaxCategoryBucket>,
    totals: TaxCategoryBucket,
}

impl Default for TaxCategoryBucketList {
    fn default() -> Self {
        TaxCategoryBucketList {
            buckets: BTreeMap::new(),
            totals: TaxCategoryBucket::new_totals(),
        }
    }
}

impl TaxCategoryBucketList {
    pub(crate) fn new() -> Self {
        TaxCategoryBucketList::default()
    }

    /// Find-or-create.
    pub(crate) fn bucket_mut(&mut self, class: TaxCategoryClass) -> &mut TaxCategoryBucket {
        self.buckets
            .entry(class)
            .or_insert_with(|| TaxCategoryBucket::new(class))
    }

    pub fn bucket(&self, class: TaxCategoryClass) -> Option<&TaxCategoryBucket> {
        self.buckets.get(&class)
    }

    pub fn totals(&self) -> &TaxCategoryBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxCategoryBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sums the taxation of every band into the totals bucket. Run once
    /// by the calculator after all bands are recorded.
    pub(crate) fn produce_totals(&mut self) {
        for bucket in self.buckets.values() {
            self.totals.values.add_decimal(
                TaxCategoryAttr::Taxation,
                bucket.values.decimal_or_zero(TaxCategoryAttr::Taxation),
            );
        }
    }
}
