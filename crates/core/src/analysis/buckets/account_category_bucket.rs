//! Account category buckets.
//!
//! Pure-total buckets: never registered against individual events, only
//! summed from account buckets (and, for the totals bucket, portfolio
//! totals) during totals production.

use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AccountAttr, AccountBucket, AccountBucketList, PortfolioAttr, PortfolioBucket, PortfolioBucketList};
use crate::accounts::{AccountCategory, AccountCategoryId};
use crate::analysis::values::{AttrKind, BucketAttr, ValueMap};
use crate::dataset::DataSet;

/// Attributes tracked per account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountCategoryAttr {
    /// Summed valuation of member accounts
    Valuation,
    /// Summed spend of member accounts
    Spend,
    /// Valuation movement over the period, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for AccountCategoryAttr {
    const ALL: &'static [Self] = &[
        AccountCategoryAttr::Valuation,
        AccountCategoryAttr::Spend,
        AccountCategoryAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        AttrKind::Money
    }

    fn is_flow(self) -> bool {
        matches!(self, AccountCategoryAttr::Spend)
    }
}

/// Summed account state for one category. `category` is `None` for the
/// distinguished totals bucket.
#[derive(Debug, Clone)]
pub struct AccountCategoryBucket {
    category: Option<Arc<AccountCategory>>,
    values: ValueMap<AccountCategoryAttr>,
    base_values: ValueMap<AccountCategoryAttr>,
}

impl AccountCategoryBucket {
    fn new(category: Arc<AccountCategory>) -> Self {
        AccountCategoryBucket {
            category: Some(category),
            values: ValueMap::new(),
            base_values: ValueMap::new(),
        }
    }

    fn new_totals() -> Self {
        AccountCategoryBucket {
            category: None,
            values: ValueMap::new(),
            base_values: ValueMap::new(),
        }
    }

    pub fn category(&self) -> Option<&Arc<AccountCategory>> {
        self.category.as_ref()
    }

    pub fn id(&self) -> Option<AccountCategoryId> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(crate::constants::TOTALS_BUCKET_NAME)
    }

    pub fn values(&self) -> &ValueMap<AccountCategoryAttr> {
        &self.values
    }

    pub fn base_values(&self) -> &ValueMap<AccountCategoryAttr> {
        &self.base_values
    }

    pub fn valuation(&self) -> Decimal {
        self.values.decimal_or_zero(AccountCategoryAttr::Valuation)
    }

    fn add_account(&mut self, bucket: &AccountBucket) {
        self.values.add_decimal(
            AccountCategoryAttr::Valuation,
            bucket.values().decimal_or_zero(AccountAttr::Valuation),
        );
        self.values.add_decimal(
            AccountCategoryAttr::Spend,
            bucket.values().decimal_or_zero(AccountAttr::Spend),
        );
        self.base_values.add_decimal(
            AccountCategoryAttr::Valuation,
            bucket.base_values().decimal_or_zero(AccountAttr::Valuation),
        );
        self.base_values.add_decimal(
            AccountCategoryAttr::Spend,
            bucket.base_values().decimal_or_zero(AccountAttr::Spend),
        );
    }

    fn add_portfolio(&mut self, bucket: &PortfolioBucket) {
        self.values.add_decimal(
            AccountCategoryAttr::Valuation,
            bucket.values().decimal_or_zero(PortfolioAttr::Valuation),
        );
        self.base_values.add_decimal(
            AccountCategoryAttr::Valuation,
            bucket
                .base_values()
                .decimal_or_zero(PortfolioAttr::Valuation),
        );
    }

    fn calculate_delta(&mut self) {
        let delta = self.values.decimal_or_zero(AccountCategoryAttr::Valuation)
            - self
                .base_values
                .decimal_or_zero(AccountCategoryAttr::Valuation);
        self.values.set_decimal(AccountCategoryAttr::Delta, delta);
    }
}

/// Account-category rollups for one analysis. Reconstructed fresh for
/// every derived analysis: totals are recomputed, never replayed.
#[derive(Debug, Clone)]
pub struct AccountCategoryBucketList {
    buckets: BTreeMap<AccountCategoryId, AccountCategoryBucket>,
    totals: AccountCategoryBucket,
}

impl Default for AccountCategoryBucketList {
    fn default() -> Self {
        AccountCategoryBucketList {
            buckets: BTreeMap::new(),
            totals: AccountCategoryBucket::new_totals(),
        }
    }
}

impl AccountCategoryBucketList {
    pub(crate) fn new() -> Self {
        AccountCategoryBucketList::default()
    }

    pub fn bucket(&self, id: AccountCategoryId) -> Option<&AccountCategoryBucket> {
        self.buckets.get(&id)
    }

    pub fn totals(&self) -> &AccountCategoryBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountCategoryBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Pass 1 of the account rollup: every account bucket gets its delta
    /// computed and is folded into its category's accumulator (built in
    /// a side buffer) and into the totals bucket; pass 2 merges the
    /// side buffer into the list.
    ///
    /// Portfolios are intentionally absent here to avoid double
    /// counting; `fold_portfolio_totals` adds them afterwards.
    pub(crate) fn produce_totals(&mut self, accounts: &mut AccountBucketList, data: &DataSet) {
        let mut side: BTreeMap<AccountCategoryId, AccountCategoryBucket> = BTreeMap::new();

        for bucket in accounts.iter_mut() {
            bucket.calculate_delta();
            self.totals.add_account(bucket);

            let category_id = bucket.account().category;
            match data.account_category(category_id) {
                Some(category) => side
                    .entry(category_id)
                    .or_insert_with(|| AccountCategoryBucket::new(category.clone()))
                    .add_account(bucket),
                None => warn!(
                    "Account category id {} is not in the dataset; rollup skipped",
                    category_id.0
                ),
            }
        }

        for (id, mut bucket) in side {
            bucket.calculate_delta();
            self.buckets.insert(id, bucket);
        }

        self.totals.calculate_delta();
    }

    /// The portfolio pass: portfolio totals are added once, in
    /// aggregate, and the totals delta is recomputed.
    pub(crate) fn fold_portfolio_totals(&mut self, portfolios: &PortfolioBucketList) {
        self.totals.add_portfolio(portfolios.totals());
        self.totals.calculate_delta();
    }
}
