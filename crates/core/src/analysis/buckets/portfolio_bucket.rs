//! Portfolio buckets.
//!
//! Pure-total buckets summing the security holdings they contain.

use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{SecurityAttr, SecurityBucket, SecurityBucketList};
use crate::analysis::values::{AttrKind, BucketAttr, ValueMap};
use crate::dataset::DataSet;
use crate::securities::{Portfolio, PortfolioId};

/// Attributes tracked per portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PortfolioAttr {
    /// Summed valuation of member holdings
    Valuation,
    /// Summed residual cost basis
    Cost,
    /// Summed net invested money
    Invested,
    /// Summed gross dividends
    Dividend,
    /// Summed realised gains
    Gains,
    /// Summed profit
    Profit,
    /// Valuation movement over the period, stored by `calculate_delta`
    Delta,
}

impl BucketAttr for PortfolioAttr {
    const ALL: &'static [Self] = &[
        PortfolioAttr::Valuation,
        PortfolioAttr::Cost,
        PortfolioAttr::Invested,
        PortfolioAttr::Dividend,
        PortfolioAttr::Gains,
        PortfolioAttr::Profit,
        PortfolioAttr::Delta,
    ];

    fn kind(self) -> AttrKind {
        AttrKind::Money
    }

    fn is_flow(self) -> bool {
        matches!(
            self,
            PortfolioAttr::Cost
                | PortfolioAttr::Invested
                | PortfolioAttr::Dividend
                | PortfolioAttr::Gains
        )
    }
}

/// Summed security state for one portfolio. `portfolio` is `None` for
/// the distinguished totals bucket.
#[derive(Debug, Clone)]
pub struct PortfolioBucket {
    portfolio: Option<Arc<Portfolio>>,
    values: ValueMap<PortfolioAttr>,
    base_values: ValueMap<PortfolioAttr>,
}

impl PortfolioBucket {
    fn new(portfolio: Arc<Portfolio>) -> Self {
        PortfolioBucket {
            portfolio: Some(portfolio),
            values: ValueMap::new(),
            base_values: ValueMap::new(),
        }
    }

    fn new_totals() -> Self {
        PortfolioBucket {
            portfolio: None,
            values: ValueMap::new(),
            base_values: ValueMap::new(),
        }
    }

    pub fn portfolio(&self) -> Option<&Arc<Portfolio>> {
        self.portfolio.as_ref()
    }

    pub fn id(&self) -> Option<PortfolioId> {
        self.portfolio.as_ref().map(|p| p.id)
    }

    pub fn name(&self) -> &str {
        self.portfolio
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(crate::constants::TOTALS_BUCKET_NAME)
    }

    pub fn values(&self) -> &ValueMap<PortfolioAttr> {
        &self.values
    }

    pub fn base_values(&self) -> &ValueMap<PortfolioAttr> {
        &self.base_values
    }

    pub fn valuation(&self) -> Decimal {
        self.values.decimal_or_zero(PortfolioAttr::Valuation)
    }

    fn add_security(&mut self, bucket: &SecurityBucket) {
        const PAIRS: &[(PortfolioAttr, SecurityAttr)] = &[
            (PortfolioAttr::Valuation, SecurityAttr::Valuation),
            (PortfolioAttr::Cost, SecurityAttr::Cost),
            (PortfolioAttr::Invested, SecurityAttr::Invested),
            (PortfolioAttr::Dividend, SecurityAttr::Dividend),
            (PortfolioAttr::Gains, SecurityAttr::Gains),
            (PortfolioAttr::Profit, SecurityAttr::Profit),
        ];
        for &(own, source) in PAIRS {
            self.values
                .add_decimal(own, bucket.values().decimal_or_zero(source));
            self.base_values
                .add_decimal(own, bucket.base_values().decimal_or_zero(source));
        }
    }

    fn calculate_delta(&mut self) {
        let delta = self.values.decimal_or_zero(PortfolioAttr::Valuation)
            - self
                .base_values
                .decimal_or_zero(PortfolioAttr::Valuation);
        self.values.set_decimal(PortfolioAttr::Delta, delta);
    }
}

/// Portfolio rollups for one analysis. Reconstructed fresh for every
/// derived analysis.
#[derive(Debug, Clone)]
pub struct PortfolioBucketList {
    buckets: BTreeMap<PortfolioId, PortfolioBucket>,
    totals: PortfolioBucket,
}

impl Default for PortfolioBucketList {
    fn default() -> Self {
        PortfolioBucketList {
            buckets: BTreeMap::new(),
            totals: PortfolioBucket::new_totals(),
        }
    }
}

impl PortfolioBucketList {
    pub(crate) fn new() -> Self {
        PortfolioBucketList::default()
    }

    pub fn bucket(&self, id: PortfolioId) -> Option<&PortfolioBucket> {
        self.buckets.get(&id)
    }

    pub fn totals(&self) -> &PortfolioBucket {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortfolioBucket> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Folds every security bucket into its portfolio and the totals
    /// bucket. Security deltas are computed here, after `value_asset`
    /// has priced the holdings.
    pub(crate) fn produce_totals(&mut self, securities: &mut SecurityBucketList, data: &DataSet) {
        for bucket in securities.iter_mut() {
            bucket.calculate_delta();
            self.totals.add_security(bucket);

            let portfolio_id = bucket.security().portfolio;
            match data.portfolio(portfolio_id) {
                Some(portfolio) => self
                    .buckets
                    .entry(portfolio_id)
                    .or_insert_with(|| PortfolioBucket::new(portfolio.clone()))
                    .add_security(bucket),
                None => warn!(
                    "Portfolio id {} is not in the dataset; rollup skipped",
                    portfolio_id.0
                ),
            }
        }

        for bucket in self.buckets.values_mut() {
            bucket.calculate_delta();
        }
        self.totals.calculate_delta();
    }
}
