//! The analysis aggregate root.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::analysis_builder;
use super::buckets::{
    AccountBucketList, AccountCategoryBucketList, EventCategoryBucketList, PayeeBucketList,
    PortfolioBucketList, SecurityBucketList, TaxBasisBucketList, TaxCategoryBucketList,
};
use crate::dataset::DataSet;
use crate::dilution::DilutionMap;
use crate::errors::Result;
use crate::prices::PriceMap;
use crate::rates::RateMap;
use crate::securities::SecurityId;
use crate::tax::{ChargeableGain, TaxCalculator};
use crate::utils::DateRange;

/// One list per bucket kind plus the shared reference data, for one
/// date range. A dated or ranged analysis is always derived from
/// exactly one source analysis; derivation replays recorded snapshots
/// and never re-scans raw events.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub(super) dataset: Arc<DataSet>,
    pub(super) range: DateRange,
    pub(super) accounts: AccountBucketList,
    pub(super) securities: SecurityBucketList,
    pub(super) payees: PayeeBucketList,
    pub(super) event_categories: EventCategoryBucketList,
    pub(super) tax_basis: TaxBasisBucketList,
    pub(super) account_categories: AccountCategoryBucketList,
    pub(super) portfolios: PortfolioBucketList,
    pub(super) tax_categories: TaxCategoryBucketList,
    pub(super) charges: Arc<Vec<ChargeableGain>>,
    pub(super) dilutions: Arc<DilutionMap>,
}

impl Analysis {
    /// Top-level construction: one chronological scan of the dataset's
    /// events, with opening balances applied as pre-existing capital.
    pub fn new(dataset: Arc<DataSet>) -> Result<Analysis> {
        analysis_builder::build(dataset)
    }

    /// Derives the balance-as-of-`cutoff` view of `base`.
    pub(super) fn dated(base: &Analysis, cutoff: NaiveDate) -> Analysis {
        let range = base.range.up_to(cutoff);
        debug!("Deriving dated analysis at {}", cutoff);

        let mut accounts = AccountBucketList::dated(&base.accounts, cutoff);
        accounts.record_rates(base.dataset.rates(), cutoff);

        Analysis {
            dataset: base.dataset.clone(),
            range,
            accounts,
            securities: SecurityBucketList::dated(&base.securities, &range, base.dataset.prices()),
            payees: PayeeBucketList::dated(&base.payees, cutoff),
            event_categories: EventCategoryBucketList::dated(&base.event_categories, cutoff),
            tax_basis: TaxBasisBucketList::dated(&base.tax_basis, cutoff),
            // Pure-total lists are rebuilt by the totals pass: totals
            // are recomputed, never replayed
            account_categories: AccountCategoryBucketList::new(),
            portfolios: PortfolioBucketList::new(),
            tax_categories: TaxCategoryBucketList::new(),
            charges: base.charges.clone(),
            dilutions: base.dilutions.clone(),
        }
    }

    /// Derives the period view of `base` over `range`.
    pub(super) fn ranged(base: &Analysis, range: DateRange) -> Analysis {
        debug!("Deriving ranged analysis over {}", range);

        let mut accounts = AccountBucketList::ranged(&base.accounts, &range);
        accounts.record_rates(base.dataset.rates(), range.end());

        Analysis {
            dataset: base.dataset.clone(),
            range,
            accounts,
            securities: SecurityBucketList::ranged(&base.securities, &range, base.dataset.prices()),
            payees: PayeeBucketList::ranged(&base.payees, &range),
            event_categories: EventCategoryBucketList::ranged(&base.event_categories, &range),
            tax_basis: TaxBasisBucketList::ranged(&base.tax_basis, &range),
            account_categories: AccountCategoryBucketList::new(),
            portfolios: PortfolioBucketList::new(),
            tax_categories: TaxCategoryBucketList::new(),
            charges: base.charges.clone(),
            dilutions: base.dilutions.clone(),
        }
    }

    /// Runs the full totals-production sequence. Order matters: later
    /// passes read results of earlier ones (portfolio totals must exist
    /// before they fold into the account-category totals, and the tax
    /// computation reads the finished tax-basis totals).
    pub(super) fn produce_totals(&mut self, calculator: &TaxCalculator) -> Result<()> {
        debug!("Producing totals for analysis over {}", self.range);
        self.account_categories
            .produce_totals(&mut self.accounts, &self.dataset);
        self.portfolios
            .produce_totals(&mut self.securities, &self.dataset);
        self.account_categories
            .fold_portfolio_totals(&self.portfolios);
        self.payees.produce_totals();
        self.event_categories.produce_totals(&self.dataset);
        self.tax_basis.produce_totals();
        self.tax_categories = calculator.calculate(&self.tax_basis, &self.charges, &self.range)?;
        Ok(())
    }

    // --- accessors ---

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn dataset(&self) -> &Arc<DataSet> {
        &self.dataset
    }

    pub fn accounts(&self) -> &AccountBucketList {
        &self.accounts
    }

    pub fn securities(&self) -> &SecurityBucketList {
        &self.securities
    }

    pub fn payees(&self) -> &PayeeBucketList {
        &self.payees
    }

    pub fn event_categories(&self) -> &EventCategoryBucketList {
        &self.event_categories
    }

    pub fn tax_basis(&self) -> &TaxBasisBucketList {
        &self.tax_basis
    }

    pub fn account_categories(&self) -> &AccountCategoryBucketList {
        &self.account_categories
    }

    pub fn portfolios(&self) -> &PortfolioBucketList {
        &self.portfolios
    }

    pub fn tax_categories(&self) -> &TaxCategoryBucketList {
        &self.tax_categories
    }

    pub fn prices(&self) -> &PriceMap {
        self.dataset.prices()
    }

    pub fn rates(&self) -> &RateMap {
        self.dataset.rates()
    }

    pub fn charges(&self) -> &[ChargeableGain] {
        &self.charges
    }

    pub fn dilutions(&self) -> &DilutionMap {
        &self.dilutions
    }

    /// The compounded dilution correction for pricing `security` on
    /// `date`, or `None` when no later dilution applies.
    pub fn dilution_factor(&self, security: SecurityId, date: NaiveDate) -> Option<Decimal> {
        self.dilutions.dilution_on(security, date)
    }
}
