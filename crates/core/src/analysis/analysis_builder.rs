//! Top-level analysis construction.
//!
//! One linear scan over the chronologically pre-sorted event stream,
//! dispatching each event's debit and credit legs into the entity
//! buckets. Any failure aborts the construction attempt; no partial
//! analysis escapes.

use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::analysis_model::Analysis;
use super::buckets::{
    AccountBucketList, AccountCategoryBucketList, EventCategoryBucketList, PayeeBucketList,
    PortfolioBucketList, SecurityBucketList, TaxBasisBucketList, TaxCategoryBucketList,
};
use crate::accounts::{Account, AccountId};
use crate::categories::{CategoryClass, EventCategory};
use crate::dataset::DataSet;
use crate::dilution::DilutionMap;
use crate::errors::{AnalysisError, Result, ValidationError};
use crate::events::{AssetRef, Event};
use crate::payees::{Payee, PayeeId};
use crate::securities::{Security, SecurityId};
use crate::tax::ChargeableGain;

pub(super) fn build(dataset: Arc<DataSet>) -> Result<Analysis> {
    let range = dataset.range(NaiveDate::default());
    debug!(
        "Analysing {} events over {}",
        dataset.events().len(),
        range
    );

    let mut builder = Builder {
        dataset: dataset.clone(),
        accounts: AccountBucketList::new(),
        securities: SecurityBucketList::new(),
        payees: PayeeBucketList::new(),
        event_categories: EventCategoryBucketList::new(),
        tax_basis: TaxBasisBucketList::new(),
        charges: Vec::new(),
        dilutions: DilutionMap::new(),
    };

    // Opening balances are pre-existing capital: prime both the running
    // valuation and the base before the first event lands
    for account in dataset.accounts() {
        if let Some(balance) = account.opening_balance {
            builder
                .accounts
                .bucket_mut(account)
                .set_opening_balance(balance);
        }
    }

    for event in dataset.events() {
        builder.process_event(event)?;
    }

    // Valuation-time passes over the full range
    builder.securities.value_assets(dataset.prices(), &range);
    builder.accounts.record_rates(dataset.rates(), range.end());

    Ok(Analysis {
        dataset,
        range,
        accounts: builder.accounts,
        securities: builder.securities,
        payees: builder.payees,
        event_categories: builder.event_categories,
        tax_basis: builder.tax_basis,
        account_categories: AccountCategoryBucketList::new(),
        portfolios: PortfolioBucketList::new(),
        tax_categories: TaxCategoryBucketList::new(),
        charges: Arc::new(builder.charges),
        dilutions: Arc::new(builder.dilutions),
    })
}

struct Builder {
    dataset: Arc<DataSet>,
    accounts: AccountBucketList,
    securities: SecurityBucketList,
    payees: PayeeBucketList,
    event_categories: EventCategoryBucketList,
    tax_basis: TaxBasisBucketList,
    charges: Vec<ChargeableGain>,
    dilutions: DilutionMap,
}

impl Builder {
    fn process_event(&mut self, event: &Event) -> Result<()> {
        let category = self.lookup_category(event)?;
        let class = category.class;

        if class.is_security() {
            return self.process_security_event(event, class);
        }

        // Debit leg: the asset money (or income) flows out of
        match event.debit {
            AssetRef::Account(id) => {
                let account = self.lookup_account(id)?;
                self.accounts.bucket_mut(&account).adjust_for_debit(event);
            }
            AssetRef::Security(id) => {
                // A dividend paid out of the holding
                let security = self.lookup_security(id)?;
                self.securities.bucket_mut(&security).add_dividend(event);
            }
            AssetRef::Payee(id) => {
                let payee = self.lookup_payee(id)?;
                if class.is_expense() {
                    // Money back from a payee on an expense category is
                    // a refund
                    self.payees.bucket_mut(&payee).subtract_expense(event);
                } else {
                    self.payees.bucket_mut(&payee).add_income(event);
                }
            }
        }

        // Credit leg: the asset money flows into
        match event.credit {
            AssetRef::Account(id) => {
                let account = self.lookup_account(id)?;
                self.accounts.bucket_mut(&account).adjust_for_credit(event);
            }
            AssetRef::Security(id) => {
                // Income reinvested straight into a holding
                let security = self.lookup_security(id)?;
                let units = event.credit_units.unwrap_or_default();
                self.securities
                    .bucket_mut(&security)
                    .adjust_for_credit(event, units);
            }
            AssetRef::Payee(id) => {
                let payee = self.lookup_payee(id)?;
                if class.is_income() {
                    // Income handed back to its source is a reversal
                    self.payees.bucket_mut(&payee).subtract_income(event);
                } else {
                    self.payees.bucket_mut(&payee).add_expense(event);
                }
            }
        }

        // Category and tax-basis bookkeeping
        let basis = class.tax_basis();
        if class.is_income() {
            if event.credit.as_payee().is_some() {
                self.event_categories
                    .bucket_mut(&category)
                    .subtract_income(event);
                self.tax_basis.bucket_mut(basis).subtract_income(event);
            } else {
                self.event_categories.bucket_mut(&category).add_income(event);
                self.tax_basis.bucket_mut(basis).add_income(event);
            }
            if class == CategoryClass::ChargeableGain {
                self.charges.push(ChargeableGain::from_event(event)?);
            }
        } else if class.is_expense() {
            if event.debit.as_payee().is_some() {
                self.event_categories
                    .bucket_mut(&category)
                    .subtract_expense(event);
                self.tax_basis.bucket_mut(basis).subtract_expense(event);
            } else {
                self.event_categories
                    .bucket_mut(&category)
                    .add_expense(event);
                self.tax_basis.bucket_mut(basis).add_expense(event);
            }
        }

        Ok(())
    }

    fn process_security_event(&mut self, event: &Event, class: CategoryClass) -> Result<()> {
        match class {
            CategoryClass::StockPurchase => {
                if let Some(id) = event.debit.as_account() {
                    let account = self.lookup_account(id)?;
                    self.accounts.bucket_mut(&account).adjust_for_debit(event);
                }
                let security = self.security_leg(event.credit, event)?;
                let units = event
                    .credit_units
                    .ok_or(AnalysisError::MissingUnits(event.id.0))?;
                self.securities
                    .bucket_mut(&security)
                    .adjust_for_credit(event, units);
            }
            CategoryClass::StockSale => {
                let security = self.security_leg(event.debit, event)?;
                let units = event
                    .debit_units
                    .ok_or(AnalysisError::MissingUnits(event.id.0))?;
                self.securities
                    .bucket_mut(&security)
                    .adjust_for_debit(event, units);
                if let Some(id) = event.credit.as_account() {
                    let account = self.lookup_account(id)?;
                    self.accounts.bucket_mut(&account).adjust_for_credit(event);
                }
            }
            CategoryClass::StockSplit => {
                if let Some(id) = event.credit.as_security() {
                    let security = self.lookup_security(id)?;
                    let units = event
                        .credit_units
                        .ok_or(AnalysisError::MissingUnits(event.id.0))?;
                    self.securities
                        .bucket_mut(&security)
                        .adjust_units(event, units);
                } else {
                    let security = self.security_leg(event.debit, event)?;
                    let units = event
                        .debit_units
                        .ok_or(AnalysisError::MissingUnits(event.id.0))?;
                    self.securities
                        .bucket_mut(&security)
                        .adjust_units(event, -units);
                }
            }
            CategoryClass::StockRightsTaken => {
                if let Some(id) = event.debit.as_account() {
                    let account = self.lookup_account(id)?;
                    self.accounts.bucket_mut(&account).adjust_for_debit(event);
                }
                let security = self.security_leg(event.credit, event)?;
                self.securities.bucket_mut(&security).take_rights(event);
                if let Some(dilution) = event.dilution {
                    self.dilutions
                        .add_dilution(security.id, event.date, dilution);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn security_leg(&self, leg: AssetRef, event: &Event) -> Result<Arc<Security>> {
        let id = leg.as_security().ok_or_else(|| {
            ValidationError::InvalidInput(format!(
                "event {} has a security category but no security leg",
                event.id.0
            ))
        })?;
        self.lookup_security(id)
    }

    fn lookup_category(&self, event: &Event) -> Result<Arc<EventCategory>> {
        self.dataset
            .category(event.category)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownCategory(format!("id {}", event.category.0)).into())
    }

    fn lookup_account(&self, id: AccountId) -> Result<Arc<Account>> {
        self.dataset
            .account(id)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownAccount(format!("id {}", id.0)).into())
    }

    fn lookup_security(&self, id: SecurityId) -> Result<Arc<Security>> {
        self.dataset
            .security(id)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownSecurity(format!("id {}", id.0)).into())
    }

    fn lookup_payee(&self, id: PayeeId) -> Result<Arc<Payee>> {
        self.dataset
            .payee(id)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownPayee(format!("id {}", id.0)).into())
    }
}
