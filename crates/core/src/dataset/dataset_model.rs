//! The in-memory dataset.
//!
//! Everything here is owned by the external data layer and consumed
//! read-only by the engine. Events must be presented in non-decreasing
//! date order; the engine relies on that ordering for its date-ordered
//! early exits and does not re-sort.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accounts::{Account, AccountCategory, AccountCategoryId, AccountId};
use crate::categories::{EventCategory, EventCategoryId};
use crate::errors::{AnalysisError, Result};
use crate::events::Event;
use crate::payees::{Payee, PayeeId};
use crate::prices::PriceMap;
use crate::rates::RateMap;
use crate::securities::{Portfolio, PortfolioId, Security, SecurityId};
use crate::utils::DateRange;

/// Master records, reference maps and the chronological event stream for
/// one load of the books.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    accounts: BTreeMap<AccountId, Arc<Account>>,
    account_categories: BTreeMap<AccountCategoryId, Arc<AccountCategory>>,
    securities: BTreeMap<SecurityId, Arc<Security>>,
    portfolios: BTreeMap<PortfolioId, Arc<Portfolio>>,
    payees: BTreeMap<PayeeId, Arc<Payee>>,
    categories: BTreeMap<EventCategoryId, Arc<EventCategory>>,
    events: Vec<Event>,
    prices: PriceMap,
    rates: RateMap,
}

impl DataSet {
    pub fn new() -> Self {
        DataSet::default()
    }

    pub fn add_account(&mut self, account: Account) -> Arc<Account> {
        let account = Arc::new(account);
        self.accounts.insert(account.id, account.clone());
        account
    }

    pub fn add_account_category(&mut self, category: AccountCategory) -> Arc<AccountCategory> {
        let category = Arc::new(category);
        self.account_categories.insert(category.id, category.clone());
        category
    }

    pub fn add_security(&mut self, security: Security) -> Arc<Security> {
        let security = Arc::new(security);
        self.securities.insert(security.id, security.clone());
        security
    }

    pub fn add_portfolio(&mut self, portfolio: Portfolio) -> Arc<Portfolio> {
        let portfolio = Arc::new(portfolio);
        self.portfolios.insert(portfolio.id, portfolio.clone());
        portfolio
    }

    pub fn add_payee(&mut self, payee: Payee) -> Arc<Payee> {
        let payee = Arc::new(payee);
        self.payees.insert(payee.id, payee.clone());
        payee
    }

    pub fn add_category(&mut self, category: EventCategory) -> Arc<EventCategory> {
        let category = Arc::new(category);
        self.categories.insert(category.id, category.clone());
        category
    }

    /// Appends an event. Events must be added in non-decreasing date order.
    pub fn add_event(&mut self, event: Event) {
        debug_assert!(
            self.events.last().map_or(true, |e| e.date <= event.date),
            "events must be presented in non-decreasing date order"
        );
        self.events.push(event);
    }

    pub fn prices_mut(&mut self) -> &mut PriceMap {
        &mut self.prices
    }

    pub fn rates_mut(&mut self) -> &mut RateMap {
        &mut self.rates
    }

    // --- read access ---

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn prices(&self) -> &PriceMap {
        &self.prices
    }

    pub fn rates(&self) -> &RateMap {
        &self.rates
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Arc<Account>> {
        self.accounts.values()
    }

    pub fn account(&self, id: AccountId) -> Option<&Arc<Account>> {
        self.accounts.get(&id)
    }

    pub fn account_category(&self, id: AccountCategoryId) -> Option<&Arc<AccountCategory>> {
        self.account_categories.get(&id)
    }

    pub fn security(&self, id: SecurityId) -> Option<&Arc<Security>> {
        self.securities.get(&id)
    }

    pub fn portfolio(&self, id: PortfolioId) -> Option<&Arc<Portfolio>> {
        self.portfolios.get(&id)
    }

    pub fn payee(&self, id: PayeeId) -> Option<&Arc<Payee>> {
        self.payees.get(&id)
    }

    pub fn category(&self, id: EventCategoryId) -> Option<&Arc<EventCategory>> {
        self.categories.get(&id)
    }

    /// Finds an account by name; unknown names are a referential error.
    pub fn account_by_name(&self, name: &str) -> Result<&Arc<Account>> {
        self.accounts
            .values()
            .find(|a| a.name == name)
            .ok_or_else(|| AnalysisError::UnknownAccount(name.to_string()).into())
    }

    /// Finds a security by name; unknown names are a referential error.
    pub fn security_by_name(&self, name: &str) -> Result<&Arc<Security>> {
        self.securities
            .values()
            .find(|s| s.name == name)
            .ok_or_else(|| AnalysisError::UnknownSecurity(name.to_string()).into())
    }

    /// The range covered by the event stream, or a one-day range on
    /// `fallback` when there are no events.
    pub fn range(&self, fallback: NaiveDate) -> DateRange {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => DateRange::new(first.date, last.date),
            _ => DateRange::new(fallback, fallback),
        }
    }
}
