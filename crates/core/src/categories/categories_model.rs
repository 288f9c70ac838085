//! Event category domain models.
//!
//! The category class is the closed set of behaviours an event can have:
//! it decides whether the flow is income or expense, how side-amounts
//! fold into the gross figure, and which tax basis the flow lands in.

use serde::{Deserialize, Serialize};

/// Stable identity of an event category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EventCategoryId(pub u32);

/// Behavioural class of an event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryClass {
    /// Employment income, grossed up by tax credit, national insurance
    /// and deemed benefit
    TaxedIncome,
    /// Interest on deposits, grossed up by tax credit
    Interest,
    /// Dividend income, grossed up by tax credit
    Dividend,
    /// Rental income
    RentalIncome,
    /// Income outside every tax basis
    TaxFreeIncome,
    /// Life-bond gain, sliced across qualifying years for taxation
    ChargeableGain,
    /// Ordinary spending
    Expense,
    /// Movement between two accounts, neither income nor expense
    Transfer,
    /// Purchase of security units
    StockPurchase,
    /// Sale of security units
    StockSale,
    /// Units adjustment with no cash movement
    StockSplit,
    /// Rights issue taken up; carries a dilution factor
    StockRightsTaken,
}

impl CategoryClass {
    /// True when events of this class book income on the payee/category side.
    pub fn is_income(&self) -> bool {
        matches!(
            self,
            CategoryClass::TaxedIncome
                | CategoryClass::Interest
                | CategoryClass::Dividend
                | CategoryClass::RentalIncome
                | CategoryClass::TaxFreeIncome
                | CategoryClass::ChargeableGain
        )
    }

    /// True when events of this class book expense on the payee/category side.
    pub fn is_expense(&self) -> bool {
        matches!(self, CategoryClass::Expense)
    }

    /// True when events of this class move security units.
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            CategoryClass::StockPurchase
                | CategoryClass::StockSale
                | CategoryClass::StockSplit
                | CategoryClass::StockRightsTaken
        )
    }

    /// The tax basis that flows of this class accumulate into.
    pub fn tax_basis(&self) -> TaxBasisClass {
        match self {
            CategoryClass::TaxedIncome => TaxBasisClass::GrossSalary,
            CategoryClass::Interest => TaxBasisClass::GrossInterest,
            CategoryClass::Dividend => TaxBasisClass::GrossDividend,
            CategoryClass::RentalIncome => TaxBasisClass::GrossRental,
            CategoryClass::ChargeableGain => TaxBasisClass::TaxableGains,
            CategoryClass::TaxFreeIncome => TaxBasisClass::TaxFree,
            CategoryClass::Expense => TaxBasisClass::Expense,
            CategoryClass::Transfer
            | CategoryClass::StockPurchase
            | CategoryClass::StockSale
            | CategoryClass::StockSplit
            | CategoryClass::StockRightsTaken => TaxBasisClass::Untaxed,
        }
    }
}

/// A user-visible transaction category. Categories form a single-parent
/// hierarchy used by the totals rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCategory {
    pub id: EventCategoryId,
    pub name: String,
    pub class: CategoryClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<EventCategoryId>,
}

impl EventCategory {
    pub fn new(id: EventCategoryId, name: impl Into<String>, class: CategoryClass) -> Self {
        EventCategory {
            id,
            name: name.into(),
            class,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: EventCategoryId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Tax bases: the jurisdictional pigeonholes that categorized flows are
/// rolled into before the banded liability computation runs. A closed
/// enum rather than a master record; the discriminant order is the list
/// ordering key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxBasisClass {
    GrossSalary,
    GrossInterest,
    GrossDividend,
    GrossRental,
    TaxableGains,
    TaxFree,
    Expense,
    /// Flows that never reach the tax computation (transfers, unit moves)
    Untaxed,
}

impl TaxBasisClass {
    /// Bases that contribute to gross taxable income.
    pub fn is_taxable_income(&self) -> bool {
        matches!(
            self,
            TaxBasisClass::GrossSalary
                | TaxBasisClass::GrossInterest
                | TaxBasisClass::GrossDividend
                | TaxBasisClass::GrossRental
        )
    }
}
