//! Event domain models.
//!
//! Events are supplied by the data layer already sorted by date; the
//! engine consumes them read-only in one linear scan.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;
use crate::categories::EventCategoryId;
use crate::dilution::Dilution;
use crate::payees::PayeeId;
use crate::securities::SecurityId;

/// Stable identity of an event. Snapshot stores key off this.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EventId(pub u64);

/// Either side of an event: the asset debited or credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetRef {
    Account(AccountId),
    Security(SecurityId),
    Payee(PayeeId),
}

impl AssetRef {
    pub fn as_account(&self) -> Option<AccountId> {
        match self {
            AssetRef::Account(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_security(&self) -> Option<SecurityId> {
        match self {
            AssetRef::Security(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_payee(&self) -> Option<PayeeId> {
        match self {
            AssetRef::Payee(id) => Some(*id),
            _ => None,
        }
    }
}

/// One categorized monetary event.
///
/// The side-amounts are independently nullable; absent means the event
/// simply never carried that amount, which is distinct from an explicit
/// zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub debit: AssetRef,
    pub credit: AssetRef,
    pub category: EventCategoryId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_credit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_insurance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deemed_benefit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charity_donation: Option<Decimal>,
    /// Units removed from the debited security
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_units: Option<Decimal>,
    /// Units added to the credited security
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_units: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dilution: Option<Dilution>,
    /// Qualifying years for chargeable-gain slicing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualify_years: Option<u32>,
}

impl Event {
    pub fn new(
        id: EventId,
        date: NaiveDate,
        amount: Decimal,
        debit: AssetRef,
        credit: AssetRef,
        category: EventCategoryId,
    ) -> Self {
        Event {
            id,
            date,
            amount,
            debit,
            credit,
            category,
            tax_credit: None,
            nat_insurance: None,
            deemed_benefit: None,
            charity_donation: None,
            debit_units: None,
            credit_units: None,
            dilution: None,
            qualify_years: None,
        }
    }

    pub fn with_tax_credit(mut self, credit: Decimal) -> Self {
        self.tax_credit = Some(credit);
        self
    }

    pub fn with_nat_insurance(mut self, amount: Decimal) -> Self {
        self.nat_insurance = Some(amount);
        self
    }

    pub fn with_deemed_benefit(mut self, amount: Decimal) -> Self {
        self.deemed_benefit = Some(amount);
        self
    }

    pub fn with_charity_donation(mut self, amount: Decimal) -> Self {
        self.charity_donation = Some(amount);
        self
    }

    pub fn with_debit_units(mut self, units: Decimal) -> Self {
        self.debit_units = Some(units);
        self
    }

    pub fn with_credit_units(mut self, units: Decimal) -> Self {
        self.credit_units = Some(units);
        self
    }

    pub fn with_dilution(mut self, dilution: Dilution) -> Self {
        self.dilution = Some(dilution);
        self
    }

    pub fn with_qualify_years(mut self, years: u32) -> Self {
        self.qualify_years = Some(years);
        self
    }

    /// The gross income this event represents: the amount plus every
    /// withheld side-amount that never reached the credited account.
    pub fn gross_income(&self) -> Decimal {
        self.amount
            + self.tax_credit.unwrap_or_default()
            + self.nat_insurance.unwrap_or_default()
            + self.deemed_benefit.unwrap_or_default()
    }
}
