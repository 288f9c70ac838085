//! Tax domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TaxError};
use crate::events::{Event, EventId};

/// A life-bond gain taxed by dividing across qualifying years before
/// banding ("top slicing").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeableGain {
    pub event: EventId,
    pub date: NaiveDate,
    pub gain: Decimal,
    pub years: u32,
    /// gain / years
    pub slice: Decimal,
}

impl ChargeableGain {
    pub(crate) fn from_event(event: &Event) -> Result<Self> {
        let years = event.qualify_years.unwrap_or(1);
        if years == 0 {
            return Err(TaxError::ZeroQualifyingYears(event.date).into());
        }
        let gain = event.gross_income();
        Ok(ChargeableGain {
            event: event.id,
            date: event.date,
            gain,
            years,
            slice: gain / Decimal::from(years),
        })
    }
}

/// Allowances, band widths and rates for one tax year.
///
/// An explicit configuration registry, constructor-injected into the
/// calculator; lifecycle is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYearConfig {
    pub personal_allowance: Decimal,
    /// Gross income above which the allowance tapers away, one unit of
    /// allowance lost for every two of income
    pub allowance_taper_threshold: Decimal,
    /// Width of the basic-rate band
    pub basic_band: Decimal,
    pub basic_rate: Decimal,
    pub higher_rate: Decimal,
    pub dividend_basic_rate: Decimal,
    pub dividend_higher_rate: Decimal,
}

impl TaxYearConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.basic_band <= Decimal::ZERO {
            return Err(TaxError::IncompleteConfig("basic band must be positive".into()).into());
        }
        let rates = [
            self.basic_rate,
            self.higher_rate,
            self.dividend_basic_rate,
            self.dividend_higher_rate,
        ];
        if rates
            .iter()
            .any(|r| *r < Decimal::ZERO || *r > Decimal::ONE)
        {
            return Err(TaxError::IncompleteConfig("rates must lie in [0, 1]".into()).into());
        }
        Ok(())
    }
}
