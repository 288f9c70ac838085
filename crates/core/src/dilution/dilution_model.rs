//! Dilution factors.
//!
//! A rights issue or split changes what one historical unit is worth.
//! The correction factor for a historical price query is the product of
//! the factors of every dilution event dated after the query date; a
//! query after the last dilution needs no correction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::securities::SecurityId;

/// A validated dilution factor in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Dilution(Decimal);

impl Dilution {
    pub fn new(factor: Decimal) -> Result<Self> {
        if factor <= Decimal::ZERO || factor > Decimal::ONE {
            return Err(ValidationError::DilutionRange(factor.to_string()).into());
        }
        Ok(Dilution(factor))
    }

    pub fn factor(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Dilution {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let factor =
            Decimal::from_str(text.trim()).map_err(ValidationError::DecimalParse)?;
        Dilution::new(factor)
    }
}

impl TryFrom<Decimal> for Dilution {
    type Error = Error;

    fn try_from(factor: Decimal) -> Result<Self> {
        Dilution::new(factor)
    }
}

impl From<Dilution> for Decimal {
    fn from(dilution: Dilution) -> Decimal {
        dilution.0
    }
}

impl fmt::Display for Dilution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded dilution event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DilutionEvent {
    pub security: SecurityId,
    pub date: NaiveDate,
    pub dilution: Dilution,
}

/// Dilution events per security, date-ordered.
#[derive(Debug, Clone, Default)]
pub struct DilutionMap {
    events: HashMap<SecurityId, Vec<DilutionEvent>>,
}

impl DilutionMap {
    pub fn new() -> Self {
        DilutionMap::default()
    }

    pub fn add_dilution(&mut self, security: SecurityId, date: NaiveDate, dilution: Dilution) {
        let list = self.events.entry(security).or_default();
        let pos = list
            .iter()
            .position(|e| e.date > date)
            .unwrap_or(list.len());
        list.insert(
            pos,
            DilutionEvent {
                security,
                date,
                dilution,
            },
        );
    }

    /// Parses and records a dilution factor supplied as text.
    pub fn add_dilution_text(
        &mut self,
        security: SecurityId,
        date: NaiveDate,
        text: &str,
    ) -> Result<()> {
        let dilution: Dilution = text.parse()?;
        self.add_dilution(security, date, dilution);
        Ok(())
    }

    /// The compounded correction factor for a price query on `date`:
    /// the product of every strictly later dilution, or `None` when no
    /// later dilution applies.
    pub fn dilution_on(&self, security: SecurityId, date: NaiveDate) -> Option<Decimal> {
        let list = self.events.get(&security)?;
        let mut factor = Decimal::ONE;
        let mut applied = false;
        for event in list.iter().filter(|e| e.date > date) {
            factor *= event.dilution.factor();
            applied = true;
        }
        applied.then_some(factor)
    }

    pub fn has_dilution(&self, security: SecurityId) -> bool {
        self.events.get(&security).is_some_and(|l| !l.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(|l| l.is_empty())
    }
}
