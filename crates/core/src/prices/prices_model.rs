//! Security price map.
//!
//! Prices are held per security as a date-ordered list. The query the
//! engine needs is "the price in force on a date": the latest price
//! dated at or before it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{PriceError, Result};
use crate::securities::SecurityId;
use crate::utils::DateRange;

/// One dated price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPrice {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Price history per security, with single-level alias indirection.
#[derive(Debug, Clone, Default)]
pub struct PriceMap {
    prices: HashMap<SecurityId, Vec<SecurityPrice>>,
    aliases: HashMap<SecurityId, SecurityId>,
}

impl PriceMap {
    pub fn new() -> Self {
        PriceMap::default()
    }

    /// Records a price, keeping the per-security list date-ordered.
    /// A second price on the same date replaces the first.
    pub fn add_price(&mut self, security: SecurityId, date: NaiveDate, price: Decimal) {
        let list = self.prices.entry(security).or_default();
        match list.binary_search_by_key(&date, |p| p.date) {
            Ok(pos) => list[pos].price = price,
            Err(pos) => list.insert(pos, SecurityPrice { date, price }),
        }
    }

    /// Declares `security` to price off `target`'s history. Indirection is
    /// single-level: aliasing to a security that is itself aliased is
    /// rejected.
    pub fn set_alias(&mut self, security: SecurityId, target: SecurityId) -> Result<()> {
        if self.aliases.contains_key(&target) {
            return Err(PriceError::AliasTooDeep(security.0).into());
        }
        self.aliases.insert(security, target);
        Ok(())
    }

    fn resolve(&self, security: SecurityId) -> SecurityId {
        self.aliases.get(&security).copied().unwrap_or(security)
    }

    /// The latest price dated at or before `date`, or `None` when the
    /// security had no price yet.
    pub fn price_on(&self, security: SecurityId, date: NaiveDate) -> Option<Decimal> {
        let list = self.prices.get(&self.resolve(security))?;
        match list.binary_search_by_key(&date, |p| p.date) {
            Ok(pos) => Some(list[pos].price),
            Err(0) => None,
            Err(pos) => Some(list[pos - 1].price),
        }
    }

    /// The prices in force at the start and end of `range`.
    pub fn prices_in_range(
        &self,
        security: SecurityId,
        range: &DateRange,
    ) -> (Option<Decimal>, Option<Decimal>) {
        (
            self.price_on(security, range.start()),
            self.price_on(security, range.end()),
        )
    }

    pub fn has_prices(&self, security: SecurityId) -> bool {
        self.prices.contains_key(&self.resolve(security))
    }
}
