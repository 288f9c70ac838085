//! Account rate map.
//!
//! Each rate applies up to (and including) its end date; the open-ended
//! rate has no end date and applies from the last dated rate onwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::accounts::AccountId;

/// One rate with its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRate {
    pub rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Rate history per account.
#[derive(Debug, Clone, Default)]
pub struct RateMap {
    rates: HashMap<AccountId, Vec<AccountRate>>,
}

impl RateMap {
    pub fn new() -> Self {
        RateMap::default()
    }

    /// Records a rate, keeping the per-account list ordered by end date
    /// with the open-ended rate last.
    pub fn add_rate(&mut self, account: AccountId, rate: Decimal, end_date: Option<NaiveDate>) {
        let list = self.rates.entry(account).or_default();
        let entry = AccountRate { rate, end_date };
        let pos = match end_date {
            Some(date) => list
                .iter()
                .position(|r| r.end_date.map_or(true, |d| d > date))
                .unwrap_or(list.len()),
            None => list.len(),
        };
        list.insert(pos, entry);
    }

    /// The rate in force on `date`: the first rate whose end date is on or
    /// after it, falling back to the open-ended rate.
    pub fn rate_on(&self, account: AccountId, date: NaiveDate) -> Option<AccountRate> {
        let list = self.rates.get(&account)?;
        list.iter()
            .find(|r| r.end_date.map_or(true, |d| d >= date))
            .copied()
    }
}
