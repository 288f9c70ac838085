//! Account domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable identity of an account. Doubles as the ordering key for
/// account bucket lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AccountId(pub u32);

/// Stable identity of an account category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AccountCategoryId(pub u32);

/// A money account (current, savings, loan, credit card).
///
/// Securities are deliberately not accounts here; they live in their own
/// master list and are referenced through holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub category: AccountCategoryId,
    /// Capital present before the analysed history starts. Treated as
    /// pre-existing capital, never as period income.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
    pub closed: bool,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, category: AccountCategoryId) -> Self {
        Account {
            id,
            name: name.into(),
            category,
            opening_balance: None,
            closed: false,
        }
    }

    pub fn with_opening_balance(mut self, balance: Decimal) -> Self {
        self.opening_balance = Some(balance);
        self
    }
}

/// Grouping node for accounts. Categories form a single-parent hierarchy;
/// the root of a rollup tree is the distinguished totals bucket, not a
/// category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCategory {
    pub id: AccountCategoryId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<AccountCategoryId>,
}

impl AccountCategory {
    pub fn new(id: AccountCategoryId, name: impl Into<String>) -> Self {
        AccountCategory {
            id,
            name: name.into(),
            parent: None,
        }
    }
}
