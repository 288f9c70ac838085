//! Security domain models.

use serde::{Deserialize, Serialize};

/// Stable identity of a security.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SecurityId(pub u32);

/// Stable identity of a portfolio.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PortfolioId(pub u32);

/// A priced holding (share, unit trust, bond). Every security belongs to
/// exactly one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub id: SecurityId,
    pub name: String,
    pub portfolio: PortfolioId,
    /// Price alias: when set, price lookups use the aliased security's
    /// history instead. Indirection is single-level only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<SecurityId>,
}

impl Security {
    pub fn new(id: SecurityId, name: impl Into<String>, portfolio: PortfolioId) -> Self {
        Security {
            id,
            name: name.into(),
            portfolio,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: SecurityId) -> Self {
        self.alias = Some(alias);
        self
    }
}

/// A container of securities, rolled up as one unit into the account
/// category totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: PortfolioId,
    pub name: String,
}

impl Portfolio {
    pub fn new(id: PortfolioId, name: impl Into<String>) -> Self {
        Portfolio {
            id,
            name: name.into(),
        }
    }
}
