//! Payee domain models.

use serde::{Deserialize, Serialize};

/// Stable identity of a payee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PayeeId(pub u32);

/// The external party on the far side of an income or expense event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub id: PayeeId,
    pub name: String,
}

impl Payee {
    pub fn new(id: PayeeId, name: impl Into<String>) -> Self {
        Payee {
            id,
            name: name.into(),
        }
    }
}
