//! Payee master records.

mod payees_model;

pub use payees_model::*;
