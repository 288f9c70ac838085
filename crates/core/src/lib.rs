//! Moneta Core - the analysis bucket engine.
//!
//! This crate turns a chronological stream of financial events plus
//! account/security reference data into date-sliced aggregate views:
//! account valuations, category totals, security valuations with cost
//! basis, and tax-basis rollups. It is a synchronous, in-memory batch
//! transform; persistence and presentation are external collaborators.

pub mod accounts;
pub mod analysis;
pub mod categories;
pub mod constants;
pub mod dataset;
pub mod dilution;
pub mod errors;
pub mod events;
pub mod payees;
pub mod prices;
pub mod rates;
pub mod securities;
pub mod tax;
pub mod utils;

// Re-export the aggregate root and its derivation machinery
pub use analysis::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
