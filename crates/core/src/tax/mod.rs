//! Tax year configuration and the banded liability calculator.

mod tax_model;
mod tax_service;

pub use tax_model::*;
pub use tax_service::*;
