//! Account master records.

mod accounts_model;

pub use accounts_model::*;

#[cfg(test)]
mod accounts_model_tests;
