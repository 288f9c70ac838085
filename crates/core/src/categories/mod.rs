//! Event category and tax basis master records.

mod categories_model;

pub use categories_model::*;

#[cfg(test)]
mod categories_model_tests;
