//! Event (transaction) records.

mod events_model;

pub use events_model::*;

#[cfg(test)]
mod events_model_tests;
