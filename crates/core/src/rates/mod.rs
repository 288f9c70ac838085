//! Account rate histories.

mod rates_model;

pub use rates_model::*;
