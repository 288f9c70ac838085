//! Security price histories.

mod prices_model;

pub use prices_model::*;
