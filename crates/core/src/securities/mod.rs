//! Security and portfolio master records.

mod securities_model;

pub use securities_model::*;
