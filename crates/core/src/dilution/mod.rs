//! Dilution factors and the dilution event map.

mod dilution_model;

pub use dilution_model::*;
