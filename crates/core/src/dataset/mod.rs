//! The loaded dataset the engine analyses.

mod dataset_model;

pub use dataset_model::*;
