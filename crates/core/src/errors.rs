//! Core error types for the analysis engine.
//!
//! The engine is a pure in-memory transform, so there is no retry policy
//! anywhere: a failure during top-level construction is fatal to that
//! construction attempt and propagates to the caller.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analysis engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Price lookup failed: {0}")]
    Price(#[from] PriceError),

    #[error("Tax computation failed: {0}")]
    Tax(#[from] TaxError),
}

/// Referential failures raised while wiring events to reference data.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Account '{0}' not found")]
    UnknownAccount(String),

    #[error("Security '{0}' not found")]
    UnknownSecurity(String),

    #[error("Payee '{0}' not found")]
    UnknownPayee(String),

    #[error("Event category '{0}' not found")]
    UnknownCategory(String),

    #[error("Event {0} moves a security but carries no units")]
    MissingUnits(u64),
}

/// Validation errors for externally supplied textual data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),

    #[error("Dilution factor '{0}' is out of range (expected 0 < factor <= 1)")]
    DilutionRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised by the security price map.
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Alias chain for security id {0} is longer than one level")]
    AliasTooDeep(u32),
}

/// Errors raised by the tax-liability calculator.
#[derive(Error, Debug)]
pub enum TaxError {
    #[error("Tax year configuration is incomplete: {0}")]
    IncompleteConfig(String),

    #[error("Chargeable gain on {0} has zero qualifying years")]
    ZeroQualifyingYears(chrono::NaiveDate),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
