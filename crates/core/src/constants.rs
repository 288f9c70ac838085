//! Engine-wide constants.

/// Decimal precision for reported money values
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Display name of the distinguished totals bucket in every rollup list
pub const TOTALS_BUCKET_NAME: &str = "Totals";
