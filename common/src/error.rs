//! Error types for rate table construction.

use thiserror::Error;

/// Reasons a set of raw rates cannot become a [`crate::RateTable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateTableError {
    /// The source listed no rates at all.
    #[error("Rate table is empty")]
    Empty,

    /// A unit code was blank.
    #[error("Rate table contains an empty unit code")]
    EmptyCode,

    /// A rate was zero, negative, or not a finite number.
    #[error("Invalid rate {rate} for {code}")]
    InvalidRate { code: String, rate: f64 },
}

impl RateTableError {
    /// Get error code for host-facing messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            RateTableError::Empty => "EMPTY_RATE_TABLE",
            RateTableError::EmptyCode => "EMPTY_UNIT_CODE",
            RateTableError::InvalidRate { .. } => "INVALID_RATE",
        }
    }
}
