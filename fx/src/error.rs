//! Conversion core error types.

use fxconv_common::RateTableError;
use thiserror::Error;

use crate::controller::ControllerState;
use crate::form::FieldId;

/// Errors that can occur in the conversion core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// Rate table could not be fetched or decoded.
    #[error("Network error: {0}")]
    Network(String),

    /// Submit attempted while some fields are invalid.
    #[error("Invalid fields: {}", format_fields(.fields))]
    Validation { fields: Vec<FieldId> },

    /// Unit code not present in the rate table.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Field name not part of the form.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Command issued in the wrong controller state.
    #[error("Invalid state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: ControllerState,
        actual: ControllerState,
    },
}

impl FxError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::Network(_))
    }

    /// Get error code for presentation.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Network(_) => "NETWORK_ERROR",
            FxError::Validation { .. } => "VALIDATION_ERROR",
            FxError::UnknownUnit(_) => "UNKNOWN_UNIT",
            FxError::UnknownField(_) => "UNKNOWN_FIELD",
            FxError::InvalidState { .. } => "INVALID_STATE",
        }
    }
}

impl From<RateTableError> for FxError {
    fn from(err: RateTableError) -> Self {
        FxError::Network(format!("malformed rate table: {}", err))
    }
}

impl From<reqwest::Error> for FxError {
    fn from(err: reqwest::Error) -> Self {
        FxError::Network(err.to_string())
    }
}

fn format_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(FieldId::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for conversion core operations.
pub type FxResult<T> = Result<T, FxError>;
