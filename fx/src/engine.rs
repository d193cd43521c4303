//! Conversion arithmetic over a base-relative rate table.

use fxconv_common::RateTable;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Converts amounts between units of one rate table.
///
/// The table only stores rates against its base unit, so every conversion
/// goes through the base: divide by the source rate, then multiply by the
/// target rate. Output must stay bit-identical, so the operation order
/// (`amount * (1 / from) * to`) is fixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionEngine;

impl ConversionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Convert `amount` from `from` to `to`.
    pub fn convert(&self, amount: f64, from: &str, to: &str, table: &RateTable) -> FxResult<f64> {
        let from_rate = table
            .get(from)
            .ok_or_else(|| FxError::UnknownUnit(from.to_string()))?;
        let to_rate = table
            .get(to)
            .ok_or_else(|| FxError::UnknownUnit(to.to_string()))?;

        let converted = amount * (1.0 / from_rate) * to_rate;

        if !converted.is_finite() {
            return Err(FxError::UnknownUnit(format!(
                "{} -> {} produced a non-finite amount",
                from, to
            )));
        }

        debug!(amount, from, to, converted, "Converted amount");

        Ok(converted)
    }
}
