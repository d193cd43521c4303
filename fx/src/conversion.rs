//! Conversion result snapshot.

use fxconv_common::Currency;
use serde::Serialize;

/// The last successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Input amount.
    pub amount: f64,
    /// Source unit code.
    pub from: String,
    /// Target unit code.
    pub to: String,
    /// Amount expressed in the target unit.
    pub converted_amount: f64,
}

impl ConversionResult {
    /// Create a new conversion snapshot.
    pub fn new(
        amount: f64,
        from: impl Into<String>,
        to: impl Into<String>,
        converted_amount: f64,
    ) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
            converted_amount,
        }
    }

    /// The value held before any submission.
    pub fn empty() -> Self {
        Self::new(0.0, "", "", 0.0)
    }

    /// Whether there is anything worth displaying.
    pub fn is_displayable(&self) -> bool {
        self.converted_amount > 0.0
    }

    /// One-line summary such as `10 USD = 9 EUR`.
    ///
    /// The converted figure is rounded to the target unit's precision.
    /// Returns `None` until a positive conversion exists.
    pub fn summary(&self) -> Option<String> {
        if !self.is_displayable() {
            return None;
        }

        let converted = Currency::new(self.to.as_str())
            .round_for_display(self.converted_amount)
            .map(|d| d.to_string())
            .unwrap_or_else(|| self.converted_amount.to_string());

        Some(format!(
            "{} {} = {} {}",
            self.amount, self.from, converted, self.to
        ))
    }
}

impl Default for ConversionResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_has_no_summary() {
        let result = ConversionResult::default();

        assert_eq!(result, ConversionResult::new(0.0, "", "", 0.0));
        assert!(!result.is_displayable());
        assert_eq!(result.summary(), None);
    }

    #[test]
    fn test_summary_rounds_to_target_precision() {
        let result = ConversionResult::new(10.0, "USD", "EUR", 9.0);
        assert_eq!(result.summary().unwrap(), "10 USD = 9 EUR");

        let result = ConversionResult::new(3.0, "EUR", "USD", 3.0 / 0.9);
        assert_eq!(result.summary().unwrap(), "3 EUR = 3.33 USD");

        let result = ConversionResult::new(2.5, "USD", "JPY", 375.4);
        assert_eq!(result.summary().unwrap(), "2.5 USD = 375 JPY");
    }

    #[test]
    fn test_serializes_with_presentation_names() {
        let result = ConversionResult::new(10.0, "USD", "EUR", 9.0);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["convertedAmount"], 9.0);
        assert_eq!(json["from"], "USD");
    }
}
