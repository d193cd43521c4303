//! Converter configuration.

use std::time::Duration;

/// Default remote rate source (USD based).
pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Configuration for the conversion core.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Endpoint returning `{ "rates": { code: rate } }`.
    pub rates_url: String,
    /// Request timeout for the rate fetch.
    pub request_timeout: Duration,
    /// Smallest accepted amount.
    pub amount_min: f64,
    /// Largest accepted amount.
    pub amount_max: f64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            rates_url: DEFAULT_RATES_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            amount_min: 1.0,
            amount_max: 10_000.0,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FXCONV_RATES_URL") {
            config.rates_url = url;
        }

        if let Ok(secs) = std::env::var("FXCONV_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.rates_url.is_empty() {
            return Err("Rates URL cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        if self.amount_min.is_nan() || self.amount_min <= 0.0 || !self.amount_max.is_finite() {
            return Err("Amount bounds must be positive and finite".to_string());
        }

        if self.amount_min > self.amount_max {
            return Err("Minimum amount cannot exceed maximum amount".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.amount_min, 1.0);
        assert_eq!(config.amount_max, 10_000.0);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ConverterConfig::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.amount_min = 20_000.0;
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.rates_url.clear();
        assert!(config.validate().is_err());
    }
}
