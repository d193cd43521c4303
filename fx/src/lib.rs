//! fxconv Conversion Core
//!
//! Stateful logic behind a currency conversion form.
//!
//! # Features
//!
//! - One-shot rate table fetch from a remote endpoint
//! - Form field store with amount clamping and live-table validation
//! - Conversion through the table's base unit
//! - Controller exposing a read-only view model and form commands
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fxconv_core::{ConversionFormController, ConverterConfig, HttpRateTableClient};
//!
//! let config = ConverterConfig::from_env();
//! let client = Arc::new(HttpRateTableClient::new(&config)?);
//! let mut controller = ConversionFormController::new(client, &config);
//!
//! controller.initialize().await?;
//! controller.set_field("amount", "10")?;
//! controller.set_field("toCurrency", "EUR")?;
//! let result = controller.submit()?;
//! ```

pub mod config;
pub mod controller;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod form;
pub mod provider;

pub use config::ConverterConfig;
pub use controller::{ControllerState, ConversionFormController, ViewModel};
pub use conversion::ConversionResult;
pub use engine::ConversionEngine;
pub use error::{FxError, FxResult};
pub use form::{FieldId, FieldValue, FormField, FormFieldStore, FormState, Validations};
pub use provider::{HttpRateTableClient, RateTableClient};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateTableClient;
