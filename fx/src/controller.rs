//! Conversion form controller.
//!
//! Owns the session rate table, the form snapshot and the last conversion.
//! Presentation reads [`ViewModel`] and forwards user actions through
//! [`ConversionFormController::set_field`] and
//! [`ConversionFormController::submit`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fxconv_common::{Currency, RateTable};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ConverterConfig;
use crate::conversion::ConversionResult;
use crate::engine::ConversionEngine;
use crate::error::{FxError, FxResult};
use crate::form::{FieldId, FormFieldStore, FormState};
use crate::provider::RateTableClient;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    /// No rate table yet. Edits and submits are rejected.
    Loading,
    /// Rate table loaded; the form is live.
    Ready,
}

impl ControllerState {
    /// Check if the controller is accepting form commands.
    pub fn accepts_commands(&self) -> bool {
        matches!(self, ControllerState::Ready)
    }
}

/// Read-only view consumed by presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub loading: bool,
    pub error_message: Option<String>,
    pub fields: FormState,
    pub last_conversion: ConversionResult,
    /// Unit codes for the selectors, in table order.
    pub units: Vec<String>,
    pub rates_fetched_at: Option<DateTime<Utc>>,
}

/// Orchestrates rate loading, form edits and conversion.
pub struct ConversionFormController {
    client: Arc<dyn RateTableClient>,
    engine: ConversionEngine,
    store: FormFieldStore,
    rate_table: Option<RateTable>,
    state: ControllerState,
    error_message: Option<String>,
    last_conversion: ConversionResult,
}

impl ConversionFormController {
    /// Create a controller in the `Loading` state with placeholder fields.
    pub fn new(client: Arc<dyn RateTableClient>, config: &ConverterConfig) -> Self {
        Self {
            client,
            engine: ConversionEngine::new(),
            store: FormFieldStore::new(config),
            rate_table: None,
            state: ControllerState::Loading,
            error_message: None,
            last_conversion: ConversionResult::empty(),
        }
    }

    /// Fetch the rate table and make the form live.
    ///
    /// On failure the error is recorded for presentation and returned. A
    /// controller that never loaded a table stays `Loading` with placeholder
    /// fields; one that did keeps its previous table. Calling this again
    /// reloads: the new table replaces the old one wholesale.
    #[instrument(skip(self), fields(client = self.client.name()))]
    pub async fn initialize(&mut self) -> FxResult<()> {
        let table = match self.client.fetch().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, state = ?self.state, "Rate table unavailable");
                if self.rate_table.is_none() {
                    self.store.reset();
                }
                self.error_message = Some(e.to_string());
                return Err(e);
            }
        };

        let fields = self.store.seed_selections(&table);
        info!(
            units = table.len(),
            from = fields.selection(FieldId::FromCurrency),
            to = fields.selection(FieldId::ToCurrency),
            "Rate table loaded"
        );

        self.rate_table = Some(table);
        self.state = ControllerState::Ready;
        self.error_message = None;

        Ok(())
    }

    /// Apply raw input to the field named `field_id`.
    #[instrument(skip(self))]
    pub fn set_field(&mut self, field_id: &str, raw: &str) -> FxResult<FormState> {
        let result = self
            .ready_parts()
            .and_then(|(store, table)| store.set_value_named(field_id, raw, table));
        self.settle(result)
    }

    /// Typed variant of [`set_field`](Self::set_field).
    pub fn set(&mut self, id: FieldId, raw: &str) -> FxResult<FormState> {
        let result = self
            .ready_parts()
            .map(|(store, table)| store.set_value(id, raw, table));
        self.settle(result)
    }

    /// Convert the current form values.
    ///
    /// Every field is re-validated against the live table first. If any is
    /// invalid the fields are flagged and `last_conversion` is left untouched.
    #[instrument(skip(self))]
    pub fn submit(&mut self) -> FxResult<ConversionResult> {
        let result = self.try_submit();
        if let Ok(conversion) = &result {
            self.last_conversion = conversion.clone();
            info!(
                amount = conversion.amount,
                from = %conversion.from,
                to = %conversion.to,
                converted = conversion.converted_amount,
                "Conversion completed"
            );
        }
        self.settle(result)
    }

    fn try_submit(&mut self) -> FxResult<ConversionResult> {
        let engine = self.engine;
        let (store, table) = self.ready_parts()?;

        let fields = store.refresh(table);
        let invalid = fields.invalid_fields(table);
        if !invalid.is_empty() {
            return Err(FxError::Validation { fields: invalid });
        }

        let amount = fields.amount().ok_or(FxError::Validation {
            fields: vec![FieldId::Amount],
        })?;
        let from = fields.selection(FieldId::FromCurrency);
        let to = fields.selection(FieldId::ToCurrency);

        let converted = engine.convert(amount, from, to, table)?;

        Ok(ConversionResult::new(amount, from, to, converted))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ControllerState::Loading
    }

    /// Current form snapshot.
    pub fn fields(&self) -> &FormState {
        self.store.state()
    }

    pub fn last_conversion(&self) -> &ConversionResult {
        &self.last_conversion
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The loaded rate table, if any.
    pub fn rate_table(&self) -> Option<&RateTable> {
        self.rate_table.as_ref()
    }

    /// Unit codes available for selection, in table order.
    pub fn available_units(&self) -> &[Currency] {
        self.rate_table.as_ref().map(RateTable::codes).unwrap_or_default()
    }

    /// Snapshot of everything presentation needs.
    pub fn view(&self) -> ViewModel {
        ViewModel {
            loading: self.is_loading(),
            error_message: self.error_message.clone(),
            fields: self.store.state().clone(),
            last_conversion: self.last_conversion.clone(),
            units: self
                .available_units()
                .iter()
                .map(|c| c.code().to_string())
                .collect(),
            rates_fetched_at: self.rate_table.as_ref().map(RateTable::fetched_at),
        }
    }

    /// Form store and live table, available only once `Ready`.
    fn ready_parts(&mut self) -> FxResult<(&mut FormFieldStore, &RateTable)> {
        match (self.state, &self.rate_table) {
            (state, Some(table)) if state.accepts_commands() => Ok((&mut self.store, table)),
            (actual, _) => Err(FxError::InvalidState {
                expected: ControllerState::Ready,
                actual,
            }),
        }
    }

    /// Record the outcome of a form command for presentation.
    ///
    /// Commands rejected while loading leave the fetch error in place.
    fn settle<T>(&mut self, result: FxResult<T>) -> FxResult<T> {
        match &result {
            Ok(_) => self.error_message = None,
            Err(e @ FxError::InvalidState { .. }) => {
                debug!(error = %e, "Command rejected");
            }
            Err(e) => {
                warn!(code = e.error_code(), error = %e, "Command failed");
                self.error_message = Some(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldValue;
    use crate::provider::MockRateTableClient;

    fn table() -> RateTable {
        RateTable::from_rates([("USD", 1.0), ("EUR", 0.9), ("JPY", 150.0)]).unwrap()
    }

    fn controller_with(client: Arc<MockRateTableClient>) -> ConversionFormController {
        ConversionFormController::new(client, &ConverterConfig::default())
    }

    async fn ready_controller() -> ConversionFormController {
        let mut controller = controller_with(Arc::new(MockRateTableClient::with_table(table())));
        controller.initialize().await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_initialize_seeds_defaults() {
        let client = Arc::new(MockRateTableClient::with_table(table()));
        let mut controller = controller_with(client.clone());
        assert!(controller.is_loading());

        controller.initialize().await.unwrap();

        assert_eq!(controller.state(), ControllerState::Ready);
        assert_eq!(client.calls(), 1);
        let view = controller.view();
        assert!(!view.loading);
        assert_eq!(view.error_message, None);
        assert_eq!(view.units, vec!["USD", "EUR", "JPY"]);
        assert_eq!(view.fields.selection(FieldId::FromCurrency), "USD");
        assert_eq!(view.fields.selection(FieldId::ToCurrency), "EUR");
        assert_eq!(view.fields.amount(), Some(1.0));
        assert_eq!(view.last_conversion, ConversionResult::empty());
        assert!(view.rates_fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_initialize_failure_stays_loading() {
        let mut controller = controller_with(Arc::new(MockRateTableClient::failing("timed out")));

        let err = controller.initialize().await.unwrap_err();

        assert!(matches!(err, FxError::Network(_)));
        let view = controller.view();
        assert!(view.loading);
        assert_eq!(view.error_message.as_deref(), Some("Network error: timed out"));
        assert_eq!(view.fields, FormState::placeholder(&ConverterConfig::default()));
        assert!(view.units.is_empty());
        assert_eq!(view.last_conversion, ConversionResult::empty());
    }

    #[tokio::test]
    async fn test_commands_rejected_while_loading() {
        let mut controller = controller_with(Arc::new(MockRateTableClient::failing("offline")));
        let _ = controller.initialize().await;

        let err = controller.set_field("amount", "50").unwrap_err();
        assert_eq!(
            err,
            FxError::InvalidState {
                expected: ControllerState::Ready,
                actual: ControllerState::Loading,
            }
        );
        assert!(matches!(controller.submit(), Err(FxError::InvalidState { .. })));

        assert_eq!(controller.fields().amount(), Some(1.0));
        assert_eq!(controller.error_message(), Some("Network error: offline"));
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let client = Arc::new(MockRateTableClient::failing("offline"));
        let mut controller = controller_with(client.clone());
        assert!(controller.initialize().await.is_err());

        client.set_table(table());
        controller.initialize().await.unwrap();

        assert_eq!(controller.state(), ControllerState::Ready);
        assert_eq!(controller.error_message(), None);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_usd_to_eur() {
        let mut controller = ready_controller().await;

        controller.set_field("amount", "10").unwrap();
        controller.set_field("fromCurrency", "USD").unwrap();
        controller.set_field("toCurrency", "EUR").unwrap();
        let result = controller.submit().unwrap();

        assert_eq!(result, ConversionResult::new(10.0, "USD", "EUR", 9.0));
        assert_eq!(controller.last_conversion(), &result);
        assert_eq!(result.summary().as_deref(), Some("10 USD = 9 EUR"));
    }

    #[tokio::test]
    async fn test_end_to_end_jpy_to_usd() {
        let mut controller = ready_controller().await;

        controller.set(FieldId::Amount, "150").unwrap();
        controller.set(FieldId::FromCurrency, "JPY").unwrap();
        controller.set(FieldId::ToCurrency, "USD").unwrap();
        let result = controller.submit().unwrap();

        assert_eq!(result.converted_amount, 1.0);
    }

    #[tokio::test]
    async fn test_invalid_submit_keeps_last_conversion() {
        let mut controller = ready_controller().await;
        controller.set_field("amount", "10").unwrap();
        let first = controller.submit().unwrap();

        controller.set_field("toCurrency", "XXX").unwrap();
        controller.set_field("amount", "oops").unwrap();
        let err = controller.submit().unwrap_err();

        assert_eq!(
            err,
            FxError::Validation {
                fields: vec![FieldId::Amount, FieldId::ToCurrency]
            }
        );
        assert_eq!(controller.last_conversion(), &first);

        let view = controller.view();
        assert!(view.fields.field(FieldId::Amount).error);
        assert!(view.fields.field(FieldId::ToCurrency).error);
        assert!(!view.fields.field(FieldId::FromCurrency).error);
        assert_eq!(
            view.error_message.as_deref(),
            Some("Invalid fields: amount, toCurrency")
        );
    }

    #[tokio::test]
    async fn test_submit_overwrites_result() {
        let mut controller = ready_controller().await;
        controller.set_field("amount", "10").unwrap();
        controller.submit().unwrap();

        controller.set_field("fromCurrency", "EUR").unwrap();
        controller.set_field("toCurrency", "JPY").unwrap();
        controller.set_field("amount", "0.5").unwrap();
        let result = controller.submit().unwrap();

        assert_eq!(result.amount, 1.0);
        assert_eq!(result.from, "EUR");
        assert_eq!(result.to, "JPY");
        assert_eq!(result.converted_amount, 1.0 * (1.0 / 0.9) * 150.0);
        assert_eq!(controller.last_conversion(), &result);
    }

    #[tokio::test]
    async fn test_unknown_field_is_reported() {
        let mut controller = ready_controller().await;
        let before = controller.fields().clone();

        let err = controller.set_field("rate", "2").unwrap_err();

        assert_eq!(err, FxError::UnknownField("rate".to_string()));
        assert_eq!(controller.fields(), &before);
        assert_eq!(controller.error_message(), Some("Unknown field: rate"));
    }

    #[tokio::test]
    async fn test_amount_clamped_through_controller() {
        let mut controller = ready_controller().await;

        let state = controller.set_field("amount", "99999").unwrap();
        assert_eq!(state.field(FieldId::Amount).value, FieldValue::Number(10_000.0));

        let state = controller.set_field("amount", "-3").unwrap();
        assert_eq!(state.field(FieldId::Amount).value, FieldValue::Number(1.0));
    }

    #[tokio::test]
    async fn test_reload_replaces_table() {
        let client = Arc::new(MockRateTableClient::with_table(table()));
        let mut controller = controller_with(client.clone());
        controller.initialize().await.unwrap();
        controller.set_field("toCurrency", "JPY").unwrap();

        client.set_table(RateTable::from_rates([("EUR", 1.0), ("USD", 1.1)]).unwrap());
        controller.initialize().await.unwrap();

        let view = controller.view();
        assert_eq!(view.units, vec!["EUR", "USD"]);
        assert_eq!(view.fields.selection(FieldId::FromCurrency), "USD");
        assert_eq!(view.fields.selection(FieldId::ToCurrency), "USD");
        assert!(!view.fields.has_errors());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_table() {
        let client = Arc::new(MockRateTableClient::with_table(table()));
        let mut controller = controller_with(client.clone());
        controller.initialize().await.unwrap();
        controller.set_field("amount", "20").unwrap();

        client.set_failure("502 Bad Gateway");
        assert!(controller.initialize().await.is_err());

        assert_eq!(controller.state(), ControllerState::Ready);
        assert_eq!(controller.rate_table().map(RateTable::len), Some(3));
        assert_eq!(controller.fields().amount(), Some(20.0));
        assert!(controller.error_message().is_some());
        assert!(controller.submit().is_ok());
    }
}
