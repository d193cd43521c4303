//! Form field state, input policy and validation.
//!
//! The form is an immutable [`FormState`] snapshot. Every edit builds a new
//! snapshot, so callers can compare states with `==` and keep old ones around
//! for undo or replay. Validity is always computed from `(field, rate table)`
//! and never cached across table reloads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use fxconv_common::RateTable;
use serde::Serialize;
use tracing::debug;

use crate::config::ConverterConfig;
use crate::error::{FxError, FxResult};

/// Value stored when an amount falls below its minimum.
///
/// Under-range input is treated as empty rather than as "just below min", so
/// it resets to this fixed value instead of clamping to `min`.
pub const UNDER_RANGE_FALLBACK: f64 = 1.0;

/// Identifier of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Amount,
    FromCurrency,
    ToCurrency,
}

impl FieldId {
    /// Every field of the form, in display order.
    pub const ALL: [FieldId; 3] = [FieldId::Amount, FieldId::FromCurrency, FieldId::ToCurrency];

    /// Wire name used by presentation.
    pub fn name(&self) -> &'static str {
        match self {
            FieldId::Amount => "amount",
            FieldId::FromCurrency => "fromCurrency",
            FieldId::ToCurrency => "toCurrency",
        }
    }

    /// Human label used in help text.
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Amount => "Amount",
            FieldId::FromCurrency => "From",
            FieldId::ToCurrency => "To",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldId::Amount => FieldKind::Numeric,
            FieldId::FromCurrency | FieldId::ToCurrency => FieldKind::Selection,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldId {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| FxError::UnknownField(s.to_string()))
    }
}

/// How a field's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Number constrained by `min`/`max`.
    Numeric,
    /// Unit code that must be listed in the rate table.
    Selection,
}

/// Stored field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Validation options of a field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Validations {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validations {
    /// Required, with no range.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Set the accepted range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// One form field with its current validation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: FieldId,
    pub value: FieldValue,
    pub error: bool,
    pub help_text: String,
    pub validations: Validations,
}

impl FormField {
    /// Create a field with no error flagged.
    pub fn new(id: FieldId, value: FieldValue, validations: Validations) -> Self {
        Self {
            id,
            value,
            error: false,
            help_text: String::new(),
            validations,
        }
    }
}

/// Snapshot of every form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    fields: BTreeMap<FieldId, FormField>,
}

impl FormState {
    /// Placeholder values used before any rate table is loaded.
    pub fn placeholder(config: &ConverterConfig) -> Self {
        let fields = [
            FormField::new(
                FieldId::Amount,
                FieldValue::Number(UNDER_RANGE_FALLBACK),
                Validations::required().with_range(config.amount_min, config.amount_max),
            ),
            FormField::new(
                FieldId::FromCurrency,
                FieldValue::Text(String::new()),
                Validations::required(),
            ),
            FormField::new(
                FieldId::ToCurrency,
                FieldValue::Text(String::new()),
                Validations::required(),
            ),
        ];

        Self {
            fields: fields.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    /// Get a field. Every [`FieldId`] is always present.
    pub fn field(&self, id: FieldId) -> &FormField {
        &self.fields[&id]
    }

    /// Iterate fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.values()
    }

    /// Current text of a selection field.
    pub fn selection(&self, id: FieldId) -> &str {
        self.field(id).value.as_text().unwrap_or_default()
    }

    /// Current amount, if it is a number.
    pub fn amount(&self) -> Option<f64> {
        self.field(FieldId::Amount).value.as_number()
    }

    /// New snapshot with one field's value replaced.
    pub fn with_value(&self, id: FieldId, value: FieldValue) -> FormState {
        let mut next = self.clone();
        if let Some(field) = next.fields.get_mut(&id) {
            field.value = value;
        }
        next
    }

    /// New snapshot with every field's error status recomputed.
    pub fn evaluated(&self, table: &RateTable) -> FormState {
        FormState {
            fields: self
                .fields
                .iter()
                .map(|(id, field)| (*id, evaluate(field, table)))
                .collect(),
        }
    }

    /// Fields whose value fails validation against `table`.
    pub fn invalid_fields(&self, table: &RateTable) -> Vec<FieldId> {
        self.fields
            .values()
            .filter(|f| !validate(f, table))
            .map(|f| f.id)
            .collect()
    }

    /// Whether any field is currently flagged.
    pub fn has_errors(&self) -> bool {
        self.fields.values().any(|f| f.error)
    }
}

/// Check a field against its validations and the live rate table.
pub fn validate(field: &FormField, table: &RateTable) -> bool {
    violation(field, table).is_none()
}

/// Return the field with `error` and `help_text` refreshed.
pub fn evaluate(field: &FormField, table: &RateTable) -> FormField {
    let mut field = field.clone();
    match violation(&field, table) {
        Some(help_text) => {
            field.error = true;
            field.help_text = help_text;
        }
        None => {
            field.error = false;
            field.help_text.clear();
        }
    }
    field
}

fn violation(field: &FormField, table: &RateTable) -> Option<String> {
    let label = field.id.label();
    let rules = &field.validations;

    match field.id.kind() {
        FieldKind::Numeric => {
            let n = match &field.value {
                FieldValue::Number(n) if n.is_finite() => *n,
                FieldValue::Text(s) if s.trim().is_empty() && rules.required => {
                    return Some(format!("{} is required", label));
                }
                FieldValue::Text(s) if s.trim().is_empty() => return None,
                _ => return Some(format!("{} must be a number", label)),
            };

            if let Some(min) = rules.min {
                if n < min {
                    return Some(format!("{} must be at least {}", label, min));
                }
            }
            if let Some(max) = rules.max {
                if n > max {
                    return Some(format!("{} must be at most {}", label, max));
                }
            }
            None
        }
        FieldKind::Selection => match &field.value {
            FieldValue::Text(code) if code.is_empty() => {
                rules.required.then(|| format!("{} is required", label))
            }
            FieldValue::Text(code) if table.contains(code) => None,
            FieldValue::Text(code) => Some(format!("{} is not an available currency", code)),
            FieldValue::Number(_) => Some(format!("{} must be a currency code", label)),
        },
    }
}

/// Parse raw amount input.
///
/// Blank input reads as zero so it takes the under-range fallback. Overflowing
/// input (`1e400`, `-inf`) stays infinite so the range policy clamps it.
/// Text that is not a number, including `NaN`, yields `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Apply the amount range policy to a candidate number.
pub fn clamp_amount(candidate: f64, rules: &Validations) -> f64 {
    match (rules.min, rules.max) {
        (Some(min), _) if candidate < min => UNDER_RANGE_FALLBACK,
        (_, Some(max)) if candidate > max => max,
        _ => candidate,
    }
}

/// Holds the current form snapshot and applies field policy on edits.
#[derive(Debug, Clone)]
pub struct FormFieldStore {
    state: FormState,
    placeholder: FormState,
}

impl FormFieldStore {
    /// Create a store holding placeholder values.
    pub fn new(config: &ConverterConfig) -> Self {
        let placeholder = FormState::placeholder(config);
        Self {
            state: placeholder.clone(),
            placeholder,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Apply raw input to a field and return the new snapshot.
    pub fn set_value(&mut self, id: FieldId, raw: &str, table: &RateTable) -> FormState {
        let field = self.state.field(id);
        let value = match id.kind() {
            FieldKind::Numeric => match parse_amount(raw) {
                Some(n) => FieldValue::Number(clamp_amount(n, &field.validations)),
                None => FieldValue::Text(raw.to_string()),
            },
            FieldKind::Selection => FieldValue::Text(raw.to_string()),
        };

        debug!(field = %id, raw, stored = %value, "Field updated");

        self.state = self.state.with_value(id, value).evaluated(table);
        self.state.clone()
    }

    /// Same as [`set_value`](Self::set_value), resolving the field by wire name.
    pub fn set_value_named(
        &mut self,
        name: &str,
        raw: &str,
        table: &RateTable,
    ) -> FxResult<FormState> {
        let id: FieldId = name.parse()?;
        Ok(self.set_value(id, raw, table))
    }

    /// Default the selections to the table's first two codes.
    ///
    /// Selections that are already listed in `table` are kept.
    pub fn seed_selections(&mut self, table: &RateTable) -> FormState {
        let (from, to) = table.default_pair();
        let mut next = self.state.clone();

        for (id, default) in [(FieldId::FromCurrency, from), (FieldId::ToCurrency, to)] {
            if !table.contains(next.selection(id)) {
                next = next.with_value(id, FieldValue::Text(default.code().to_string()));
            }
        }

        self.state = next.evaluated(table);
        self.state.clone()
    }

    /// Recompute every field's status against `table`.
    pub fn refresh(&mut self, table: &RateTable) -> FormState {
        self.state = self.state.evaluated(table);
        self.state.clone()
    }

    /// Return to placeholder values.
    pub fn reset(&mut self) {
        self.state = self.placeholder.clone();
    }
}
