//! Shared provider contract.
//!
//! Lifecycle per instance: constructed (credentials validated), any number
//! of [`Provider::build_form`] calls, then [`Provider::ingest`] of an inbound
//! notification followed by the `verify_*` checks. Verification is not a
//! stored state; each call re-checks the current [`TransactionData`].
//!
//! One instance per inbound request. Instances are not shared across
//! concurrent requests.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{normalize_currency, MIN_CREDENTIAL_LENGTH};
use crate::error::{HackReason, PaymentError, ValidationError};
use crate::fields::Fields;
use crate::messages::Locale;
use crate::signature::SignatureCodec;
use crate::validation::{Rule, RuleSet, Validator};

/// The provider's record of the last ingested notification.
///
/// Empty until the first ingest; every ingest replaces it entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransactionData {
    values: IndexMap<&'static str, String>,
}

impl TransactionData {
    /// Copy the `names` subset out of `notification`. Missing or empty
    /// source fields stay absent.
    pub fn capture(notification: &Fields, names: &[&'static str]) -> Self {
        let values = names
            .iter()
            .filter_map(|name| {
                notification
                    .get(name)
                    .map(|v| v.as_text())
                    .filter(|v| !v.is_empty())
                    .map(|v| (*name, v))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of `name`, `""` when absent.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Capability shared by every payment provider.
pub trait Provider {
    /// Registry name (`"liqpay"`, `"wayforpay"`).
    fn name(&self) -> &'static str;

    fn locale(&self) -> Locale;

    /// Name of the notification field carrying the provider's signature.
    fn signature_field(&self) -> &'static str;

    /// Validate `fields`, sign them, and render the checkout form.
    fn build_form(&self, fields: &Fields) -> Result<String, PaymentError> {
        self.build_form_with_prefix(fields, None)
    }

    /// Same as [`Provider::build_form`], with `prefix` markup inserted
    /// verbatim before the hidden inputs.
    fn build_form_with_prefix(
        &self,
        fields: &Fields,
        prefix: Option<&str>,
    ) -> Result<String, PaymentError>;

    /// Replace the transaction record with the relevant subset of `notification`.
    fn ingest(&mut self, notification: &Fields);

    fn transaction_data(&self) -> &TransactionData;

    /// Lookup by name; `None` for unknown or missing fields.
    fn transaction_field(&self, name: &str) -> Option<&str> {
        self.transaction_data().get(name)
    }

    /// Expected signature of the current transaction record.
    fn compute_signature(&self) -> String;

    fn verify_signature(&self) -> Result<(), PaymentError> {
        let computed = self.compute_signature();
        let received = self.transaction_data().value(self.signature_field());
        if SignatureCodec::verify(received, &computed) {
            return Ok(());
        }
        tracing::warn!(
            provider = self.name(),
            "rejecting notification: signature mismatch"
        );
        Err(PaymentError::hack_attempt(
            HackReason::InvalidSignature,
            self.locale(),
        ))
    }

    /// Compare the expected amount with the notified one. Decimal values are
    /// compared numerically (`"10"` equals `"10.00"`).
    fn verify_amount(&self, amount: &str) -> Result<(), PaymentError> {
        let notified = self.transaction_data().value("amount");
        if amounts_match(amount, notified) {
            return Ok(());
        }
        tracing::warn!(
            provider = self.name(),
            expected = amount,
            notified,
            "rejecting notification: amount mismatch"
        );
        Err(PaymentError::hack_attempt(
            HackReason::InvalidAmount,
            self.locale(),
        ))
    }

    fn verify_currency(&self, currency: &str) -> Result<(), PaymentError> {
        let notified = self.transaction_data().value("currency");
        if !notified.is_empty() && normalize_currency(currency) == normalize_currency(notified) {
            return Ok(());
        }
        tracing::warn!(
            provider = self.name(),
            expected = currency,
            notified,
            "rejecting notification: currency mismatch"
        );
        Err(PaymentError::hack_attempt(
            HackReason::InvalidCurrency,
            self.locale(),
        ))
    }

    /// Payload to return to the processor after a verified notification.
    fn build_acknowledgement(&self) -> Map<String, Value>;
}

fn amounts_match(expected: &str, notified: &str) -> bool {
    let (expected, notified) = (expected.trim(), notified.trim());
    if notified.is_empty() {
        return false;
    }
    match (expected.parse::<Decimal>(), notified.parse::<Decimal>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => expected == notified,
    }
}

/// Check that every credential in `names` is present and long enough.
pub(crate) fn validate_credentials(
    validator: &Validator,
    credentials: &Fields,
    names: &[&'static str],
) -> Result<(), ValidationError> {
    let schema = names.iter().fold(RuleSet::new(), |schema, name| {
        schema.field(*name, [Rule::Required, Rule::MinLength(MIN_CREDENTIAL_LENGTH)])
    });
    validator.validate(credentials, &schema)
}

/// Rewrite the legacy currency alias in place.
pub(crate) fn normalize_currency_field(fields: &mut Fields) {
    let normalized = match fields.get("currency").and_then(|v| v.as_str()) {
        Some(code) if normalize_currency(code) != code => normalize_currency(code).to_string(),
        _ => return,
    };
    fields.insert("currency", normalized);
}

/// `"en"` when requested, `"ru"` otherwise.
pub(crate) fn form_language(fields: &Fields) -> &'static str {
    match fields.get("language").and_then(|v| v.as_str()) {
        Some("en") => "en",
        _ => "ru",
    }
}
