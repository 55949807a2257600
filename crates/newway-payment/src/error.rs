use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::messages::{Locale, MessageKey};

/// Which inbound check rejected a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HackReason {
    InvalidSignature,
    InvalidAmount,
    InvalidCurrency,
}

impl HackReason {
    pub fn message_key(self) -> MessageKey {
        match self {
            HackReason::InvalidSignature => MessageKey::InvalidSignature,
            HackReason::InvalidAmount => MessageKey::InvalidAmount,
            HackReason::InvalidCurrency => MessageKey::InvalidCurrency,
        }
    }
}

/// Field validation failure: a general message plus per-field details.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub errors: IndexMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, errors: IndexMap<String, Vec<String>>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    /// Details recorded for `field`, empty when the field passed.
    pub fn field(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }
}

/// Errors returned by provider operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{message}: {name}")]
    ProviderNotFound { name: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("provider init error: {0}")]
    ProviderInit(String),

    #[error("{message}")]
    HackAttempt { reason: HackReason, message: String },

    #[error("api error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PaymentError {
    pub(crate) fn provider_not_found(name: &str, locale: Locale) -> Self {
        PaymentError::ProviderNotFound {
            name: name.to_string(),
            message: MessageKey::ProviderNotFound.text(locale).to_string(),
        }
    }

    pub(crate) fn hack_attempt(reason: HackReason, locale: Locale) -> Self {
        PaymentError::HackAttempt {
            reason,
            message: format!(
                "{}: {}",
                MessageKey::HackAttempt.text(locale),
                reason.message_key().text(locale)
            ),
        }
    }

    pub(crate) fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        PaymentError::Api {
            status,
            message: message.into(),
        }
    }

    /// Caller input problems (bad provider name, malformed fields).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::ProviderNotFound { .. } | PaymentError::Validation(_)
        )
    }

    /// A forged or tampered notification. Must be rejected, never retried.
    pub fn is_security_event(&self) -> bool {
        matches!(self, PaymentError::HackAttempt { .. })
    }

    /// Suggested HTTP status for the layer that answers the caller.
    pub fn http_status(&self) -> u16 {
        match self {
            PaymentError::ProviderNotFound { .. } | PaymentError::Validation(_) => 400,
            PaymentError::HackAttempt { .. } => 403,
            PaymentError::Api { .. } => 502,
            PaymentError::ProviderInit(_) | PaymentError::Config(_) | PaymentError::Serde(_) => {
                500
            }
        }
    }
}
