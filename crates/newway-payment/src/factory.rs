//! Provider registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api_client::ApiSettings;
use crate::constants::{LIQPAY, WAYFORPAY};
use crate::error::PaymentError;
use crate::fields::Fields;
use crate::liqpay::LiqpayProvider;
use crate::messages::Locale;
use crate::provider::{Provider, TransactionData};
use crate::wayforpay::WayforpayProvider;

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Liqpay,
    Wayforpay,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Liqpay, ProviderKind::Wayforpay];

    /// Exact, case-sensitive lookup of a registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            LIQPAY => Some(ProviderKind::Liqpay),
            WAYFORPAY => Some(ProviderKind::Wayforpay),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Liqpay => LIQPAY,
            ProviderKind::Wayforpay => WAYFORPAY,
        }
    }
}

/// A constructed provider of any supported kind.
#[derive(Debug, Clone)]
pub enum PaymentProvider {
    Liqpay(LiqpayProvider),
    Wayforpay(WayforpayProvider),
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            PaymentProvider::Liqpay($p) => $body,
            PaymentProvider::Wayforpay($p) => $body,
        }
    };
}

impl PaymentProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            PaymentProvider::Liqpay(_) => ProviderKind::Liqpay,
            PaymentProvider::Wayforpay(_) => ProviderKind::Wayforpay,
        }
    }

    pub fn as_liqpay(&self) -> Option<&LiqpayProvider> {
        match self {
            PaymentProvider::Liqpay(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_liqpay_mut(&mut self) -> Option<&mut LiqpayProvider> {
        match self {
            PaymentProvider::Liqpay(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_wayforpay(&self) -> Option<&WayforpayProvider> {
        match self {
            PaymentProvider::Wayforpay(p) => Some(p),
            _ => None,
        }
    }
}

impl Provider for PaymentProvider {
    fn name(&self) -> &'static str {
        dispatch!(self, p => p.name())
    }

    fn locale(&self) -> Locale {
        dispatch!(self, p => p.locale())
    }

    fn signature_field(&self) -> &'static str {
        dispatch!(self, p => p.signature_field())
    }

    fn build_form_with_prefix(
        &self,
        fields: &Fields,
        prefix: Option<&str>,
    ) -> Result<String, PaymentError> {
        dispatch!(self, p => p.build_form_with_prefix(fields, prefix))
    }

    fn ingest(&mut self, notification: &Fields) {
        dispatch!(self, p => p.ingest(notification))
    }

    fn transaction_data(&self) -> &TransactionData {
        dispatch!(self, p => p.transaction_data())
    }

    fn compute_signature(&self) -> String {
        dispatch!(self, p => p.compute_signature())
    }

    fn build_acknowledgement(&self) -> Map<String, Value> {
        dispatch!(self, p => p.build_acknowledgement())
    }
}

/// Builds providers by registry name.
#[derive(Debug, Clone, Default)]
pub struct ProviderFactory {
    locale: Locale,
    api: ApiSettings,
}

impl ProviderFactory {
    pub fn new(locale: Locale, api: ApiSettings) -> Self {
        Self { locale, api }
    }

    /// Construct the provider registered as `name`. Credential validation
    /// failures from the provider are returned unchanged.
    pub fn create(
        &self,
        name: &str,
        credentials: &Fields,
    ) -> Result<PaymentProvider, PaymentError> {
        let kind = ProviderKind::from_name(name).ok_or_else(|| {
            tracing::warn!(provider = name, "unknown payment provider requested");
            PaymentError::provider_not_found(name, self.locale)
        })?;

        let provider = match kind {
            ProviderKind::Liqpay => PaymentProvider::Liqpay(LiqpayProvider::with_options(
                credentials,
                self.locale,
                self.api.clone(),
            )?),
            ProviderKind::Wayforpay => {
                PaymentProvider::Wayforpay(WayforpayProvider::with_locale(credentials, self.locale)?)
            }
        };
        tracing::debug!(provider = kind.name(), "payment provider created");
        Ok(provider)
    }
}

/// [`ProviderFactory::create`] with default locale and API settings.
pub fn create(name: &str, credentials: &Fields) -> Result<PaymentProvider, PaymentError> {
    ProviderFactory::default().create(name, credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ProviderKind::from_name("LiqPay"), None);
    }

    #[test]
    fn unknown_provider_is_named_in_error() {
        let err = create("unknown", &Fields::new()).unwrap_err();
        match err {
            PaymentError::ProviderNotFound { ref name, .. } => assert_eq!(name, "unknown"),
            ref other => panic!("expected ProviderNotFound, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Provider not found: unknown");
    }

    #[test]
    fn russian_factory_localizes_errors() {
        let factory = ProviderFactory::new(Locale::Ru, ApiSettings::default());
        let err = factory.create("paypal", &Fields::new()).unwrap_err();
        assert_eq!(err.to_string(), "Провайдер не найден: paypal");
    }

    #[test]
    fn credential_errors_propagate_unchanged() {
        let err = create("wayforpay", &Fields::new().with("merchantAccount", "acct")).unwrap_err();
        let PaymentError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert!(v.has_field("merchantAccount"));
        assert!(v.has_field("secretKey"));
    }

    #[test]
    fn variant_accessors() {
        let creds = Fields::new()
            .with("public_key", "pub12345")
            .with("private_key", "priv12345");
        let mut provider = create("liqpay", &creds).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Liqpay);
        assert_eq!(provider.name(), "liqpay");
        assert!(provider.as_wayforpay().is_none());
        assert_eq!(
            provider.as_liqpay().map(LiqpayProvider::public_key),
            Some("pub12345")
        );
        assert!(provider.as_liqpay_mut().is_some());
    }
}
