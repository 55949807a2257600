//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::api_client::ApiSettings;
use crate::constants::{DEFAULT_API_TIMEOUT, LIQPAY, LIQPAY_API_URL, WAYFORPAY};
use crate::error::PaymentError;
use crate::factory::{PaymentProvider, ProviderFactory};
use crate::fields::Fields;
use crate::messages::Locale;

/// Provider selection and credentials loaded from the environment.
#[derive(Clone)]
pub struct PaymentConfig {
    pub provider: String,
    pub credentials: Fields,
    pub locale: Locale,
    pub api: ApiSettings,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("provider", &self.provider)
            .field("credentials", &"<redacted>")
            .field("locale", &self.locale)
            .field("api", &self.api)
            .finish()
    }
}

/// Environment variable -> credential name, per provider.
const LIQPAY_ENV: &[(&str, &str)] = &[
    ("LIQPAY_PUBLIC_KEY", "public_key"),
    ("LIQPAY_PRIVATE_KEY", "private_key"),
];

const WAYFORPAY_ENV: &[(&str, &str)] = &[
    ("WAYFORPAY_MERCHANT_ACCOUNT", "merchantAccount"),
    ("WAYFORPAY_SECRET_KEY", "secretKey"),
];

impl PaymentConfig {
    /// Read configuration from process environment variables.
    ///
    /// - `PAYMENT_PROVIDER` (required): `liqpay` or `wayforpay`
    /// - `LIQPAY_PUBLIC_KEY` / `LIQPAY_PRIVATE_KEY`
    /// - `WAYFORPAY_MERCHANT_ACCOUNT` / `WAYFORPAY_SECRET_KEY`
    /// - `PAYMENT_LOCALE` (default `en`)
    /// - `LIQPAY_API_URL`, `LIQPAY_API_TIMEOUT_SECS` (default 5)
    pub fn from_env() -> Result<Self, PaymentError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PaymentConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PaymentError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = var("PAYMENT_PROVIDER")
            .ok_or_else(|| PaymentError::Config("PAYMENT_PROVIDER is required".to_string()))?;

        let env_map: &[(&str, &str)] = match provider.as_str() {
            LIQPAY => LIQPAY_ENV,
            WAYFORPAY => WAYFORPAY_ENV,
            _ => &[],
        };
        let mut credentials = Fields::new();
        for &(env_key, name) in env_map {
            let value = var(env_key)
                .ok_or_else(|| PaymentError::Config(format!("{env_key} is required")))?;
            credentials.insert(name, value);
        }

        let locale = match var("PAYMENT_LOCALE") {
            Some(code) => code.parse()?,
            None => Locale::default(),
        };

        let timeout = match var("LIQPAY_API_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    PaymentError::Config(format!(
                        "LIQPAY_API_TIMEOUT_SECS must be a positive integer, got '{secs}'"
                    ))
                })?,
            None => DEFAULT_API_TIMEOUT,
        };

        let base_url = var("LIQPAY_API_URL").unwrap_or_else(|| LIQPAY_API_URL.to_string());
        if url::Url::parse(&base_url).is_err() {
            return Err(PaymentError::Config(format!(
                "LIQPAY_API_URL is not a valid URL: '{base_url}'"
            )));
        }
        if !base_url.starts_with("https://") {
            tracing::warn!(
                url = %base_url,
                "LIQPAY_API_URL does not use HTTPS; requests will be sent in cleartext"
            );
        }

        Ok(Self {
            provider,
            credentials,
            locale,
            api: ApiSettings { base_url, timeout },
        })
    }

    pub fn factory(&self) -> ProviderFactory {
        ProviderFactory::new(self.locale, self.api.clone())
    }

    pub fn create_provider(&self) -> Result<PaymentProvider, PaymentError> {
        self.factory().create(&self.provider, &self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn liqpay_from_env() {
        let config = PaymentConfig::from_lookup(lookup(&[
            ("PAYMENT_PROVIDER", "liqpay"),
            ("LIQPAY_PUBLIC_KEY", "pub12345"),
            ("LIQPAY_PRIVATE_KEY", "priv12345"),
            ("PAYMENT_LOCALE", "ru"),
            ("LIQPAY_API_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.locale, Locale::Ru);
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.base_url, LIQPAY_API_URL);
        assert_eq!(config.credentials.text("public_key"), "pub12345");

        let provider = config.create_provider().unwrap();
        assert_eq!(provider.name(), "liqpay");
        assert_eq!(provider.locale(), Locale::Ru);
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = PaymentConfig::from_lookup(lookup(&[
            ("PAYMENT_PROVIDER", "wayforpay"),
            ("WAYFORPAY_MERCHANT_ACCOUNT", "acct1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("WAYFORPAY_SECRET_KEY"));
    }

    #[test]
    fn provider_is_required() {
        let err = PaymentConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = PaymentConfig::from_lookup(lookup(&[
            ("PAYMENT_PROVIDER", "wayforpay"),
            ("WAYFORPAY_MERCHANT_ACCOUNT", "acct1"),
            ("WAYFORPAY_SECRET_KEY", "secretsecret"),
            ("LIQPAY_API_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));
    }

    #[test]
    fn unknown_provider_fails_at_creation() {
        let config =
            PaymentConfig::from_lookup(lookup(&[("PAYMENT_PROVIDER", "stripe")])).unwrap();
        let err = config.create_provider().unwrap_err();
        assert!(matches!(err, PaymentError::ProviderNotFound { .. }));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = PaymentConfig::from_lookup(lookup(&[
            ("PAYMENT_PROVIDER", "wayforpay"),
            ("WAYFORPAY_MERCHANT_ACCOUNT", "acct1"),
            ("WAYFORPAY_SECRET_KEY", "secretsecret"),
        ]))
        .unwrap();
        assert!(!format!("{config:?}").contains("secretsecret"));
    }
}
