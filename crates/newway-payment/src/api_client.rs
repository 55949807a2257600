//! Liqpay server-to-server API client.
//!
//! Requests are form-encoded `data=<base64 JSON>&signature=<sha1>` posts.
//! Any transport failure, timeout, non-2xx status or non-JSON body is an
//! [`PaymentError::Api`]; nothing here is ever treated as a success by default.

use std::time::Duration;

use base64::Engine;
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_API_TIMEOUT, LIQPAY_API_URL};
use crate::error::PaymentError;
use crate::signature::liqpay_api_signature;

/// Where and how long to wait for provider API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: LIQPAY_API_URL.to_string(),
            timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

impl ApiSettings {
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Encoded request body: base64 JSON envelope and its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub data: String,
    pub signature: String,
}

impl SignedEnvelope {
    /// Merge `public_key` into `params` (params win on conflict), encode,
    /// and sign with `private_key`.
    pub fn encode(
        public_key: &str,
        private_key: &str,
        params: &Map<String, Value>,
    ) -> Result<Self, PaymentError> {
        let mut body = Map::new();
        body.insert("public_key".to_string(), Value::from(public_key));
        body.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        let json = serde_json::to_vec(&Value::Object(body))?;
        let data = base64::engine::general_purpose::STANDARD.encode(json);
        let signature = liqpay_api_signature(private_key, &data);
        Ok(Self { data, signature })
    }

    /// Decode the JSON carried in `data`.
    pub fn decode(&self) -> Result<Value, PaymentError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| PaymentError::api(None, format!("invalid envelope encoding: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// HTTP client bound to one set of [`ApiSettings`].
#[derive(Debug, Clone)]
pub struct LiqpayApi {
    http: reqwest::Client,
    settings: ApiSettings,
    last_status: Option<u16>,
}

impl LiqpayApi {
    pub fn new(settings: ApiSettings) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PaymentError::ProviderInit(format!("http client: {e}")))?;
        Ok(Self {
            http,
            settings,
            last_status: None,
        })
    }

    /// HTTP status of the most recent call, if a response was received.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    pub async fn call(
        &mut self,
        path: &str,
        envelope: &SignedEnvelope,
    ) -> Result<Value, PaymentError> {
        let url = self.settings.endpoint(path);
        self.last_status = None;

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("data", envelope.data.as_str()),
                ("signature", envelope.signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "failed" };
                tracing::warn!(url = %url, error = %e, "liqpay api request {reason}");
                PaymentError::api(None, format!("request {reason}: {e}"))
            })?;

        let status = resp.status();
        self.last_status = Some(status.as_u16());

        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "liqpay api returned an error status");
            return Err(PaymentError::api(
                Some(status.as_u16()),
                format!("unexpected status {status}"),
            ));
        }

        resp.json::<Value>().await.map_err(|e| {
            PaymentError::api(Some(status.as_u16()), format!("response parse failed: {e}"))
        })
    }
}
