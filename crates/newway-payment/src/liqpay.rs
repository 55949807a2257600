//! Liqpay provider (flat direct-signature checkout).

use serde_json::{Map, Value};

use crate::api_client::{ApiSettings, LiqpayApi, SignedEnvelope};
use crate::constants::{
    normalize_currency, FORM_LANGUAGES, LIQPAY, LIQPAY_CURRENCIES, LIQPAY_FORM_URL,
    SUBSCRIBE_DATE_FORMAT,
};
use crate::error::PaymentError;
use crate::fields::Fields;
use crate::form::HtmlForm;
use crate::messages::{Locale, MessageKey};
use crate::provider::{
    form_language, normalize_currency_field, validate_credentials, Provider, TransactionData,
};
use crate::signature::SignatureCodec;
use crate::validation::{Rule, RuleSet, Validator};

/// Fields Liqpay accepts in the checkout form. Anything else is dropped.
pub const FORM_FIELDS: &[&str] = &[
    "public_key",
    "amount",
    "currency",
    "description",
    "order_id",
    "result_url",
    "server_url",
    "type",
    "signature",
    "language",
    "subscribe",
    "subscribe_date_start",
    "subscribe_periodicity",
    "sandbox",
];

/// Fields copied out of a callback notification.
pub const NOTIFICATION_FIELDS: &[&str] = &[
    "signature",
    "sender_phone",
    "transaction_id",
    "status",
    "order_id",
    "amount",
    "currency",
    "type",
    "description",
];

const CREDENTIAL_FIELDS: &[&str] = &["public_key", "private_key"];

/// Liqpay checkout and callback handling.
#[derive(Clone)]
pub struct LiqpayProvider {
    public_key: String,
    private_key: String,
    validator: Validator,
    data: TransactionData,
    api: LiqpayApi,
}

impl std::fmt::Debug for LiqpayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiqpayProvider")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl LiqpayProvider {
    /// Construct with English messages and default API settings.
    pub fn new(credentials: &Fields) -> Result<Self, PaymentError> {
        Self::with_options(credentials, Locale::default(), ApiSettings::default())
    }

    pub fn with_options(
        credentials: &Fields,
        locale: Locale,
        api: ApiSettings,
    ) -> Result<Self, PaymentError> {
        let validator = Validator::new(locale);
        validate_credentials(&validator, credentials, CREDENTIAL_FIELDS)?;

        Ok(Self {
            public_key: credentials.text("public_key"),
            private_key: credentials.text("private_key"),
            validator,
            data: TransactionData::default(),
            api: LiqpayApi::new(api)?,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    fn form_schema() -> RuleSet {
        RuleSet::new()
            .field("amount", [Rule::Required, Rule::Numeric])
            .field("currency", [Rule::Required, Rule::In(LIQPAY_CURRENCIES)])
            .field("description", [Rule::Required])
            .field("order_id", [Rule::Required])
            .field("type", [Rule::In(&["buy", "donate", "subscribe"])])
            .field("subscribe", [Rule::In(&["1"])])
            .field(
                "subscribe_date_start",
                [
                    Rule::RequiredIf {
                        field: "type",
                        value: "subscribe",
                    },
                    Rule::DateFormat(SUBSCRIBE_DATE_FORMAT),
                ],
            )
            .field(
                "subscribe_periodicity",
                [
                    Rule::RequiredIf {
                        field: "type",
                        value: "subscribe",
                    },
                    Rule::In(&["month", "year"]),
                ],
            )
            .field("server_url", [Rule::Url])
            .field("result_url", [Rule::Url])
            .field("pay_way", [Rule::In(&["card", "delayed"])])
            .field("language", [Rule::In(FORM_LANGUAGES)])
            .field("sandbox", [Rule::Boolean])
            .message("amount", "required", MessageKey::AmountIsNull)
            .message("currency", "required", MessageKey::CurrencyIsNull)
            .message("currency", "in", MessageKey::CurrencyIsNotSupported)
            .message("description", "required", MessageKey::DescriptionIsNull)
    }

    /// Signature of an outbound request.
    ///
    /// `private_key ‖ amount ‖ currency ‖ public_key ‖ order_id ‖ type ‖
    /// description ‖ result_url ‖ server_url`, currency alias rewritten.
    pub fn form_signature(&self, fields: &Fields) -> String {
        let amount = fields.text("amount");
        let currency = fields.text("currency");
        let order_id = fields.text("order_id");
        let kind = fields.text("type");
        let description = fields.text("description");
        let result_url = fields.text("result_url");
        let server_url = fields.text("server_url");

        SignatureCodec::Liqpay.compute(
            &[
                amount.as_str(),
                normalize_currency(&currency),
                self.public_key.as_str(),
                order_id.as_str(),
                kind.as_str(),
                description.as_str(),
                result_url.as_str(),
                server_url.as_str(),
            ],
            &self.private_key,
        )
    }

    pub fn order_id(&self) -> Option<&str> {
        self.data.get("order_id")
    }

    pub fn amount(&self) -> Option<&str> {
        self.data.get("amount")
    }

    pub fn currency(&self) -> Option<&str> {
        self.data.get("currency")
    }

    pub fn status(&self) -> Option<&str> {
        self.data.get("status")
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.data.get("transaction_id")
    }

    pub fn sender_phone(&self) -> Option<&str> {
        self.data.get("sender_phone")
    }

    /// Call `https://www.liqpay.ua/api/<path>` with `params` as the JSON body.
    pub async fn api(
        &mut self,
        path: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, PaymentError> {
        let envelope = SignedEnvelope::encode(&self.public_key, &self.private_key, params)?;
        tracing::debug!(provider = LIQPAY, path, "calling liqpay api");
        self.api.call(path, &envelope).await
    }

    /// HTTP status of the last [`LiqpayProvider::api`] call.
    pub fn last_status(&self) -> Option<u16> {
        self.api.last_status()
    }
}

impl Provider for LiqpayProvider {
    fn name(&self) -> &'static str {
        LIQPAY
    }

    fn locale(&self) -> Locale {
        self.validator.locale()
    }

    fn signature_field(&self) -> &'static str {
        "signature"
    }

    fn build_form_with_prefix(
        &self,
        fields: &Fields,
        prefix: Option<&str>,
    ) -> Result<String, PaymentError> {
        let mut fields = fields.clone();
        normalize_currency_field(&mut fields);
        self.validator.validate(&fields, &Self::form_schema())?;

        fields.insert("public_key", self.public_key.as_str());
        let signature = self.form_signature(&fields);
        fields.insert("signature", signature);

        let language = form_language(&fields);
        tracing::debug!(
            provider = LIQPAY,
            order_id = %fields.text("order_id"),
            language,
            "building checkout form"
        );

        Ok(HtmlForm::new(LIQPAY_FORM_URL)
            .accept_charset("utf-8")
            .prefix(prefix)
            .hidden_fields(&fields, FORM_FIELDS)
            .button(format!(
                r#"<input type="image" src="//static.liqpay.ua/buttons/p1{language}.radius.png" name="btn_text" />"#
            ))
            .render())
    }

    fn ingest(&mut self, notification: &Fields) {
        self.data = TransactionData::capture(notification, NOTIFICATION_FIELDS);
        tracing::debug!(
            provider = LIQPAY,
            order_id = self.data.value("order_id"),
            status = self.data.value("status"),
            "notification ingested"
        );
    }

    fn transaction_data(&self) -> &TransactionData {
        &self.data
    }

    /// `private_key ‖ amount ‖ currency ‖ public_key ‖ order_id ‖ type ‖
    /// description ‖ status ‖ transaction_id ‖ sender_phone`.
    fn compute_signature(&self) -> String {
        let d = &self.data;
        SignatureCodec::Liqpay.compute(
            &[
                d.value("amount"),
                normalize_currency(d.value("currency")),
                self.public_key.as_str(),
                d.value("order_id"),
                d.value("type"),
                d.value("description"),
                d.value("status"),
                d.value("transaction_id"),
                d.value("sender_phone"),
            ],
            &self.private_key,
        )
    }

    /// Liqpay expects no acknowledgement body.
    fn build_acknowledgement(&self) -> Map<String, Value> {
        Map::new()
    }
}
