//! Wayforpay provider.

use serde_json::{Map, Value};

use crate::constants::{
    normalize_currency, FORM_LANGUAGES, WAYFORPAY, WAYFORPAY_ACCEPT, WAYFORPAY_CURRENCIES,
    WAYFORPAY_FORM_URL,
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

/// Fields Wayforpay accepts in the purchase form. Anything else is dropped.
pub const FORM_FIELDS: &[&str] = &[
    "merchantAccount",
    "merchantDomainName",
    "currency",
    "amount",
    "returnUrl",
    "serviceUrl",
    "orderReference",
    "orderDate",
    "productName",
    "productCount",
    "productPrice",
    "merchantSignature",
    "language",
];

/// Fields copied out of a callback notification.
pub const NOTIFICATION_FIELDS: &[&str] = &[
    "merchantSignature",
    "merchantAccount",
    "authCode",
    "transactionStatus",
    "orderReference",
    "amount",
    "currency",
    "cardPan",
    "reasonCode",
];

const CREDENTIAL_FIELDS: &[&str] = &["merchantAccount", "secretKey"];

/// Outbound signature layout, in order. List fields are joined with `;`.
const FORM_SIGNATURE_FIELDS: &[&str] = &[
    "merchantAccount",
    "merchantDomainName",
    "orderReference",
    "orderDate",
    "amount",
    "currency",
    "productName",
    "productCount",
    "productPrice",
];

/// Inbound signature layout, in order.
const NOTIFICATION_SIGNATURE_FIELDS: &[&str] = &[
    "merchantAccount",
    "orderReference",
    "amount",
    "currency",
    "authCode",
    "cardPan",
    "transactionStatus",
    "reasonCode",
];

/// Wayforpay purchase form and service-URL callback handling.
#[derive(Clone)]
pub struct WayforpayProvider {
    merchant_account: String,
    secret_key: String,
    validator: Validator,
    data: TransactionData,
}

impl std::fmt::Debug for WayforpayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WayforpayProvider")
            .field("merchant_account", &self.merchant_account)
            .field("secret_key", &"<redacted>")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl WayforpayProvider {
    pub fn new(credentials: &Fields) -> Result<Self, PaymentError> {
        Self::with_locale(credentials, Locale::default())
    }

    pub fn with_locale(credentials: &Fields, locale: Locale) -> Result<Self, PaymentError> {
        let validator = Validator::new(locale);
        validate_credentials(&validator, credentials, CREDENTIAL_FIELDS)?;

        Ok(Self {
            merchant_account: credentials.text("merchantAccount"),
            secret_key: credentials.text("secretKey"),
            validator,
            data: TransactionData::default(),
        })
    }

    pub fn merchant_account(&self) -> &str {
        &self.merchant_account
    }

    fn form_schema() -> RuleSet {
        let product_list = || {
            [
                Rule::Required,
                Rule::Array,
                Rule::SameSize("productName"),
                Rule::Each(vec![Rule::Numeric]),
            ]
        };

        RuleSet::new()
            .field("amount", [Rule::Required, Rule::Numeric])
            .field("merchantDomainName", [Rule::Required])
            .field("orderDate", [Rule::Required])
            .field("currency", [Rule::Required, Rule::In(WAYFORPAY_CURRENCIES)])
            .field("orderReference", [Rule::Required])
            .field("serviceUrl", [Rule::Url])
            .field("returnUrl", [Rule::Url])
            .field("language", [Rule::In(FORM_LANGUAGES)])
            .field("productName", [Rule::Required, Rule::Array])
            .field("productCount", product_list())
            .field("productPrice", product_list())
            .message("amount", "required", MessageKey::AmountIsNull)
            .message("currency", "required", MessageKey::CurrencyIsNull)
            .message("currency", "in", MessageKey::CurrencyIsNotSupported)
    }

    /// The `;`-joined string signed for an outbound form. Array fields keep
    /// the order they were supplied in.
    pub fn form_canonical_string(&self, fields: &Fields) -> String {
        let values = self.form_signature_values(fields);
        let parts: Vec<&str> = values.iter().map(String::as_str).collect();
        SignatureCodec::Wayforpay.canonical_string(&parts, &self.secret_key)
    }

    /// `merchantSignature` for an outbound form.
    pub fn form_signature(&self, fields: &Fields) -> String {
        let values = self.form_signature_values(fields);
        let parts: Vec<&str> = values.iter().map(String::as_str).collect();
        SignatureCodec::Wayforpay.compute(&parts, &self.secret_key)
    }

    fn form_signature_values(&self, fields: &Fields) -> Vec<String> {
        FORM_SIGNATURE_FIELDS
            .iter()
            .map(|name| match *name {
                "merchantAccount" => self.merchant_account.clone(),
                "currency" => normalize_currency(&fields.text(name)).to_string(),
                other => fields.text(other),
            })
            .collect()
    }

    pub fn order_reference(&self) -> Option<&str> {
        self.data.get("orderReference")
    }

    pub fn amount(&self) -> Option<&str> {
        self.data.get("amount")
    }

    pub fn currency(&self) -> Option<&str> {
        self.data.get("currency")
    }

    pub fn transaction_status(&self) -> Option<&str> {
        self.data.get("transactionStatus")
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.data.get("reasonCode")
    }

    /// Acknowledgement signed at a fixed unix `time`.
    pub fn build_acknowledgement_at(&self, time: i64) -> Map<String, Value> {
        let order_reference = self.data.value("orderReference");
        let time_text = time.to_string();
        let signature = SignatureCodec::Wayforpay.compute(
            &[order_reference, WAYFORPAY_ACCEPT, time_text.as_str()],
            &self.secret_key,
        );

        let mut ack = Map::new();
        ack.insert("orderReference".into(), Value::from(order_reference));
        ack.insert("status".into(), Value::from(WAYFORPAY_ACCEPT));
        ack.insert("time".into(), Value::from(time));
        ack.insert("signature".into(), Value::from(signature));
        ack
    }
}

impl Provider for WayforpayProvider {
    fn name(&self) -> &'static str {
        WAYFORPAY
    }

    fn locale(&self) -> Locale {
        self.validator.locale()
    }

    fn signature_field(&self) -> &'static str {
        "merchantSignature"
    }

    fn build_form_with_prefix(
        &self,
        fields: &Fields,
        prefix: Option<&str>,
    ) -> Result<String, PaymentError> {
        let mut fields = fields.clone();
        normalize_currency_field(&mut fields);
        self.validator.validate(&fields, &Self::form_schema())?;

        fields.insert("merchantAccount", self.merchant_account.as_str());
        let signature = self.form_signature(&fields);
        fields.insert("merchantSignature", signature);

        let language = form_language(&fields);
        fields.insert("language", language.to_uppercase());
        tracing::debug!(
            provider = WAYFORPAY,
            order_reference = %fields.text("orderReference"),
            language,
            "building purchase form"
        );

        Ok(HtmlForm::new(WAYFORPAY_FORM_URL)
            .prefix(prefix)
            .hidden_fields(&fields, FORM_FIELDS)
            .render())
    }

    fn ingest(&mut self, notification: &Fields) {
        self.data = TransactionData::capture(notification, NOTIFICATION_FIELDS);
        tracing::debug!(
            provider = WAYFORPAY,
            order_reference = self.data.value("orderReference"),
            status = self.data.value("transactionStatus"),
            "notification ingested"
        );
    }

    fn transaction_data(&self) -> &TransactionData {
        &self.data
    }

    fn compute_signature(&self) -> String {
        let parts: Vec<&str> = NOTIFICATION_SIGNATURE_FIELDS
            .iter()
            .map(|name| match *name {
                "currency" => normalize_currency(self.data.value(name)),
                other => self.data.value(other),
            })
            .collect();
        SignatureCodec::Wayforpay.compute(&parts, &self.secret_key)
    }

    fn build_acknowledgement(&self) -> Map<String, Value> {
        self.build_acknowledgement_at(chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::hidden_values;
    use crate::signature::hmac_md5_hex;

    fn provider() -> WayforpayProvider {
        let creds = Fields::new()
            .with("merchantAccount", "test_merch")
            .with("secretKey", "secretsecret");
        WayforpayProvider::new(&creds).unwrap()
    }

    fn order() -> Fields {
        Fields::new()
            .with("merchantDomainName", "shop.example.com")
            .with("orderReference", "R1")
            .with("orderDate", "1415379863")
            .with("amount", "1547.36")
            .with("currency", "UAH")
            .with("productName", vec!["A", "B"])
            .with("productCount", vec!["1", "2"])
            .with("productPrice", vec!["1000", "273.68"])
    }

    #[test]
    fn canonical_string_keeps_array_order() {
        let p = provider();
        assert_eq!(
            p.form_canonical_string(&order()),
            "test_merch;shop.example.com;R1;1415379863;1547.36;UAH;A;B;1;2;1000;273.68"
        );
    }

    #[test]
    fn form_emits_list_inputs_and_signature() {
        let p = provider();
        let html = p.build_form(&order()).unwrap();

        assert!(html.contains(r#"action="https://secure.wayforpay.com/pay""#));
        assert_eq!(hidden_values(&html, "productName[]"), ["A", "B"]);
        assert_eq!(hidden_values(&html, "merchantAccount"), ["test_merch"]);
        assert_eq!(hidden_values(&html, "language"), ["RU"]);
        assert_eq!(
            hidden_values(&html, "merchantSignature"),
            [hmac_md5_hex(b"secretsecret", p.form_canonical_string(&order()).as_bytes())]
        );
        assert!(!html.contains("secretsecret"));
    }

    #[test]
    fn mismatched_product_lists_are_rejected() {
        let fields = order().with("productPrice", vec!["1000"]);
        let err = provider().build_form(&fields).unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref v) if v.has_field("productPrice")));
    }

    #[test]
    fn scalar_product_name_is_rejected() {
        let fields = order().with("productName", "A");
        let err = provider().build_form(&fields).unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref v) if v.has_field("productName")));
    }

    #[test]
    fn gel_is_not_supported() {
        let err = provider()
            .build_form(&order().with("currency", "GEL"))
            .unwrap_err();
        let PaymentError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.field("currency"), ["Currency is not supported".to_string()]);
    }

    #[test]
    fn inbound_signature_layout() {
        let mut p = provider();
        p.ingest(
            &Fields::new()
                .with("merchantAccount", "test_merch")
                .with("orderReference", "R1")
                .with("amount", "1547.36")
                .with("currency", "UAH")
                .with("authCode", "541963")
                .with("cardPan", "41****8217")
                .with("transactionStatus", "Approved")
                .with("reasonCode", "1100"),
        );
        assert_eq!(
            p.compute_signature(),
            hmac_md5_hex(
                b"secretsecret",
                b"test_merch;R1;1547.36;UAH;541963;41****8217;Approved;1100"
            )
        );
        assert_eq!(p.transaction_status(), Some("Approved"));
    }

    #[test]
    fn acknowledgement_at_fixed_time() {
        let mut p = provider();
        p.ingest(&Fields::new().with("orderReference", "R1"));
        let ack = p.build_acknowledgement_at(1_700_000_000);

        assert_eq!(ack["orderReference"], "R1");
        assert_eq!(ack["status"], "accept");
        assert_eq!(ack["time"], 1_700_000_000);
        assert_eq!(
            ack["signature"],
            hmac_md5_hex(b"secretsecret", b"R1;accept;1700000000")
        );
    }
}
