use std::time::Duration;

/// Registry name of the Liqpay provider.
pub const LIQPAY: &str = "liqpay";

/// Registry name of the Wayforpay provider.
pub const WAYFORPAY: &str = "wayforpay";

/// Legacy Liqpay checkout endpoint used by the flat-signature form.
pub const LIQPAY_FORM_URL: &str = "https://www.liqpay.ua/api/pay";

/// Base URL of the Liqpay server-to-server API.
pub const LIQPAY_API_URL: &str = "https://www.liqpay.ua/api/";

/// Wayforpay purchase endpoint.
pub const WAYFORPAY_FORM_URL: &str = "https://secure.wayforpay.com/pay";

/// Currencies Liqpay accepts in an outbound form.
pub const LIQPAY_CURRENCIES: &[&str] = &["USD", "EUR", "RUB", "UAH", "GEL"];

/// Currencies Wayforpay accepts in an outbound form.
pub const WAYFORPAY_CURRENCIES: &[&str] = &["USD", "EUR", "RUB", "UAH"];

/// Form languages both providers understand. The first one is the default.
pub const FORM_LANGUAGES: &[&str] = &["ru", "en"];

/// Legacy rouble code some merchants still send.
pub const LEGACY_ROUBLE: &str = "RUR";

/// Code the legacy rouble alias is rewritten to before signing.
pub const ROUBLE: &str = "RUB";

/// Literal status Wayforpay expects in a callback acknowledgement.
pub const WAYFORPAY_ACCEPT: &str = "accept";

/// Date layout for `subscribe_date_start`.
pub const SUBSCRIBE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minimum length of every credential value.
pub const MIN_CREDENTIAL_LENGTH: usize = 5;

/// Default timeout for provider API calls.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// Rewrite the legacy `RUR` alias to `RUB`; every other code passes through.
pub fn normalize_currency(currency: &str) -> &str {
    if currency == LEGACY_ROUBLE {
        ROUBLE
    } else {
        currency
    }
}
