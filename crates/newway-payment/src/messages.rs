//! User-facing message catalogue.
//!
//! Every error this crate surfaces is rendered from a fixed [`MessageKey`]
//! vocabulary in one of the supported [`Locale`]s.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// Language used to render error text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(PaymentError::Config(format!("unsupported locale '{other}'"))),
        }
    }
}

/// Stable message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    ValidationFailed,
    HackAttempt,
    InvalidSignature,
    InvalidAmount,
    InvalidCurrency,
    AmountIsNull,
    CurrencyIsNull,
    CurrencyIsNotSupported,
    DescriptionIsNull,
    ProviderNotFound,
    RequiredFieldsNotProvided,
    // Per-rule details produced by the validator.
    FieldRequired,
    FieldNumeric,
    FieldNotInList,
    FieldInvalidDate,
    FieldInvalidUrl,
    FieldNotBoolean,
    FieldNotArray,
    FieldTooShort,
    FieldSizeMismatch,
}

impl MessageKey {
    pub const ALL: [MessageKey; 20] = [
        MessageKey::ValidationFailed,
        MessageKey::HackAttempt,
        MessageKey::InvalidSignature,
        MessageKey::InvalidAmount,
        MessageKey::InvalidCurrency,
        MessageKey::AmountIsNull,
        MessageKey::CurrencyIsNull,
        MessageKey::CurrencyIsNotSupported,
        MessageKey::DescriptionIsNull,
        MessageKey::ProviderNotFound,
        MessageKey::RequiredFieldsNotProvided,
        MessageKey::FieldRequired,
        MessageKey::FieldNumeric,
        MessageKey::FieldNotInList,
        MessageKey::FieldInvalidDate,
        MessageKey::FieldInvalidUrl,
        MessageKey::FieldNotBoolean,
        MessageKey::FieldNotArray,
        MessageKey::FieldTooShort,
        MessageKey::FieldSizeMismatch,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MessageKey::ValidationFailed => "validation_failed",
            MessageKey::HackAttempt => "hack_attempt",
            MessageKey::InvalidSignature => "invalid_signature",
            MessageKey::InvalidAmount => "invalid_amount",
            MessageKey::InvalidCurrency => "invalid_currency",
            MessageKey::AmountIsNull => "amount_is_null",
            MessageKey::CurrencyIsNull => "currency_is_null",
            MessageKey::CurrencyIsNotSupported => "currency_is_not_supported",
            MessageKey::DescriptionIsNull => "description_is_null",
            MessageKey::ProviderNotFound => "provider_not_found",
            MessageKey::RequiredFieldsNotProvided => "required_fields_not_provided",
            MessageKey::FieldRequired => "field_required",
            MessageKey::FieldNumeric => "field_numeric",
            MessageKey::FieldNotInList => "field_not_in_list",
            MessageKey::FieldInvalidDate => "field_invalid_date",
            MessageKey::FieldInvalidUrl => "field_invalid_url",
            MessageKey::FieldNotBoolean => "field_not_boolean",
            MessageKey::FieldNotArray => "field_not_array",
            MessageKey::FieldTooShort => "field_too_short",
            MessageKey::FieldSizeMismatch => "field_size_mismatch",
        }
    }

    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.english(),
            Locale::Ru => self.russian(),
        }
    }

    fn english(self) -> &'static str {
        match self {
            MessageKey::ValidationFailed => "Validation failed",
            MessageKey::HackAttempt => "Hack attempt",
            MessageKey::InvalidSignature => "Invalid signature",
            MessageKey::InvalidAmount => "Invalid amount",
            MessageKey::InvalidCurrency => "Invalid currency",
            MessageKey::AmountIsNull => "Amount is null",
            MessageKey::CurrencyIsNull => "Currency is null",
            MessageKey::CurrencyIsNotSupported => "Currency is not supported",
            MessageKey::DescriptionIsNull => "Description is null",
            MessageKey::ProviderNotFound => "Provider not found",
            MessageKey::RequiredFieldsNotProvided => "Required fields not provided",
            MessageKey::FieldRequired => "Field is required",
            MessageKey::FieldNumeric => "Field must be a number",
            MessageKey::FieldNotInList => "Field has an unsupported value",
            MessageKey::FieldInvalidDate => "Field is not a valid date",
            MessageKey::FieldInvalidUrl => "Field is not a valid URL",
            MessageKey::FieldNotBoolean => "Field must be true or false",
            MessageKey::FieldNotArray => "Field must be a list",
            MessageKey::FieldTooShort => "Field is too short",
            MessageKey::FieldSizeMismatch => "Field size does not match",
        }
    }

    fn russian(self) -> &'static str {
        match self {
            MessageKey::ValidationFailed => "Ошибка валидации",
            MessageKey::HackAttempt => "Попытка взлома",
            MessageKey::InvalidSignature => "Некорректная подпись",
            MessageKey::InvalidAmount => "Некорректная сумма",
            MessageKey::InvalidCurrency => "Некорректная валюта",
            MessageKey::AmountIsNull => "Сумма не может быть пустой",
            MessageKey::CurrencyIsNull => "Валюта не может быть пустой",
            MessageKey::CurrencyIsNotSupported => "Валюта не поддерживается",
            MessageKey::DescriptionIsNull => "Описание не может быть пустым",
            MessageKey::ProviderNotFound => "Провайдер не найден",
            MessageKey::RequiredFieldsNotProvided => "Не заданы обязательные поля",
            MessageKey::FieldRequired => "Поле обязательно",
            MessageKey::FieldNumeric => "Поле должно быть числом",
            MessageKey::FieldNotInList => "Недопустимое значение поля",
            MessageKey::FieldInvalidDate => "Некорректная дата",
            MessageKey::FieldInvalidUrl => "Некорректный URL",
            MessageKey::FieldNotBoolean => "Поле должно быть логическим",
            MessageKey::FieldNotArray => "Поле должно быть списком",
            MessageKey::FieldTooShort => "Значение поля слишком короткое",
            MessageKey::FieldSizeMismatch => "Размер поля не совпадает",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_both_locales() {
        for key in MessageKey::ALL {
            assert!(!key.text(Locale::En).is_empty(), "{}", key.key());
            assert!(!key.text(Locale::Ru).is_empty(), "{}", key.key());
            assert_ne!(key.text(Locale::En), key.text(Locale::Ru));
        }
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("RU".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!(" en ".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn hack_attempt_reads_naturally() {
        assert_eq!(MessageKey::HackAttempt.text(Locale::En), "Hack attempt");
        assert_eq!(MessageKey::InvalidSignature.key(), "invalid_signature");
    }
}
