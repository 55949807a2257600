//! Ordered key/value mappings exchanged with providers.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::PaymentError;

/// A single field value: plain text or an ordered list of texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Text form of the value. Lists are joined with `;`.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(";"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }

    /// Empty text or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    fn from_json(name: &str, value: &Value) -> Result<Option<Self>, PaymentError> {
        let scalar = |v: &Value| -> Result<Option<String>, PaymentError> {
            match v {
                Value::Null => Ok(None),
                Value::String(s) => Ok(Some(s.clone())),
                Value::Number(n) => Ok(Some(n.to_string())),
                Value::Bool(b) => Ok(Some(if *b { "1" } else { "0" }.to_string())),
                _ => Err(PaymentError::Config(format!(
                    "field '{name}' must be a scalar or a list of scalars"
                ))),
            }
        };

        match value {
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    list.push(scalar(item)?.unwrap_or_default());
                }
                Ok(Some(FieldValue::List(list)))
            }
            other => Ok(scalar(other)?.map(FieldValue::Text)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(n: $t) -> Self {
                FieldValue::Text(n.to_string())
            }
        })*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f64);

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Text(if b { "1" } else { "0" }.to_string())
    }
}

impl<T: Into<String>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered field mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    values: IndexMap<String, FieldValue>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Text value of `name`, or `""` when absent.
    pub fn text(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(FieldValue::as_text)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object. `null` members are skipped.
    ///
    /// Numbers keep the text they were written with (`10.00` stays
    /// `"10.00"`), so amounts signed by a provider still verify.
    pub fn from_json(value: &Value) -> Result<Self, PaymentError> {
        let object = value
            .as_object()
            .ok_or_else(|| PaymentError::Config("expected a JSON object".to_string()))?;

        let mut fields = Fields::new();
        for (name, member) in object {
            if let Some(v) = FieldValue::from_json(name, member)? {
                fields.insert(name.clone(), v);
            }
        }
        Ok(fields)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_render_like_their_literals() {
        assert_eq!(FieldValue::from(10).as_text(), "10");
        assert_eq!(FieldValue::from(10.5).as_text(), "10.5");
        assert_eq!(FieldValue::from(true).as_text(), "1");
    }

    #[test]
    fn insertion_order_is_kept() {
        let fields = Fields::new()
            .with("b", "2")
            .with("a", "1")
            .with("b", "3");
        let names: Vec<_> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(fields.text("b"), "3");
        assert_eq!(fields.text("missing"), "");
    }

    #[test]
    fn from_json_handles_scalars_and_lists() {
        let fields = Fields::from_json(&json!({
            "amount": 10,
            "currency": "UAH",
            "sandbox": true,
            "productName": ["A", "B"],
            "skipped": null
        }))
        .unwrap();

        assert_eq!(fields.text("amount"), "10");
        assert_eq!(fields.text("sandbox"), "1");
        assert_eq!(
            fields.get("productName").and_then(FieldValue::as_list),
            Some(&["A".to_string(), "B".to_string()][..])
        );
        assert!(!fields.contains("skipped"));
    }

    #[test]
    fn from_json_keeps_number_text() {
        let value: Value =
            serde_json::from_str(r#"{"amount": 10.00, "price": 1547.360, "count": 2}"#).unwrap();
        let fields = Fields::from_json(&value).unwrap();

        assert_eq!(fields.text("amount"), "10.00");
        assert_eq!(fields.text("price"), "1547.360");
        assert_eq!(fields.text("count"), "2");
    }

    #[test]
    fn from_json_rejects_nested_objects() {
        assert!(Fields::from_json(&json!({"x": {"y": 1}})).is_err());
        assert!(Fields::from_json(&json!([1, 2])).is_err());
    }
}
