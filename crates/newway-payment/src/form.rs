//! Self-submitting HTML checkout forms.

use crate::fields::{FieldValue, Fields};

/// A POST form pointed at a provider endpoint.
#[derive(Debug, Clone)]
pub struct HtmlForm {
    action: &'static str,
    accept_charset: Option<&'static str>,
    prefix: Option<String>,
    inputs: Vec<String>,
    button: String,
}

impl HtmlForm {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            accept_charset: None,
            prefix: None,
            inputs: Vec::new(),
            button: r#"<input type="submit" value="send" />"#.to_string(),
        }
    }

    pub fn accept_charset(mut self, charset: &'static str) -> Self {
        self.accept_charset = Some(charset);
        self
    }

    /// Markup inserted verbatim before the hidden inputs.
    pub fn prefix(mut self, markup: Option<&str>) -> Self {
        self.prefix = markup.filter(|m| !m.is_empty()).map(str::to_string);
        self
    }

    /// Add one hidden input per whitelisted field, in the order of `fields`.
    /// List values become repeated `name[]` inputs.
    pub fn hidden_fields(mut self, fields: &Fields, whitelist: &[&str]) -> Self {
        for (name, value) in fields.iter() {
            if !whitelist.contains(&name) {
                continue;
            }
            match value {
                FieldValue::Text(text) => self.inputs.push(hidden_input(name, text)),
                FieldValue::List(items) => {
                    let list_name = format!("{name}[]");
                    for item in items {
                        self.inputs.push(hidden_input(&list_name, item));
                    }
                }
            }
        }
        self
    }

    pub fn button(mut self, markup: impl Into<String>) -> Self {
        self.button = markup.into();
        self
    }

    pub fn render(&self) -> String {
        let charset = self
            .accept_charset
            .map(|c| format!(r#" accept-charset="{c}""#))
            .unwrap_or_default();

        let mut body: Vec<&str> = Vec::with_capacity(self.inputs.len() + 2);
        if let Some(prefix) = &self.prefix {
            body.push(prefix);
        }
        body.extend(self.inputs.iter().map(String::as_str));
        body.push(&self.button);

        format!(
            "<form method=\"post\" action=\"{}\"{}>\r\n{}\r\n</form>",
            self.action,
            charset,
            body.join("\r\n")
        )
    }
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        html_escape(name),
        html_escape(value)
    )
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Extract the `value` of every hidden input called `name`, unescaped.
///
/// Reads back forms rendered by [`HtmlForm`], e.g. to log or store the
/// signature a checkout page was sent with. It only understands the
/// `name="..." value="..."` attribute order this module emits and is not a
/// general HTML parser.
///
/// ```
/// use payment::form::{hidden_values, HtmlForm};
/// use payment::Fields;
///
/// let fields = Fields::new().with("signature", "a+b/c=").with("items", vec!["A", "B"]);
/// let html = HtmlForm::new("https://pay.example.com")
///     .hidden_fields(&fields, &["signature", "items"])
///     .render();
///
/// assert_eq!(hidden_values(&html, "signature"), ["a+b/c="]);
/// assert_eq!(hidden_values(&html, "items[]"), ["A", "B"]);
/// ```
pub fn hidden_values(html: &str, name: &str) -> Vec<String> {
    let marker = format!(r#"name="{}" value=""#, html_escape(name));
    html.match_indices(&marker)
        .filter_map(|(idx, _)| {
            let rest = &html[idx + marker.len()..];
            rest.find('"').map(|end| html_unescape(&rest[..end]))
        })
        .collect()
}

fn html_unescape(s: &str) -> String {
    s.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_escapes_special_chars() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn only_whitelisted_fields_are_rendered() {
        let fields = Fields::new()
            .with("amount", "10")
            .with("secret", "nope")
            .with("items", vec!["A", "B"]);
        let html = HtmlForm::new("https://pay.example.com")
            .hidden_fields(&fields, &["amount", "items"])
            .render();

        assert!(html.starts_with(r#"<form method="post" action="https://pay.example.com">"#));
        assert_eq!(hidden_values(&html, "amount"), ["10"]);
        assert_eq!(hidden_values(&html, "items[]"), ["A", "B"]);
        assert!(!html.contains("secret"));
        assert!(html.ends_with("</form>"));
    }

    #[test]
    fn values_are_escaped_and_recoverable() {
        let fields = Fields::new().with("description", r#"5" & <b>"#);
        let html = HtmlForm::new("https://pay.example.com")
            .hidden_fields(&fields, &["description"])
            .render();

        assert!(!html.contains("<b>"));
        assert_eq!(hidden_values(&html, "description"), [r#"5" & <b>"#]);
    }

    #[test]
    fn prefix_and_charset() {
        let html = HtmlForm::new("https://pay.example.com")
            .accept_charset("utf-8")
            .prefix(Some("<p>Order #1</p>"))
            .render();
        assert!(html.contains(r#"accept-charset="utf-8""#));
        assert!(html.contains("<p>Order #1</p>\r\n<input type=\"submit\""));
    }
}
