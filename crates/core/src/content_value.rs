//! Content record types and typed value coercion.
//!
//! Stored content values are always strings; [`coerce`] interprets them
//! according to the record's [`ValueType`]. Coercion never fails loudly: an
//! unusable value yields `None` and the resolution chain falls through to
//! the next candidate.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Dotted content key, e.g. `hero.title` or `pricing.plans.0.label`.
static CONTENT_KEY_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("valid regex")
});

/// Maximum length of a content key.
pub const MAX_CONTENT_KEY_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Value type
// ---------------------------------------------------------------------------

/// Declared type of a stored content value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Text,
    Number,
    Boolean,
    Json,
    Image,
    Link,
    Html,
    RichText,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Json => "JSON",
            Self::Image => "IMAGE",
            Self::Link => "LINK",
            Self::Html => "HTML",
            Self::RichText => "RICH_TEXT",
        }
    }

    /// Parse the persisted column value.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "TEXT" => Ok(Self::Text),
            "NUMBER" => Ok(Self::Number),
            "BOOLEAN" => Ok(Self::Boolean),
            "JSON" => Ok(Self::Json),
            "IMAGE" => Ok(Self::Image),
            "LINK" => Ok(Self::Link),
            "HTML" => Ok(Self::Html),
            "RICH_TEXT" => Ok(Self::RichText),
            _ => Err(CoreError::Validation(format!(
                "Invalid content type '{s}'. Must be one of: TEXT, NUMBER, BOOLEAN, JSON, IMAGE, LINK, HTML, RICH_TEXT"
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Content record
// ---------------------------------------------------------------------------

/// A persisted content override, owned by one page translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub language_id: String,
}

// ---------------------------------------------------------------------------
// Typed values
// ---------------------------------------------------------------------------

/// A stored value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Json(Value),
    Image(String),
    Link(String),
    Html(String),
    RichText(String),
}

impl TypedValue {
    /// Render as a display string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Text(s) | Self::Image(s) | Self::Link(s) | Self::Html(s) | Self::RichText(s) => {
                s.clone()
            }
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Interpret as a number. Text-like values are parsed; booleans are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) | Self::Html(s) | Self::RichText(s) => parse_number(s),
            Self::Json(v) => v.as_f64(),
            Self::Boolean(_) | Self::Image(_) | Self::Link(_) => None,
        }
    }

    /// Interpret as a boolean using the same `"true"` / `"1"` rule as coercion.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => Some(parse_bool(s)),
            Self::Json(Value::Bool(b)) => Some(*b),
            Self::Json(_) | Self::Image(_) | Self::Link(_) | Self::Html(_) | Self::RichText(_) => {
                None
            }
        }
    }

    /// Convert into a JSON value.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(v) => v,
            Self::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(b) => Value::Bool(b),
            Self::Text(s) | Self::Image(s) | Self::Link(s) | Self::Html(s) | Self::RichText(s) => {
                Value::String(s)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Coerce a raw stored string into a typed value.
///
/// Returns `None` when the value is unusable: blank input of any type, an
/// unparsable or non-finite NUMBER, invalid JSON, or JSON `null`.
pub fn coerce(raw: &str, value_type: ValueType) -> Option<TypedValue> {
    if raw.trim().is_empty() {
        return None;
    }
    match value_type {
        ValueType::Text => Some(TypedValue::Text(raw.to_string())),
        ValueType::Html => Some(TypedValue::Html(raw.to_string())),
        ValueType::RichText => Some(TypedValue::RichText(raw.to_string())),
        ValueType::Number => parse_number(raw).map(TypedValue::Number),
        ValueType::Boolean => Some(TypedValue::Boolean(parse_bool(raw))),
        ValueType::Json => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) | Err(_) => None,
            Ok(v) => Some(TypedValue::Json(v)),
        },
        ValueType::Image => Some(TypedValue::Image(raw.to_string())),
        ValueType::Link => Some(TypedValue::Link(raw.to_string())),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(raw: &str) -> bool {
    raw == "true" || raw == "1"
}

// ---------------------------------------------------------------------------
// Write-time validation
// ---------------------------------------------------------------------------

/// Validate a content key: non-empty dotted segments within the length limit.
pub fn validate_content_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() {
        return Err(CoreError::Validation(
            "Content key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_CONTENT_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "Content key too long: {} chars (max {MAX_CONTENT_KEY_LEN})",
            key.len()
        )));
    }
    if !CONTENT_KEY_RE.is_match(key) {
        return Err(CoreError::Validation(format!(
            "Invalid content key '{key}'. Use dot-separated segments of letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Validate that a raw value is syntactically valid for its declared type.
///
/// Blank values are always accepted so editors can clear a slot.
pub fn validate_content_value(raw: &str, value_type: ValueType) -> Result<(), CoreError> {
    if raw.trim().is_empty() {
        return Ok(());
    }
    match value_type {
        ValueType::Number => {
            if parse_number(raw).is_none() {
                return Err(CoreError::Validation(format!(
                    "'{raw}' is not a valid NUMBER value"
                )));
            }
        }
        ValueType::Boolean => {
            if !matches!(raw, "true" | "false" | "1" | "0") {
                return Err(CoreError::Validation(format!(
                    "'{raw}' is not a valid BOOLEAN value. Must be one of: true, false, 1, 0"
                )));
            }
        }
        ValueType::Json => {
            if let Err(e) = serde_json::from_str::<Value>(raw) {
                return Err(CoreError::Validation(format!("Invalid JSON value: {e}")));
            }
        }
        ValueType::Text
        | ValueType::Image
        | ValueType::Link
        | ValueType::Html
        | ValueType::RichText => {}
    }
    Ok(())
}

/// Validate a full record before it is written.
pub fn validate_content_record(record: &ContentRecord) -> Result<(), CoreError> {
    validate_content_key(&record.key)?;
    validate_content_value(&record.value, record.value_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    // --- Coercion ---

    #[test]
    fn text_like_types_pass_through() {
        assert_eq!(
            coerce(" Hello ", ValueType::Text),
            Some(TypedValue::Text(" Hello ".into()))
        );
        assert_eq!(
            coerce("<b>x</b>", ValueType::Html),
            Some(TypedValue::Html("<b>x</b>".into()))
        );
        assert_eq!(
            coerce("para", ValueType::RichText),
            Some(TypedValue::RichText("para".into()))
        );
    }

    #[test]
    fn blank_values_are_absent_for_every_type() {
        for ty in [
            ValueType::Text,
            ValueType::Number,
            ValueType::Boolean,
            ValueType::Json,
            ValueType::Image,
            ValueType::Link,
        ] {
            assert_eq!(coerce("   ", ty), None, "{ty}");
        }
    }

    #[test]
    fn number_parses_floats() {
        assert_eq!(coerce("42", ValueType::Number), Some(TypedValue::Number(42.0)));
        assert_eq!(coerce(" 3.5 ", ValueType::Number), Some(TypedValue::Number(3.5)));
        assert_eq!(coerce("-1e3", ValueType::Number), Some(TypedValue::Number(-1000.0)));
    }

    #[test]
    fn non_numeric_number_is_absent() {
        assert_eq!(coerce("abc", ValueType::Number), None);
        assert_eq!(coerce("NaN", ValueType::Number), None);
        assert_eq!(coerce("inf", ValueType::Number), None);
    }

    #[test]
    fn boolean_true_only_for_true_or_one() {
        assert_eq!(coerce("true", ValueType::Boolean), Some(TypedValue::Boolean(true)));
        assert_eq!(coerce("1", ValueType::Boolean), Some(TypedValue::Boolean(true)));
        assert_eq!(coerce("TRUE", ValueType::Boolean), Some(TypedValue::Boolean(false)));
        assert_eq!(coerce("yes", ValueType::Boolean), Some(TypedValue::Boolean(false)));
        assert_eq!(coerce("0", ValueType::Boolean), Some(TypedValue::Boolean(false)));
    }

    #[test]
    fn json_parses_or_is_absent() {
        assert_eq!(
            coerce(r#"{"a":[1,2]}"#, ValueType::Json),
            Some(TypedValue::Json(json!({"a": [1, 2]})))
        );
        assert_eq!(coerce("{not json", ValueType::Json), None);
        assert_eq!(coerce("null", ValueType::Json), None);
    }

    #[test]
    fn image_and_link_accept_any_non_blank_string() {
        assert_eq!(
            coerce("not-a-url", ValueType::Link),
            Some(TypedValue::Link("not-a-url".into()))
        );
        assert_eq!(
            coerce("/media/a.png", ValueType::Image),
            Some(TypedValue::Image("/media/a.png".into()))
        );
    }

    // --- Conversions ---

    #[test]
    fn typed_value_conversions() {
        assert_eq!(TypedValue::Number(2.5).as_string(), "2.5");
        assert_eq!(TypedValue::Json(json!("x")).as_string(), "x");
        assert_eq!(TypedValue::Json(json!({"a": 1})).as_string(), r#"{"a":1}"#);
        assert_eq!(TypedValue::Text("12".into()).as_number(), Some(12.0));
        assert_eq!(TypedValue::Boolean(true).as_number(), None);
        assert_eq!(TypedValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(TypedValue::Link("x".into()).as_bool(), None);
        assert_eq!(TypedValue::Boolean(true).into_json(), json!(true));
    }

    // --- Validation ---

    #[test]
    fn validate_content_key_accepts_dotted_keys() {
        assert!(validate_content_key("hero.title").is_ok());
        assert!(validate_content_key("pricing.plans.0.cta-label").is_ok());
    }

    #[test]
    fn validate_content_key_rejects_malformed() {
        assert_matches!(validate_content_key(""), Err(CoreError::Validation(_)));
        assert!(validate_content_key("hero..title").is_err());
        assert!(validate_content_key(".hero").is_err());
        assert!(validate_content_key("hero title").is_err());
        let long = "k".repeat(MAX_CONTENT_KEY_LEN + 1);
        let err = validate_content_key(&long).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn validate_content_value_checks_type_syntax() {
        assert!(validate_content_value("12.5", ValueType::Number).is_ok());
        assert!(validate_content_value("twelve", ValueType::Number).is_err());
        assert!(validate_content_value("0", ValueType::Boolean).is_ok());
        assert!(validate_content_value("yes", ValueType::Boolean).is_err());
        assert!(validate_content_value("[1, 2]", ValueType::Json).is_ok());
        let err = validate_content_value("{", ValueType::Json).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
        assert!(validate_content_value("", ValueType::Json).is_ok());
    }

    #[test]
    fn value_type_parse_and_serde_agree() {
        assert_eq!(ValueType::parse("RICH_TEXT").unwrap(), ValueType::RichText);
        assert!(ValueType::parse("rich_text").is_err());
        assert_eq!(
            serde_json::to_value(ValueType::RichText).unwrap(),
            json!("RICH_TEXT")
        );
    }

    #[test]
    fn content_record_uses_wire_field_names() {
        let record: ContentRecord = serde_json::from_value(json!({
            "key": "hero.title",
            "value": "Hi",
            "type": "TEXT",
            "languageId": "en"
        }))
        .unwrap();
        assert_eq!(record.value_type, ValueType::Text);
        assert!(validate_content_record(&record).is_ok());
    }
}
