//! Content resolution chain.
//!
//! A display value is resolved from three tiers, first non-empty wins:
//!
//! 1. the persisted, localized override in the [`ContentMap`];
//! 2. the value the calling component passed in (`prop`);
//! 3. the component's hardcoded default.
//!
//! Malformed stored values are treated as absent, so a bad edit can never
//! break a page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content_value::{coerce, ContentRecord, TypedValue, ValueType};

// ---------------------------------------------------------------------------
// Content map
// ---------------------------------------------------------------------------

/// A raw stored value together with its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl ContentEntry {
    pub fn new(value: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            value: value.into(),
            value_type,
        }
    }
}

/// Stored content for one (page, language) pair, keyed by content key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentMap {
    entries: HashMap<String, ContentEntry>,
}

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for `language_id` from a page's content records.
    ///
    /// Records in other languages are ignored. If a key appears twice the
    /// later record wins.
    pub fn from_records<'a, I>(records: I, language_id: &str) -> Self
    where
        I: IntoIterator<Item = &'a ContentRecord>,
    {
        let entries = records
            .into_iter()
            .filter(|r| r.language_id == language_id)
            .map(|r| {
                (
                    r.key.clone(),
                    ContentEntry::new(r.value.clone(), r.value_type),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ContentEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&ContentEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coerced stored value for `key`, or `None` if missing or unusable.
    pub fn typed(&self, key: &str) -> Option<TypedValue> {
        self.entries
            .get(key)
            .and_then(|e| coerce(&e.value, e.value_type))
    }
}

impl FromIterator<(String, ContentEntry)> for ContentMap {
    fn from_iter<T: IntoIterator<Item = (String, ContentEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolvable shapes
// ---------------------------------------------------------------------------

/// A value shape the resolution chain can produce.
pub trait Resolvable: Sized {
    /// Extract this shape from a coerced stored value.
    fn from_typed(value: TypedValue) -> Option<Self>;

    /// Whether the value counts as present for tier selection.
    fn is_present(&self) -> bool;
}

impl Resolvable for String {
    fn from_typed(value: TypedValue) -> Option<Self> {
        Some(value.as_string())
    }

    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Resolvable for f64 {
    fn from_typed(value: TypedValue) -> Option<Self> {
        value.as_number()
    }

    fn is_present(&self) -> bool {
        self.is_finite()
    }
}

impl Resolvable for bool {
    fn from_typed(value: TypedValue) -> Option<Self> {
        value.as_bool()
    }

    fn is_present(&self) -> bool {
        true
    }
}

impl Resolvable for Value {
    fn from_typed(value: TypedValue) -> Option<Self> {
        Some(value.into_json())
    }

    fn is_present(&self) -> bool {
        !self.is_null()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Which tier of the chain supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Stored,
    Prop,
    Default,
}

/// Resolve `key` and report which tier won.
pub fn resolve_with_source<T: Resolvable>(
    key: &str,
    content: &ContentMap,
    prop: Option<T>,
    default: T,
) -> (T, ResolutionSource) {
    if let Some(stored) = content
        .typed(key)
        .and_then(T::from_typed)
        .filter(T::is_present)
    {
        return (stored, ResolutionSource::Stored);
    }
    if let Some(prop) = prop.filter(T::is_present) {
        return (prop, ResolutionSource::Prop);
    }
    (default, ResolutionSource::Default)
}

/// Resolve `key` through the stored → prop → default chain.
pub fn resolve<T: Resolvable>(key: &str, content: &ContentMap, prop: Option<T>, default: T) -> T {
    resolve_with_source(key, content, prop, default).0
}

pub fn resolve_string(
    key: &str,
    content: &ContentMap,
    prop: Option<&str>,
    default: &str,
) -> String {
    resolve(
        key,
        content,
        prop.map(str::to_string),
        default.to_string(),
    )
}

pub fn resolve_number(key: &str, content: &ContentMap, prop: Option<f64>, default: f64) -> f64 {
    resolve(key, content, prop, default)
}

pub fn resolve_boolean(key: &str, content: &ContentMap, prop: Option<bool>, default: bool) -> bool {
    resolve(key, content, prop, default)
}

pub fn resolve_json(key: &str, content: &ContentMap, prop: Option<Value>, default: Value) -> Value {
    resolve(key, content, prop, default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, &str, ValueType)]) -> ContentMap {
        pairs
            .iter()
            .map(|(k, v, t)| (k.to_string(), ContentEntry::new(*v, *t)))
            .collect()
    }

    // --- Precedence ---

    #[test]
    fn empty_map_without_prop_returns_default() {
        let content = ContentMap::new();
        assert_eq!(
            resolve_string("hero.title", &content, None, "Welcome"),
            "Welcome"
        );
    }

    #[test]
    fn whitespace_stored_value_falls_through_to_prop() {
        let content = map(&[("hero.title", "  ", ValueType::Text)]);
        assert_eq!(
            resolve_string("hero.title", &content, Some("Prop Title"), "Welcome"),
            "Prop Title"
        );
    }

    #[test]
    fn stored_value_wins_over_prop_and_default() {
        let content = map(&[("hero.title", "Stored", ValueType::Text)]);
        let (value, source) = resolve_with_source(
            "hero.title",
            &content,
            Some("Prop".to_string()),
            "Default".to_string(),
        );
        assert_eq!(value, "Stored");
        assert_eq!(source, ResolutionSource::Stored);
    }

    #[test]
    fn blank_prop_falls_through_to_default() {
        let content = ContentMap::new();
        let (value, source) =
            resolve_with_source("k", &content, Some("   ".to_string()), "D".to_string());
        assert_eq!(value, "D");
        assert_eq!(source, ResolutionSource::Default);
    }

    #[test]
    fn stored_text_is_returned_untrimmed() {
        let content = map(&[("k", " padded ", ValueType::Text)]);
        assert_eq!(resolve_string("k", &content, None, "d"), " padded ");
    }

    // --- Coercion fall-through ---

    #[test]
    fn unparsable_number_falls_through() {
        let content = map(&[("stats.count", "lots", ValueType::Number)]);
        assert_eq!(resolve_number("stats.count", &content, Some(7.0), 0.0), 7.0);
        assert_eq!(resolve_number("stats.count", &content, None, 3.0), 3.0);
    }

    #[test]
    fn stored_number_wins() {
        let content = map(&[("stats.count", "12", ValueType::Number)]);
        assert_eq!(resolve_number("stats.count", &content, Some(7.0), 0.0), 12.0);
    }

    #[test]
    fn non_finite_prop_number_is_absent() {
        let content = ContentMap::new();
        assert_eq!(resolve_number("n", &content, Some(f64::NAN), 1.0), 1.0);
    }

    #[test]
    fn invalid_json_falls_through_to_prop() {
        let content = map(&[("features.items", "[1, 2", ValueType::Json)]);
        let value = resolve_json(
            "features.items",
            &content,
            Some(json!(["a"])),
            json!([]),
        );
        assert_eq!(value, json!(["a"]));
    }

    #[test]
    fn valid_json_is_parsed() {
        let content = map(&[("features.items", r#"[{"title":"Fast"}]"#, ValueType::Json)]);
        let value = resolve_json("features.items", &content, None, json!([]));
        assert_eq!(value, json!([{"title": "Fast"}]));
    }

    #[test]
    fn null_prop_json_falls_through() {
        let content = ContentMap::new();
        let value = resolve_json("k", &content, Some(Value::Null), json!({"d": 1}));
        assert_eq!(value, json!({"d": 1}));
    }

    #[test]
    fn stored_boolean_overrides_prop() {
        let content = map(&[("nav.sticky", "0", ValueType::Boolean)]);
        assert!(!resolve_boolean("nav.sticky", &content, Some(true), true));
        let content = map(&[("nav.sticky", "1", ValueType::Boolean)]);
        assert!(resolve_boolean("nav.sticky", &content, Some(false), false));
    }

    #[test]
    fn blank_stored_boolean_falls_through() {
        let content = map(&[("nav.sticky", "", ValueType::Boolean)]);
        assert!(resolve_boolean("nav.sticky", &content, Some(true), false));
    }

    #[test]
    fn number_typed_value_resolves_as_string() {
        let content = map(&[("pricing.amount", "19.5", ValueType::Number)]);
        assert_eq!(resolve_string("pricing.amount", &content, None, "0"), "19.5");
    }

    #[test]
    fn boolean_typed_value_does_not_resolve_as_number() {
        let content = map(&[("k", "true", ValueType::Boolean)]);
        assert_eq!(resolve_number("k", &content, None, 5.0), 5.0);
    }

    // --- Map construction ---

    #[test]
    fn from_records_filters_by_language_and_last_wins() {
        let records = vec![
            ContentRecord {
                key: "hero.title".into(),
                value: "Hello".into(),
                value_type: ValueType::Text,
                language_id: "en".into(),
            },
            ContentRecord {
                key: "hero.title".into(),
                value: "Bonjour".into(),
                value_type: ValueType::Text,
                language_id: "fr".into(),
            },
            ContentRecord {
                key: "hero.title".into(),
                value: "Hi".into(),
                value_type: ValueType::Text,
                language_id: "en".into(),
            },
        ];
        let en = ContentMap::from_records(&records, "en");
        assert_eq!(en.len(), 1);
        assert_eq!(resolve_string("hero.title", &en, None, "x"), "Hi");
        let fr = ContentMap::from_records(&records, "fr");
        assert_eq!(resolve_string("hero.title", &fr, None, "x"), "Bonjour");
        let de = ContentMap::from_records(&records, "de");
        assert!(de.is_empty());
    }

    #[test]
    fn content_map_deserializes_from_plain_object() {
        let content: ContentMap = serde_json::from_value(json!({
            "hero.title": {"value": "Hi", "type": "TEXT"}
        }))
        .unwrap();
        assert_eq!(resolve_string("hero.title", &content, None, "x"), "Hi");
    }
}
