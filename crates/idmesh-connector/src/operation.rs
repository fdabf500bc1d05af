//! Abstract object model for connector operations.
//!
//! Connectors exchange objects as [`AttributeSet`]s — named, loosely
//! typed attribute maps — identified by an opaque [`Uid`]. Searches are
//! expressed as a small [`Filter`] tree plus [`PageOptions`], and return
//! a [`SearchResult`] carrying an optional continuation cookie.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Well-known attribute names shared by all object types.
///
/// These are operational attributes layered on top of the target
/// system's native field names. Names wrapped in double underscores
/// never appear in remote payloads.
pub mod wellknown {
    /// Logical name of the object (primary email for accounts and
    /// groups, display name for org units).
    pub const NAME: &str = "__NAME__";
    /// Whether the account is enabled. Inverse of the remote
    /// `suspended` flag.
    pub const ENABLE: &str = "__ENABLE__";
    /// Write-only account password.
    pub const PASSWORD: &str = "__PASSWORD__";
    /// Free-text description.
    pub const DESCRIPTION: &str = "__DESCRIPTION__";
    /// Group emails an account belongs to. Expensive: resolved only
    /// when explicitly requested.
    pub const GROUPS: &str = "__GROUPS__";
    /// Members of a group. Expensive: resolved only when explicitly
    /// requested.
    pub const MEMBERS: &str = "__MEMBERS__";
    /// Account photo as a raw byte blob.
    pub const PHOTO: &str = "__PHOTO__";

    /// Whether a name is an operational (double-underscore) attribute.
    pub fn is_operational(name: &str) -> bool {
        name.starts_with("__") && name.ends_with("__")
    }
}

/// Opaque identifier of a remote object.
///
/// Carries the remote system's concurrency token (HTTP etag) when one
/// was returned alongside the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid {
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
}

impl Uid {
    /// Create a Uid without a revision.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            revision: None,
        }
    }

    /// Create a Uid with a concurrency revision.
    pub fn with_revision(value: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            revision: Some(revision.into()),
        }
    }

    /// The identifier value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The concurrency revision, if the remote system returned one.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Explicit null — present but empty. Distinct from an absent
    /// attribute: mappers use it to report a missing composite parent.
    Null,
    /// String value (also used for timestamps).
    String(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Multi-valued attribute.
    Array(Vec<AttributeValue>),
    /// Structured value.
    Object(serde_json::Map<String, Value>),
}

impl AttributeValue {
    /// String view, when this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view, when this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Array view, when this is multi-valued.
    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is the explicit null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::Array(values.into_iter().map(AttributeValue::String).collect())
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::String(n.to_string())
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => {
                Self::Array(items.into_iter().map(AttributeValue::from).collect())
            }
            Value::Object(map) => Self::Object(map),
        }
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::String(s) => Value::String(s),
            AttributeValue::Integer(i) => Value::Number(i.into()),
            AttributeValue::Float(f) => {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
            AttributeValue::Boolean(b) => Value::Bool(b),
            AttributeValue::Binary(bytes) => Value::Array(
                bytes
                    .into_iter()
                    .map(|b| Value::Number(u64::from(b).into()))
                    .collect(),
            ),
            AttributeValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            AttributeValue::Object(map) => Value::Object(map),
        }
    }
}

/// Named attribute map describing one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: HashMap<String, AttributeValue>,
}

impl AttributeSet {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Look up an attribute by exact name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Whether the attribute is present (including explicit null).
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// String value of an attribute, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    /// Boolean value of an attribute, if present and a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttributeValue::as_bool)
    }

    /// All string entries of a multi-valued attribute.
    ///
    /// Returns `None` when the attribute is absent; non-string entries
    /// are skipped.
    pub fn get_strings(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).and_then(AttributeValue::as_array).map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }

    /// Iterate over name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }

    /// Attribute names present in this set.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.attributes.keys()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Search filter tree.
///
/// Only the shapes a directory connector can translate are
/// representable; richer predicates belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Attribute equals a value.
    Equals {
        /// Attribute name.
        attribute: String,
        /// Expected value.
        value: String,
    },
    /// Attribute starts with a prefix.
    StartsWith {
        /// Attribute name.
        attribute: String,
        /// Required prefix.
        value: String,
    },
    /// All nested filters hold.
    And {
        /// Conjunction operands.
        filters: Vec<Filter>,
    },
}

impl Filter {
    /// Equality filter.
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Prefix filter.
    pub fn starts_with(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::StartsWith {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Conjunction of filters.
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { filters }
    }
}

/// Paging options for a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Requested page size. `Some` selects bounded (single-page)
    /// delivery; `None` exhausts all pages.
    pub page_size: Option<u32>,
    /// Continuation cookie from a previous bounded search.
    pub cursor: Option<String>,
    /// Server-side sort key, when the listing supports one.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub ascending: bool,
}

impl PageOptions {
    /// Bounded paging with the given page size.
    pub fn sized(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ascending: true,
            ..Self::default()
        }
    }

    /// Resume a bounded search from a continuation cookie.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Whether bounded (single-page) delivery was requested.
    pub fn is_bounded(&self) -> bool {
        self.page_size.is_some()
    }
}

/// Result of a search operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Mapped objects, in arrival order.
    pub objects: Vec<AttributeSet>,
    /// Continuation cookie for the next bounded page.
    pub next_cursor: Option<String>,
    /// Whether more results exist beyond this page.
    pub has_more: bool,
}

impl SearchResult {
    /// Result with no continuation.
    pub fn complete(objects: Vec<AttributeSet>) -> Self {
        Self {
            objects,
            next_cursor: None,
            has_more: false,
        }
    }

    /// Result with a continuation cookie.
    pub fn with_next_cursor(objects: Vec<AttributeSet>, cursor: impl Into<String>) -> Self {
        Self {
            objects,
            next_cursor: Some(cursor.into()),
            has_more: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uid_revision_round_trip() {
        let uid = Uid::with_revision("user-1", "\"abc\"");
        assert_eq!(uid.value(), "user-1");
        assert_eq!(uid.revision(), Some("\"abc\""));
        assert_eq!(uid.to_string(), "user-1");

        let bare = Uid::new("user-2");
        assert!(bare.revision().is_none());
    }

    #[test]
    fn attribute_set_builders_and_getters() {
        let attrs = AttributeSet::new()
            .with(wellknown::NAME, "alice@example.com")
            .with(wellknown::ENABLE, true)
            .with("aliases", vec!["a@example.com".to_string()]);

        assert_eq!(attrs.get_str(wellknown::NAME), Some("alice@example.com"));
        assert_eq!(attrs.get_bool(wellknown::ENABLE), Some(true));
        assert_eq!(
            attrs.get_strings("aliases"),
            Some(vec!["a@example.com".to_string()])
        );
        assert!(attrs.get("missing").is_none());
    }

    #[test]
    fn explicit_null_differs_from_absent() {
        let attrs = AttributeSet::new().with("givenName", AttributeValue::Null);
        assert!(attrs.contains("givenName"));
        assert!(attrs.get("givenName").unwrap().is_null());
        assert!(!attrs.contains("familyName"));
    }

    #[test]
    fn json_conversion_preserves_shape() {
        let value: AttributeValue = json!({"type": "work", "primary": true}).into();
        match &value {
            AttributeValue::Object(map) => assert_eq!(map["type"], json!("work")),
            other => panic!("expected object, got {other:?}"),
        }

        let back: Value = value.into();
        assert_eq!(back, json!({"type": "work", "primary": true}));
    }

    #[test]
    fn operational_names() {
        assert!(wellknown::is_operational(wellknown::GROUPS));
        assert!(wellknown::is_operational(wellknown::NAME));
        assert!(!wellknown::is_operational("orgUnitPath"));
        assert!(!wellknown::is_operational("__half"));
    }

    #[test]
    fn filter_constructors() {
        let filter = Filter::and(vec![
            Filter::eq("groupKey", "eng@example.com"),
            Filter::eq("email", "alice@example.com"),
        ]);
        match filter {
            Filter::And { filters } => assert_eq!(filters.len(), 2),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn page_options_bounded_flag() {
        assert!(PageOptions::sized(50).is_bounded());
        assert!(!PageOptions::default().is_bounded());
        let resumed = PageOptions::sized(50).with_cursor("tok");
        assert_eq!(resumed.cursor.as_deref(), Some("tok"));
    }

    #[test]
    fn search_result_cookie_implies_more() {
        let page = SearchResult::with_next_cursor(vec![], "next");
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("next"));
        assert!(!SearchResult::complete(vec![]).has_more);
    }
}
