use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page's serialized visual structure: always a plain (non-array) JSON object.
///
/// Either a single root node (the object carries a string `type`) or a keyed map whose
/// object values are top-level nodes in stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutDocument(Map<String, Value>);

impl LayoutDocument {
    /// Accepts only JSON objects; every other value yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// True when the document itself is a node rather than a keyed map of nodes.
    pub fn is_single_root(&self) -> bool {
        matches!(self.0.get("type"), Some(Value::String(_)))
    }
}

impl From<Map<String, Value>> for LayoutDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The `layout` column exactly as stored. Older rows carry a JSON-encoded string, newer
/// rows a native JSON value; readers must accept both.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLayout {
    EncodedString(String),
    StructuredValue(Value),
    Absent,
}

impl From<Option<Value>> for RawLayout {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawLayout::Absent,
            Some(Value::String(s)) => RawLayout::EncodedString(s),
            Some(other) => RawLayout::StructuredValue(other),
        }
    }
}

impl From<Value> for RawLayout {
    fn from(value: Value) -> Self {
        RawLayout::from(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_layout_classifies_column_values() {
        assert_eq!(RawLayout::from(None), RawLayout::Absent);
        assert_eq!(RawLayout::from(Some(Value::Null)), RawLayout::Absent);
        assert_eq!(
            RawLayout::from(json!("{\"a\":1}")),
            RawLayout::EncodedString("{\"a\":1}".to_string())
        );
        assert_eq!(
            RawLayout::from(json!([1, 2])),
            RawLayout::StructuredValue(json!([1, 2]))
        );
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(LayoutDocument::from_value(json!([])).is_none());
        assert!(LayoutDocument::from_value(json!(3)).is_none());
        assert!(LayoutDocument::from_value(json!({})).is_some());
    }

    #[test]
    fn test_single_root_detection() {
        let single = LayoutDocument::from_value(json!({"type": "Container"})).unwrap();
        let keyed = LayoutDocument::from_value(json!({"root": {"type": "Container"}})).unwrap();
        assert!(single.is_single_root());
        assert!(!keyed.is_single_root());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let doc = LayoutDocument::from_value(json!({"root": {"type": "Divider"}})).unwrap();
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out, json!({"root": {"type": "Divider"}}));
    }
}
