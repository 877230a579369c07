//! Tree data model: a recursive value type and the two mapping shapes built on it.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::error::{DomainError, DomainResult};

/// Nested mapping representing a hierarchical document.
pub type Tree = IndexMap<String, Value>;

/// Flat mapping from a delimiter-joined path key to its leaf value.
pub type FlatEntries = IndexMap<String, Value>;

/// Platform path separator, used when no delimiter is configured.
pub const DEFAULT_DELIMITER: &str = std::path::MAIN_SEPARATOR_STR;

/// A document value: scalar, ordered sequence, or nested mapping.
///
/// `PartialEq` follows IEEE float semantics, so a `NaN` leaf never equals
/// itself; `merge` uses its own bitwise comparison for floats.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Tree),
}

impl Value {
    /// Short type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Tree> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a document root into a tree.
    ///
    /// `Null` (an empty document) becomes an empty tree; any other non-mapping
    /// root is rejected.
    pub fn into_tree(self) -> DomainResult<Tree> {
        match self {
            Value::Mapping(map) => Ok(map),
            Value::Null => Ok(Tree::new()),
            other => Err(DomainError::InvalidRoot { kind: other.kind() }),
        }
    }

    /// Look up the value stored under a path key.
    ///
    /// A literal key at the current level wins over splitting, so keys that
    /// were collapsed by a depth limit are still found.
    pub fn get_path(&self, key: &str, delimiter: &str) -> Option<&Value> {
        let Value::Mapping(map) = self else {
            return None;
        };
        if let Some(value) = map.get(key) {
            return Some(value);
        }
        if delimiter.is_empty() {
            return None;
        }
        let (head, rest) = key.split_once(delimiter)?;
        map.get(head)?.get_path(rest, delimiter)
    }

    /// Infer a typed value from command-line text.
    ///
    /// Recognizes booleans, null, integers, floats and inline JSON
    /// arrays/objects; everything else stays a string.
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "null" | "~" => return Value::Null,
            _ => {}
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Integer(int);
        }
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(float) = trimmed.parse::<f64>() {
                return Value::Float(float);
            }
        }
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
                return Value::from(json);
            }
        }
        Value::String(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Sequence(_) | Value::Mapping(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = DomainError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<DomainResult<Vec<_>>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut tree = Tree::with_capacity(map.len());
                for (key, value) in map {
                    tree.insert(yaml_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(tree)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

/// Mapping keys are strings; scalar YAML keys are stringified.
fn yaml_key(key: serde_yaml::Value) -> DomainResult<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(DomainError::UnsupportedKey(format!("{other:?}"))),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        Value::Mapping(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_json_object_when_converting_then_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": {"m": true, "b": null}}));
        let tree = value.into_tree().expect("mapping root");
        let keys: Vec<_> = tree.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        let nested: Vec<_> = tree["a"].as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(nested, vec!["m", "b"]);
    }

    #[test]
    fn given_yaml_with_scalar_keys_when_converting_then_stringifies_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nname: x\n").unwrap();
        let tree = Value::try_from(yaml).unwrap().into_tree().unwrap();
        assert_eq!(tree.get("1"), Some(&Value::from("one")));
        assert_eq!(tree.get("true"), Some(&Value::from("yes")));
        assert_eq!(tree.get("name"), Some(&Value::from("x")));
    }

    #[test]
    fn given_yaml_with_sequence_key_when_converting_then_rejects() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: 1\n").unwrap();
        let result = Value::try_from(yaml);
        assert!(matches!(result, Err(DomainError::UnsupportedKey(_))));
    }

    #[test]
    fn given_scalar_root_when_into_tree_then_invalid_root() {
        let result = Value::from(3).into_tree();
        assert_eq!(result, Err(DomainError::InvalidRoot { kind: "integer" }));
        assert_eq!(Value::Null.into_tree(), Ok(Tree::new()));
    }

    #[test]
    fn given_nested_tree_when_get_path_then_descends_and_prefers_literal_keys() {
        let value = Value::from(json!({"a": {"b": {"c": 1}}, "x/y": {"z": 2}}));
        assert_eq!(value.get_path("a/b/c", "/"), Some(&Value::Integer(1)));
        assert_eq!(value.get_path("x/y/z", "/"), Some(&Value::Integer(2)));
        assert_eq!(value.get_path("a/missing", "/"), None);
        assert_eq!(value.get_path("a/b/c", ""), None);
    }

    #[test]
    fn test_infer() {
        assert_eq!(Value::infer("true"), Value::Bool(true));
        assert_eq!(Value::infer("False"), Value::Bool(false));
        assert_eq!(Value::infer("~"), Value::Null);
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("-1.5"), Value::Float(-1.5));
        assert_eq!(Value::infer("inf"), Value::from("inf"));
        assert_eq!(
            Value::infer("[1, \"a\"]"),
            Value::Sequence(vec![Value::Integer(1), Value::from("a")])
        );
        assert_eq!(Value::infer("{broken"), Value::from("{broken"));
        assert_eq!(Value::infer("hello world"), Value::from("hello world"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(
            Value::from(json!({"a": [1, 2]})).to_string(),
            r#"{"a":[1,2]}"#
        );
    }
}
