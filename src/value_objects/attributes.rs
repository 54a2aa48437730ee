//! Open attribute bag carried by nodes and edges
//!
//! Values come from user input, templates, imported files and generative payloads, so
//! numbers may arrive as JSON numbers, numeric strings (`"12.50"`) or garbage. Every
//! arithmetic read goes through [`AttributeBag::number`], which treats anything
//! non-numeric as zero.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered key/value attributes of a node or edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(IndexMap<String, Value>);

impl AttributeBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a raw value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric read; missing or non-numeric values are 0
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).map(coerce_number).unwrap_or(0.0)
    }

    /// Numeric read falling back to `default` when the value is missing, zero or non-numeric
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        let value = self.number(key);
        if value == 0.0 {
            default
        } else {
            value
        }
    }

    /// Numeric read that distinguishes "absent" from zero
    pub fn maybe_number(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(coerce_number(value)),
        }
    }

    /// Boolean flag; anything but `true` is false
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// String read
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Overlay every entry of `other` onto this bag
    pub fn merge(&mut self, other: &AttributeBag) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<serde_json::Map<String, Value>> for AttributeBag {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// Read any JSON value as a number; non-numeric values are 0
pub(crate) fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// Store a float as a JSON number; non-finite values become 0
pub(crate) fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        let bag = AttributeBag::new()
            .with("ct", json!(45))
            .with("va", json!("12.50"))
            .with("co", json!("n/a"))
            .with("flag", json!(true));

        assert_eq!(bag.number("ct"), 45.0);
        assert_eq!(bag.number("va"), 12.5);
        assert_eq!(bag.number("co"), 0.0);
        assert_eq!(bag.number("flag"), 0.0);
        assert_eq!(bag.number("missing"), 0.0);
    }

    #[test]
    fn test_number_or_falls_back_on_zero() {
        let bag = AttributeBag::new().with("shifts", json!(0)).with("packSize", json!(10));
        assert_eq!(bag.number_or("shifts", 1.0), 1.0);
        assert_eq!(bag.number_or("packSize", 1.0), 10.0);
        assert_eq!(bag.number_or("availableTime", 8.0), 8.0);
    }

    #[test]
    fn test_maybe_number_distinguishes_absent() {
        let bag = AttributeBag::new().with("level", json!(0)).with("gone", Value::Null);
        assert_eq!(bag.maybe_number("level"), Some(0.0));
        assert_eq!(bag.maybe_number("gone"), None);
        assert_eq!(bag.maybe_number("missing"), None);
    }

    #[test]
    fn test_key_order_survives_serialization() {
        let bag = AttributeBag::new().with("z", json!(1)).with("a", json!(2));
        assert_eq!(serde_json::to_string(&bag).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
