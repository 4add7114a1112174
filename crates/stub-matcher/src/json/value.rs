//! In-memory JSON value model used by the comparator.
//!
//! Every JSON number is held as an `f64`, so `1` and `1.0` are the same value
//! and integers beyond 2^53 lose precision. Objects are key-sorted maps; a
//! document that repeats a key inside one object is rejected at parse time.

use crate::error::MatchError;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Object body: unique keys, ordering irrelevant for matching.
pub type JsonObject = BTreeMap<String, JsonValue>;

/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Document order is kept for serialization only.
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

/// Dynamic kind of a [`JsonValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl JsonValue {
    /// Parse a complete JSON document.
    ///
    /// Trailing characters, syntax errors and duplicate object keys are all
    /// reported as [`MatchError::MalformedInput`].
    pub fn parse(text: &str) -> Result<JsonValue, MatchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a document whose root must be an object.
    ///
    /// Empty or whitespace-only text is the empty object.
    pub fn parse_object(text: &str) -> Result<JsonObject, MatchError> {
        if text.trim().is_empty() {
            return Ok(JsonObject::new());
        }
        match Self::parse(text)? {
            JsonValue::Object(object) => Ok(object),
            other => Err(MatchError::NotAnObject(other.kind())),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            JsonValue::Null => ValueKind::Null,
            JsonValue::Bool(_) => ValueKind::Bool,
            JsonValue::Number(_) => ValueKind::Number,
            JsonValue::String(_) => ValueKind::String,
            JsonValue::Array(_) => ValueKind::Array,
            JsonValue::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Serialize to JSON text without insignificant whitespace.
    pub fn to_compact_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            // Always `Some` unless serde_json is built with `arbitrary_precision`.
            serde_json::Value::Number(n) => {
                n.as_f64().map_or(JsonValue::Null, JsonValue::Number)
            }
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for JsonValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Number(n) => {
                // Integral values print as integers: `1`, not `1.0`.
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(value as f64))
    }

    fn visit_u64<E>(self, value: u64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(value as f64))
    }

    fn visit_f64<E>(self, value: f64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(value))
    }

    fn visit_none<E>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JsonValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_unit<E>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = JsonObject::new();
        while let Some(key) = map.next_key::<String>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            let value = map.next_value()?;
            object.insert(key, value);
        }
        Ok(JsonValue::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_kinds() {
        let value =
            JsonValue::parse(r#"{"n":null,"b":true,"x":1.5,"s":"hi","a":[1,"two"],"o":{}}"#)
                .unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["n"], JsonValue::Null);
        assert_eq!(object["b"], JsonValue::Bool(true));
        assert_eq!(object["x"], JsonValue::Number(1.5));
        assert_eq!(object["s"], JsonValue::String("hi".to_string()));
        assert_eq!(
            object["a"],
            JsonValue::Array(vec![
                JsonValue::Number(1.0),
                JsonValue::String("two".to_string())
            ])
        );
        assert_eq!(object["o"].kind(), ValueKind::Object);
    }

    #[test]
    fn test_integer_and_float_are_the_same_number() {
        assert_eq!(JsonValue::parse("1").unwrap(), JsonValue::parse("1.0").unwrap());
        assert_eq!(JsonValue::parse("1e2").unwrap(), JsonValue::Number(100.0));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for text in ["{", "{\"a\":}", "[1,]", "{} trailing", "nul", ""] {
            assert!(
                matches!(JsonValue::parse(text), Err(MatchError::MalformedInput(_))),
                "expected malformed input for {text:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_duplicate_keys() {
        let err = JsonValue::parse(r#"{"a":1,"a":2}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate key `a`"));

        // Same key in different objects is fine
        assert!(JsonValue::parse(r#"{"a":{"a":1}}"#).is_ok());
    }

    #[test]
    fn test_parse_object() {
        assert!(JsonValue::parse_object("").unwrap().is_empty());
        assert!(JsonValue::parse_object("  \n").unwrap().is_empty());
        assert_eq!(JsonValue::parse_object(r#"{"id":5}"#).unwrap().len(), 1);
        assert_eq!(
            JsonValue::parse_object("[1,2]"),
            Err(MatchError::NotAnObject(ValueKind::Array))
        );
        assert_eq!(
            JsonValue::parse_object("null"),
            Err(MatchError::NotAnObject(ValueKind::Null))
        );
    }

    #[test]
    fn test_serialize_compact() {
        let value = JsonValue::parse(
            r#"{ "b" : [ 1 , 2.5 , -3 ] , "a" : { "s" : "x y" , "n" : null } , "t" : false }"#,
        )
        .unwrap();
        assert_eq!(
            value.to_compact_string(),
            r#"{"a":{"n":null,"s":"x y"},"b":[1,2.5,-3],"t":false}"#
        );
    }

    #[test]
    fn test_serialize_large_numbers() {
        assert_eq!(JsonValue::Number(9007199254740992.0).to_string(), "9007199254740992");
        assert_eq!(JsonValue::Number(1e300).to_string(), "1e300");
        assert_eq!(JsonValue::Number(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_serialize_round_trip() {
        let text = r#"{"items":[{"id":1},{"id":2}],"name":"stub","ok":true}"#;
        let value = JsonValue::parse(text).unwrap();
        assert_eq!(JsonValue::parse(&value.to_string()).unwrap(), value);
        assert_eq!(value.to_string(), text);
    }

    #[test]
    fn test_from_serde_json_value() {
        let value = JsonValue::from(json!({"a": [1, "b", null], "c": {"d": 2.5}}));
        let expected = JsonValue::parse(r#"{"a":[1,"b",null],"c":{"d":2.5}}"#).unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_from_serde_json_extreme_numbers() {
        let value = JsonValue::from(json!({"max": u64::MAX, "min": i64::MIN, "big": 1e308}));
        let object = value.as_object().unwrap();
        for key in ["max", "min", "big"] {
            assert_eq!(object[key].kind(), ValueKind::Number);
            assert_eq!(object[key], object[key]);
        }
        assert!(crate::matcher::equals(object, object));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(JsonValue::Null.kind().to_string(), "null");
        assert_eq!(JsonValue::Bool(false).kind().to_string(), "bool");
        assert_eq!(JsonValue::Number(0.0).kind().name(), "number");
        assert_eq!(JsonValue::Object(JsonObject::new()).kind().name(), "object");
    }
}
