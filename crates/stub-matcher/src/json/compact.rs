//! Compacted JSON text as stored on stubs.
//!
//! `CompactJson` keeps the document as text with insignificant whitespace
//! stripped; string contents and key order are left alone. An empty or
//! absent document becomes `{}` when the wrapper is built, so it always holds
//! valid JSON.

use super::value::{JsonObject, JsonValue};
use crate::error::MatchError;
use crate::matcher::{Comparator, MatchMode};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

/// Canonical text for an empty or absent document.
pub const EMPTY_DOCUMENT: &str = "{}";

/// A validated JSON document in compact form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompactJson(String);

impl CompactJson {
    /// Validate `text` and strip its insignificant whitespace.
    pub fn new(text: &str) -> Result<Self, MatchError> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        JsonValue::parse(text)?;
        Ok(Self(strip_whitespace(text)))
    }

    pub fn empty() -> Self {
        Self(EMPTY_DOCUMENT.to_string())
    }

    pub fn from_value(value: &JsonValue) -> Self {
        Self(value.to_compact_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn to_value(&self) -> Result<JsonValue, MatchError> {
        JsonValue::parse(&self.0)
    }

    pub fn to_object(&self) -> Result<JsonObject, MatchError> {
        JsonValue::parse_object(&self.0)
    }

    /// Subset match of `self` (the pattern) against `target`.
    pub fn matches(&self, target: &CompactJson) -> Result<bool, MatchError> {
        self.compare(target, &Comparator::default(), MatchMode::Subset)
    }

    /// Strict equality between `self` and `other`.
    pub fn equals(&self, other: &CompactJson) -> Result<bool, MatchError> {
        self.compare(other, &Comparator::default(), MatchMode::Strict)
    }

    /// Parse both documents and compare them.
    ///
    /// A parse failure on either side is returned as an error and the
    /// comparator is not run.
    pub fn compare(
        &self,
        target: &CompactJson,
        comparator: &Comparator,
        mode: MatchMode,
    ) -> Result<bool, MatchError> {
        let pattern = self.to_object()?;
        let target = target.to_object()?;
        Ok(comparator.compare(&pattern, &target, mode))
    }
}

/// Remove whitespace outside string literals. `text` must be valid JSON.
fn strip_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            ' ' | '\t' | '\n' | '\r' => {}
            '"' => {
                in_string = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

impl Default for CompactJson {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CompactJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CompactJson {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CompactJson {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for CompactJson {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Embed the document itself rather than a quoted string.
        let raw = RawValue::from_string(self.0.clone()).map_err(ser::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompactJson {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Box<RawValue>>::deserialize(deserializer)?;
        match raw {
            None => Ok(Self::empty()),
            Some(raw) => Self::new(raw.get()).map_err(de::Error::custom),
        }
    }
}
