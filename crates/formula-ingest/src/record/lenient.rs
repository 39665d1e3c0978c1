//! Field deserializers that degrade wrong-typed values to defaults.
//!
//! Persisted lines must still be JSON objects; only individual fields are
//! forgiven.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::Source;

/// Strings pass through, numbers are stringified, anything else is `None`.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`string`] but yields an empty string instead of `None`.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string(deserializer)?.unwrap_or_default())
}

/// Keeps the string members of an array; non-arrays become empty.
pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Source tag from a string or number; anything else is the default tag.
pub fn source<'de, D>(deserializer: D) -> Result<Source, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string(deserializer)?.map(Source::from).unwrap_or_default())
}
