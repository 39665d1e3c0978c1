//! Precomputed title → subject map.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Enrichment known for one page title. `None` fields are absent and fall
/// through to the next source during merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectEntry {
    pub item_id: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub defining_formula: Option<String>,
}

impl SubjectEntry {
    /// Read an entry from a JSON object, ignoring wrong-typed fields.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            item_id: text("item_id"),
            subjects: value.get("subjects").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
            defining_formula: text("defining_formula"),
        }
    }

    /// Field-wise merge where `self` takes precedence.
    pub fn or(self, fallback: SubjectEntry) -> SubjectEntry {
        SubjectEntry {
            item_id: self.item_id.or(fallback.item_id),
            subjects: self.subjects.or(fallback.subjects),
            defining_formula: self.defining_formula.or(fallback.defining_formula),
        }
    }
}

/// Page title → enrichment entry.
pub type SubjectMap = HashMap<String, SubjectEntry>;

/// Load a precomputed subject map.
///
/// No path, a missing file, or a non-`.json` file yields an empty map.
/// Entries that are not JSON objects are discarded. Invalid JSON is an
/// error.
pub fn load_subject_map(path: Option<&Path>) -> Result<SubjectMap> {
    let Some(path) = path else {
        return Ok(SubjectMap::new());
    };

    if !path.exists() {
        debug!(path = %path.display(), "Subject map not found, continuing without it");
        return Ok(SubjectMap::new());
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        warn!(path = %path.display(), "Subject map is not a .json file, ignoring");
        return Ok(SubjectMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let payload: Value = serde_json::from_str(&contents)?;

    Ok(subject_map_from_value(payload))
}

fn subject_map_from_value(payload: Value) -> SubjectMap {
    let Value::Object(entries) = payload else {
        return SubjectMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(title, value)| {
            if value.is_object() {
                Some((title, SubjectEntry::from_value(&value)))
            } else {
                warn!(title = %title, "Discarding non-object subject map entry");
                None
            }
        })
        .collect()
}
