//! Record types flowing between pipeline stages.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// Where a formula was extracted from.
///
/// Serialized as its tag string; unknown tags are kept verbatim so a
/// hand-edited staging file never fails to load over provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// Offline XML dump.
    Dump,
    /// Live MediaWiki API.
    Api,
    /// Any other tag.
    Other(String),
}

impl Source {
    /// The persisted tag.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Dump => "wikipedia",
            Source::Api => "wikipedia-api",
            Source::Other(tag) => tag,
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Other("unknown".to_string())
    }
}

impl From<String> for Source {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "wikipedia" => Source::Dump,
            "wikipedia-api" => Source::Api,
            _ => Source::Other(tag),
        }
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata captured at extraction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    /// Wikidata item id seeded from page properties (API extraction only).
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub wikidata_item_id: Option<String>,

    /// Canonical article URL (API extraction only).
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_url: Option<String>,

    /// Any other keys, in document order.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One formula occurrence as found in source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFormulaRecord {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub latex: String,
    #[serde(default, deserialize_with = "lenient::source")]
    pub source: Source,
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_id: Option<String>,
    #[serde(default)]
    pub metadata: RawMetadata,
}

impl RawFormulaRecord {
    /// Create a record with no page provenance.
    pub fn new(latex: impl Into<String>, source: Source) -> Self {
        Self {
            latex: latex.into(),
            source,
            page_title: None,
            page_id: None,
            metadata: RawMetadata::default(),
        }
    }

    /// Attach the page the formula was found on.
    pub fn with_page(mut self, title: Option<String>, id: Option<String>) -> Self {
        self.page_title = title;
        self.page_id = id;
        self
    }

    /// Attach extraction-time metadata.
    pub fn with_metadata(mut self, metadata: RawMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Metadata after enrichment. The three `wikidata_*` fields are always
/// written, as `null`/`[]` when nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMetadata {
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_url: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub wikidata_item_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub wikidata_subjects: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub wikidata_defining_formula: Option<String>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A raw record carrying merged Wikidata enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFormulaRecord {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub latex: String,
    #[serde(default, deserialize_with = "lenient::source")]
    pub source: Source,
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_id: Option<String>,
    #[serde(default)]
    pub metadata: EnrichedMetadata,
}

/// Difficulty tier inferred from structural complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance kept on a curated record: page plus enrichment fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratedMetadata {
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_id: Option<String>,
    #[serde(flatten)]
    pub enrichment: EnrichedMetadata,
}

/// A deduplicated, classified formula ready for review or export.
///
/// `id`, `subtopics` and the `complexity_*` fields are never set by the
/// curator. They are carried through export when a reviewer adds them to
/// the candidates file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedFormulaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub latex: String,
    pub difficulty: Difficulty,
    pub name: String,
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient::source")]
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtopics: Option<Vec<String>>,
    #[serde(
        default,
        alias = "complexityBand",
        skip_serializing_if = "Option::is_none"
    )]
    pub complexity_band: Option<String>,
    #[serde(
        default,
        alias = "complexityScore",
        skip_serializing_if = "Option::is_none"
    )]
    pub complexity_score: Option<f64>,
    #[serde(
        default,
        alias = "complexityFeatures",
        skip_serializing_if = "Option::is_none"
    )]
    pub complexity_features: Option<Value>,
    #[serde(default)]
    pub metadata: CuratedMetadata,
}
