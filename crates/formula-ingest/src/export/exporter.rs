//! Stable ids, deterministic ordering and the approved payload envelope.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::curation::fingerprint;
use crate::error::Result;
use crate::record::{CuratedFormulaRecord, Difficulty, write_json_atomic, write_records};

/// Envelope version understood by the application loader.
pub const PAYLOAD_VERSION: &str = "v1";

/// Tag prepended to derived ids.
pub const ID_PREFIX: &str = "expr-";

/// Subtopic used when a record has none.
pub const FALLBACK_SUBTOPIC: &str = "fundamentals";

/// Export settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Cap on approved expressions.
    pub max_approved: usize,
    /// Hex characters of the content hash kept in derived ids.
    pub id_prefix_len: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_approved: 500,
            id_prefix_len: 12,
        }
    }
}

impl ExportConfig {
    pub fn with_max_approved(mut self, max: usize) -> Self {
        self.max_approved = max;
        self
    }
}

/// One expression as the application consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppExpressionRecord {
    pub id: String,
    pub latex: String,
    pub difficulty: Difficulty,
    pub name: String,
    pub topics: Vec<String>,
    pub subtopics: Vec<String>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_band: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_features: Option<Value>,
}

/// Versioned envelope written to the approved file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPayload {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub expressions: Vec<AppExpressionRecord>,
}

/// Counts reported after an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub candidates: usize,
    pub approved: usize,
}

/// `expr-` plus the first `prefix_len` hex chars of the SHA-256 of the
/// whitespace-stripped formula.
pub fn derive_id(latex: &str, prefix_len: usize) -> String {
    let digest = fingerprint(latex);
    let end = prefix_len.min(digest.len());
    format!("{}{}", ID_PREFIX, &digest[..end])
}

/// Non-blank, deduplicated subtopics, or the fallback.
fn normalize_subtopics(subtopics: Option<&[String]>) -> Vec<String> {
    let kept: IndexSet<String> = subtopics
        .unwrap_or_default()
        .iter()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .collect();

    if kept.is_empty() {
        vec![FALLBACK_SUBTOPIC.to_string()]
    } else {
        kept.into_iter().collect()
    }
}

/// Builds the approved payload and writes both export artifacts.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The record's own id when it has one, otherwise a derived one.
    pub fn stable_id(&self, record: &CuratedFormulaRecord) -> String {
        match record.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => derive_id(&record.latex, self.config.id_prefix_len),
        }
    }

    pub fn to_app_record(&self, record: &CuratedFormulaRecord) -> AppExpressionRecord {
        AppExpressionRecord {
            id: self.stable_id(record),
            latex: record.latex.clone(),
            difficulty: record.difficulty,
            name: record.name.clone(),
            topics: record.topics.clone(),
            subtopics: normalize_subtopics(record.subtopics.as_deref()),
            source: record.source.to_string(),
            complexity_band: record.complexity_band.clone(),
            complexity_score: record.complexity_score,
            complexity_features: record.complexity_features.clone(),
        }
    }

    /// Records sorted by `(name, latex)` and cut to `max_approved`.
    pub fn approved(&self, curated: &[CuratedFormulaRecord]) -> Vec<AppExpressionRecord> {
        let mut ordered: Vec<&CuratedFormulaRecord> = curated.iter().collect();
        ordered.sort_by(|a, b| {
            (a.name.as_str(), a.latex.as_str()).cmp(&(b.name.as_str(), b.latex.as_str()))
        });

        ordered
            .into_iter()
            .take(self.config.max_approved)
            .map(|record| self.to_app_record(record))
            .collect()
    }

    /// Approved payload stamped with the given time.
    pub fn payload_at(
        &self,
        curated: &[CuratedFormulaRecord],
        generated_at: DateTime<Utc>,
    ) -> ApprovedPayload {
        ApprovedPayload {
            version: PAYLOAD_VERSION.to_string(),
            generated_at,
            expressions: self.approved(curated),
        }
    }

    /// Approved payload stamped now.
    pub fn payload(&self, curated: &[CuratedFormulaRecord]) -> ApprovedPayload {
        self.payload_at(curated, Utc::now())
    }

    /// Write the full candidates file and the approved payload.
    ///
    /// The approved file is replaced atomically.
    pub fn export(
        &self,
        curated: &[CuratedFormulaRecord],
        candidates_path: impl AsRef<Path>,
        approved_path: impl AsRef<Path>,
    ) -> Result<ExportSummary> {
        write_records(candidates_path.as_ref(), curated)?;

        let payload = self.payload(curated);
        write_json_atomic(approved_path.as_ref(), &payload)?;

        let summary = ExportSummary {
            candidates: curated.len(),
            approved: payload.expressions.len(),
        };
        info!(
            candidates = summary.candidates,
            approved = summary.approved,
            "Export complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CuratedMetadata, Source};

    fn curated(name: &str, latex: &str) -> CuratedFormulaRecord {
        CuratedFormulaRecord {
            id: None,
            latex: latex.to_string(),
            difficulty: Difficulty::Easy,
            name: name.to_string(),
            topics: vec!["algebra".to_string()],
            source: Source::Dump,
            subtopics: None,
            complexity_band: None,
            complexity_score: None,
            complexity_features: None,
            metadata: CuratedMetadata::default(),
        }
    }

    #[test]
    fn test_derived_id_shape_and_whitespace_insensitivity() {
        let id = derive_id("x^2 + 1", 12);
        assert!(id.starts_with("expr-"));
        assert_eq!(id.len(), "expr-".len() + 12);
        assert_eq!(id, derive_id("  x^2+1\n", 12));
        assert_ne!(id, derive_id("x^2+2", 12));
    }

    #[test]
    fn test_explicit_id_kept() {
        let mut record = curated("A", "a+b");
        record.id = Some("expr-pythagoras".to_string());
        assert_eq!(Exporter::default().stable_id(&record), "expr-pythagoras");

        record.id = Some("   ".to_string());
        assert_eq!(Exporter::default().stable_id(&record), derive_id("a+b", 12));
    }

    #[test]
    fn test_sorted_by_name_then_latex() {
        let records = vec![
            curated("beta", "b"),
            curated("Alpha", "z"),
            curated("Alpha", "a"),
            curated("alpha", "m"),
        ];
        let approved = Exporter::default().approved(&records);
        let keys: Vec<(&str, &str)> = approved
            .iter()
            .map(|r| (r.name.as_str(), r.latex.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![("Alpha", "a"), ("Alpha", "z"), ("alpha", "m"), ("beta", "b")]
        );
    }

    #[test]
    fn test_truncates_after_sorting() {
        let records = vec![curated("c", "3"), curated("a", "1"), curated("b", "2")];

        let approved =
            Exporter::new(ExportConfig::default().with_max_approved(2)).approved(&records);
        assert_eq!(approved.len(), 2);
        assert_eq!(approved[0].name, "a");
        assert_eq!(approved[1].name, "b");

        let none = Exporter::new(ExportConfig::default().with_max_approved(0)).approved(&records);
        assert!(none.is_empty());
    }

    #[test]
    fn test_subtopics_defaulted_and_cleaned() {
        let mut record = curated("A", "a+b");
        assert_eq!(
            Exporter::default().to_app_record(&record).subtopics,
            vec![FALLBACK_SUBTOPIC]
        );

        record.subtopics = Some(vec![
            "identities".to_string(),
            " ".to_string(),
            "identities".to_string(),
            "factoring".to_string(),
        ]);
        assert_eq!(
            Exporter::default().to_app_record(&record).subtopics,
            vec!["identities", "factoring"]
        );
    }

    #[test]
    fn test_payload_wire_format() {
        let mut record = curated("Area", "A = \\pi r^2");
        record.complexity_band = Some("beginner".to_string());
        record.complexity_score = Some(21.0);

        let generated_at = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let payload = Exporter::default().payload_at(&[record], generated_at);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["version"], "v1");
        assert_eq!(json["generatedAt"], "2026-01-02T03:04:05Z");
        let expr = &json["expressions"][0];
        assert_eq!(expr["complexityBand"], "beginner");
        assert_eq!(expr["complexityScore"], 21.0);
        assert_eq!(expr["source"], "wikipedia");
        assert_eq!(expr["difficulty"], "easy");
        assert!(expr.get("complexityFeatures").is_none());
    }

    #[test]
    fn test_export_is_deterministic_apart_from_timestamp() {
        let records = vec![curated("b", "x+1"), curated("a", "y+1")];
        let exporter = Exporter::default();

        let first = serde_json::to_string(&exporter.approved(&records)).unwrap();
        let second = serde_json::to_string(&exporter.approved(&records)).unwrap();
        assert_eq!(first, second);
    }
}
