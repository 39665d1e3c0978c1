//! Merge enrichment maps onto extracted records.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::{EnrichedFormulaRecord, EnrichedMetadata, RawFormulaRecord};

use super::subject_map::{SubjectEntry, SubjectMap};

/// Counts reported after an enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    /// Records processed.
    pub records: usize,
    /// Records whose title had a precomputed entry.
    pub matched_static: usize,
    /// Records whose title had a live entry.
    pub matched_live: usize,
}

/// Attaches Wikidata enrichment to records by page title.
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    static_map: SubjectMap,
    live_map: SubjectMap,
}

impl Enricher {
    /// Create an enricher over a precomputed map (possibly empty).
    pub fn new(static_map: SubjectMap) -> Self {
        Self {
            static_map,
            live_map: SubjectMap::new(),
        }
    }

    /// Add a live-fetched map, consulted for fields the precomputed map
    /// does not provide.
    pub fn with_live_map(mut self, live_map: SubjectMap) -> Self {
        self.live_map = live_map;
        self
    }

    /// Merged entry for a title: precomputed fields first, then live.
    pub fn lookup(&self, title: &str) -> SubjectEntry {
        let title = title.trim();
        let static_entry = self.static_map.get(title).cloned().unwrap_or_default();
        let live_entry = self.live_map.get(title).cloned().unwrap_or_default();
        static_entry.or(live_entry)
    }

    /// Enrich every record. Never fails: unmapped titles get empty fields.
    pub fn enrich(
        &self,
        records: Vec<RawFormulaRecord>,
    ) -> (Vec<EnrichedFormulaRecord>, EnrichmentStats) {
        let mut stats = EnrichmentStats {
            records: records.len(),
            ..EnrichmentStats::default()
        };

        let enriched = records
            .into_iter()
            .map(|record| {
                let title = record.page_title.as_deref().unwrap_or("").trim();
                if self.static_map.contains_key(title) {
                    stats.matched_static += 1;
                }
                if self.live_map.contains_key(title) {
                    stats.matched_live += 1;
                }
                let entry = self.lookup(title);
                enrich_record(record, entry)
            })
            .collect();

        info!(
            records = stats.records,
            matched_static = stats.matched_static,
            matched_live = stats.matched_live,
            "Enrichment complete"
        );
        (enriched, stats)
    }
}

/// Metadata keys owned by the enricher.
const ENRICHMENT_KEYS: [&str; 3] = [
    "wikidata_item_id",
    "wikidata_subjects",
    "wikidata_defining_formula",
];

/// Extend a record's metadata with the merged entry.
///
/// An item id seeded at extraction time survives when neither map has one.
fn enrich_record(record: RawFormulaRecord, entry: SubjectEntry) -> EnrichedFormulaRecord {
    let RawFormulaRecord {
        latex,
        source,
        page_title,
        page_id,
        mut metadata,
    } = record;

    // Re-enriching an enriched file replaces earlier values.
    for key in ENRICHMENT_KEYS {
        metadata.extra.shift_remove(key);
    }

    EnrichedFormulaRecord {
        latex,
        source,
        page_title,
        page_id,
        metadata: EnrichedMetadata {
            page_url: metadata.page_url,
            wikidata_item_id: entry.item_id.or(metadata.wikidata_item_id),
            wikidata_subjects: entry.subjects.unwrap_or_default(),
            wikidata_defining_formula: entry.defining_formula,
            extra: metadata.extra,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawMetadata, Source, read_records, write_records};
    use serde_json::json;
    use tempfile::TempDir;

    fn record(title: Option<&str>) -> RawFormulaRecord {
        RawFormulaRecord::new("a^2+b^2=c^2", Source::Dump)
            .with_page(title.map(str::to_string), None)
    }

    fn entry(
        item_id: Option<&str>,
        subjects: Option<&[&str]>,
        formula: Option<&str>,
    ) -> SubjectEntry {
        SubjectEntry {
            item_id: item_id.map(str::to_string),
            subjects: subjects.map(|s| s.iter().map(|x| x.to_string()).collect()),
            defining_formula: formula.map(str::to_string),
        }
    }

    #[test]
    fn test_unmapped_title_gets_empty_fields() {
        let (enriched, stats) =
            Enricher::default().enrich(vec![record(Some("Nowhere")), record(None)]);

        assert_eq!(stats.records, 2);
        assert_eq!(stats.matched_static, 0);
        for r in &enriched {
            assert_eq!(r.metadata.wikidata_item_id, None);
            assert!(r.metadata.wikidata_subjects.is_empty());
            assert_eq!(r.metadata.wikidata_defining_formula, None);
        }
    }

    #[test]
    fn test_static_fields_override_live_fields() {
        let mut static_map = SubjectMap::new();
        static_map.insert(
            "Pythagorean theorem".to_string(),
            entry(None, Some(&["geometry"][..]), None),
        );
        let mut live_map = SubjectMap::new();
        live_map.insert(
            "Pythagorean theorem".to_string(),
            entry(Some("Q11518"), Some(&["mathematics"][..]), Some("a^2+b^2=c^2")),
        );

        let enricher = Enricher::new(static_map).with_live_map(live_map);
        let (enriched, stats) = enricher.enrich(vec![record(Some("  Pythagorean theorem "))]);

        let metadata = &enriched[0].metadata;
        assert_eq!(metadata.wikidata_item_id.as_deref(), Some("Q11518"));
        assert_eq!(metadata.wikidata_subjects, vec!["geometry"]);
        assert_eq!(metadata.wikidata_defining_formula.as_deref(), Some("a^2+b^2=c^2"));
        assert_eq!(stats.matched_static, 1);
        assert_eq!(stats.matched_live, 1);
    }

    #[test]
    fn test_live_only_when_no_static_map() {
        let mut live_map = SubjectMap::new();
        live_map.insert("Euler's identity".to_string(), entry(Some("Q204819"), None, None));

        let enricher = Enricher::default().with_live_map(live_map);
        let (enriched, _) = enricher.enrich(vec![record(Some("Euler's identity"))]);

        assert_eq!(enriched[0].metadata.wikidata_item_id.as_deref(), Some("Q204819"));
        assert!(enriched[0].metadata.wikidata_subjects.is_empty());
    }

    #[test]
    fn test_metadata_is_extended_not_replaced() {
        let mut extra = indexmap::IndexMap::new();
        extra.insert("revision".to_string(), json!(12));
        let raw = RawFormulaRecord::new("x", Source::Api)
            .with_page(Some("Seeded".to_string()), Some("9".to_string()))
            .with_metadata(RawMetadata {
                wikidata_item_id: Some("Q42".to_string()),
                page_url: Some("https://en.wikipedia.org/wiki/Seeded".to_string()),
                extra,
            });

        let (enriched, _) = Enricher::default().enrich(vec![raw]);
        let metadata = &enriched[0].metadata;

        assert_eq!(metadata.wikidata_item_id.as_deref(), Some("Q42"));
        assert_eq!(metadata.page_url.as_deref(), Some("https://en.wikipedia.org/wiki/Seeded"));
        assert_eq!(metadata.extra.get("revision"), Some(&json!(12)));
        assert_eq!(enriched[0].page_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_reenrichment_replaces_previous_values() {
        let line = r#"{"latex": "a^2+b^2=c^2", "page_title": "Pythagorean theorem",
                       "metadata": {"wikidata_item_id": "Q1", "wikidata_subjects": ["old"],
                                    "wikidata_defining_formula": "x", "revision": 3}}"#;
        let previous: RawFormulaRecord = serde_json::from_str(line).unwrap();

        let mut static_map = SubjectMap::new();
        static_map.insert(
            "Pythagorean theorem".to_string(),
            entry(Some("Q11518"), Some(&["geometry"][..]), None),
        );
        let (enriched, _) = Enricher::new(static_map).enrich(vec![previous]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enriched.jsonl");
        write_records(&path, &enriched).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("\"wikidata_subjects\"").count(), 1);

        let reloaded: Vec<EnrichedFormulaRecord> = read_records(&path).unwrap();
        let metadata = &reloaded[0].metadata;
        assert_eq!(metadata.wikidata_item_id.as_deref(), Some("Q11518"));
        assert_eq!(metadata.wikidata_subjects, vec!["geometry"]);
        assert_eq!(metadata.wikidata_defining_formula, None);
        assert!(!metadata.extra.contains_key("wikidata_defining_formula"));
        assert_eq!(metadata.extra.get("revision"), Some(&json!(3)));
    }
}
