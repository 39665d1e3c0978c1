//! Single-pass curation over enriched records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::{CuratedFormulaRecord, CuratedMetadata, EnrichedFormulaRecord};

use super::classify::{infer_difficulty, infer_name};
use super::quality::{fingerprint, passes_quality_gate};
use super::topics::TopicRules;

/// Counts reported after a curation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationStats {
    /// Records read.
    pub input: usize,
    /// Records dropped by the quality gate.
    pub rejected_by_quality_gate: usize,
    /// Records dropped because an earlier record had the same fingerprint.
    pub duplicates: usize,
    /// Records emitted.
    pub curated: usize,
}

/// State threaded through the fold; lives for one `curate` call.
struct Accumulator {
    seen: HashSet<String>,
    curated: Vec<CuratedFormulaRecord>,
    stats: CurationStats,
}

impl Accumulator {
    fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            curated: Vec::with_capacity(capacity),
            stats: CurationStats {
                input: capacity,
                ..CurationStats::default()
            },
        }
    }
}

/// Deduplicates, gates and classifies enriched records.
#[derive(Debug, Clone, Default)]
pub struct Curator {
    rules: TopicRules,
}

impl Curator {
    pub fn new(rules: TopicRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TopicRules {
        &self.rules
    }

    /// Curate records in input order.
    ///
    /// No two outputs share a fingerprint; the first record to pass the
    /// gate for a fingerprint is the one kept.
    pub fn curate(
        &self,
        records: &[EnrichedFormulaRecord],
    ) -> (Vec<CuratedFormulaRecord>, CurationStats) {
        let acc = records
            .iter()
            .fold(Accumulator::new(records.len()), |mut acc, record| {
                if !passes_quality_gate(&record.latex) {
                    acc.stats.rejected_by_quality_gate += 1;
                    return acc;
                }

                if !acc.seen.insert(fingerprint(&record.latex)) {
                    acc.stats.duplicates += 1;
                    return acc;
                }

                acc.curated.push(self.curate_record(record));
                acc
            });

        let Accumulator {
            curated, mut stats, ..
        } = acc;
        stats.curated = curated.len();

        info!(
            input = stats.input,
            rejected = stats.rejected_by_quality_gate,
            duplicates = stats.duplicates,
            curated = stats.curated,
            "Curation complete"
        );
        (curated, stats)
    }

    /// Reshape one gated, unique record.
    fn curate_record(&self, record: &EnrichedFormulaRecord) -> CuratedFormulaRecord {
        let latex = record.latex.trim().to_string();
        let page_title = record.page_title.as_deref();

        // The record's own page fields replace same-named metadata keys.
        let mut enrichment = record.metadata.clone();
        enrichment.extra.shift_remove("page_title");
        enrichment.extra.shift_remove("page_id");

        CuratedFormulaRecord {
            id: None,
            difficulty: infer_difficulty(&latex),
            name: infer_name(page_title, &latex),
            topics: self.rules.classify(
                page_title,
                &record.latex,
                &record.metadata.wikidata_subjects,
            ),
            source: record.source.clone(),
            subtopics: None,
            complexity_band: None,
            complexity_score: None,
            complexity_features: None,
            metadata: CuratedMetadata {
                page_title: record.page_title.clone(),
                page_id: record.page_id.clone(),
                enrichment,
            },
            latex,
        }
    }
}
