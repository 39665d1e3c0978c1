//! Curation: turn enriched records into a deduplicated, classified set.
//!
//! A single pass over the input applies, per record:
//!
//! 1. the quality gate ([`passes_quality_gate`])
//! 2. fingerprint dedup, first occurrence wins ([`fingerprint`])
//! 3. difficulty inference ([`infer_difficulty`])
//! 4. name inference ([`infer_name`])
//! 5. keyword topic classification ([`TopicRules::classify`])
//!
//! # Example
//!
//! ```no_run
//! use formula_ingest::curation::{Curator, TopicRules};
//! use formula_ingest::record::{EnrichedFormulaRecord, read_records};
//!
//! let rules = TopicRules::load("config/topic_map.yaml").unwrap();
//! let enriched: Vec<EnrichedFormulaRecord> =
//!     read_records("staging/wiki_math_enriched.jsonl").unwrap();
//! let (curated, stats) = Curator::new(rules).curate(&enriched);
//! println!("{} curated, {} duplicates", curated.len(), stats.duplicates);
//! ```

mod classify;
mod curator;
mod quality;
mod topics;

pub use classify::{COMPLEXITY_MARKERS, complexity_score, infer_difficulty, infer_name};
pub use curator::{CurationStats, Curator};
pub use quality::{
    MAX_LATEX_CHARS, MIN_LATEX_CHARS, fingerprint, passes_quality_gate, strip_whitespace,
};
pub use topics::{TOPIC_FALLBACK, TopicRule, TopicRules};
