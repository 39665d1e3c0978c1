//! Wikidata enrichment keyed by page title.
//!
//! Enrichment merges two title-keyed maps onto each record:
//!
//! - a precomputed JSON subject map ([`load_subject_map`])
//! - an optional live map built from Wikidata claims ([`build_live_map`])
//!
//! The precomputed entry wins field by field. Records with no entry in
//! either map keep `null`/empty enrichment fields.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use formula_ingest::enrichment::{load_subject_map, Enricher};
//! use formula_ingest::record::read_records;
//!
//! let records = read_records("staging/wiki_math.jsonl").unwrap();
//! let subject_map = load_subject_map(Some(Path::new("config/subject_map.json"))).unwrap();
//! let (enriched, stats) = Enricher::new(subject_map).enrich(records);
//! println!("{} of {} matched", stats.matched_static, stats.records);
//! ```

mod enricher;
mod subject_map;
mod wikidata;

pub use enricher::{EnrichmentStats, Enricher};
pub use subject_map::{SubjectEntry, SubjectMap, load_subject_map};
pub use wikidata::{EntityFetcher, WikidataClient, WikidataConfig, build_live_map, is_item_id};
