//! Formula Ingest: curation pipeline for Wikipedia math markup.
//!
//! Turns `<math>` fragments scattered across Wikipedia pages into a
//! deduplicated, quality-gated, topic-classified dataset that the practice
//! application loads at runtime.
//!
//! # Stages
//!
//! - **Extract**: pull raw formulas from an XML dump or the live API
//! - **Enrich**: attach Wikidata subjects and defining formulas by page title
//! - **Curate**: quality gate, fingerprint dedup, difficulty, name and topics
//! - **Export**: stable ids, sorted and bounded approved payload, candidates
//!
//! Every stage materializes its full output before the next one starts.
//!
//! # Example
//!
//! ```no_run
//! use formula_ingest::{Pipeline, PipelineConfig, PipelineSource};
//!
//! let config = PipelineConfig::new(
//!     PipelineSource::Dump("enwiki-latest-pages-articles.xml".into()),
//!     "staging",
//!     "generated",
//! );
//! let report = Pipeline::new(config).run().unwrap();
//!
//! println!("Curated: {}", report.curated);
//! println!("Approved: {}", report.approved);
//! ```

pub mod curation;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod extraction;
pub mod record;

mod pipeline;

pub use crate::pipeline::{
    APPROVED_FILE, CANDIDATES_FILE, CURATED_FILE, DEFAULT_TOPIC_MAP, ENRICHED_FILE, EXTRACTED_FILE,
    Pipeline, PipelineConfig, PipelineReport, PipelineSource,
};
pub use curation::{CurationStats, Curator, TopicRule, TopicRules};
pub use enrichment::{
    EnrichmentStats, Enricher, EntityFetcher, SubjectEntry, SubjectMap, WikidataClient,
    WikidataConfig,
};
pub use error::{IngestError, Result};
pub use export::{ApprovedPayload, AppExpressionRecord, ExportConfig, ExportSummary, Exporter};
pub use extraction::{
    ApiExtractor, DumpExtractor, Extraction, FormulaExtractor, PageFetcher, WikipediaClient,
    WikipediaConfig,
};
pub use record::{
    CuratedFormulaRecord, CuratedMetadata, Difficulty, EnrichedFormulaRecord, EnrichedMetadata,
    RawFormulaRecord, RawMetadata, Source,
};
