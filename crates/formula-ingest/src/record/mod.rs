//! Typed formula records and their line-delimited persistence.
//!
//! Each pipeline stage reads the previous stage's records from a JSONL file
//! and writes a fresh file of its own; nothing is mutated in place.
//!
//! ```text
//! staging/
//! ├── wiki_math.jsonl             # RawFormulaRecord
//! ├── wiki_math_enriched.jsonl    # EnrichedFormulaRecord
//! └── wiki_math_curated.jsonl     # CuratedFormulaRecord
//! ```

mod lenient;
mod store;
mod types;

pub use store::{load_titles, read_records, write_json_atomic, write_records};
pub use types::{
    CuratedFormulaRecord, CuratedMetadata, Difficulty, EnrichedFormulaRecord, EnrichedMetadata,
    RawFormulaRecord, RawMetadata, Source,
};
