//! Export curated records for review and for the application.
//!
//! Two artifacts come out of an export:
//!
//! ```text
//! generated/
//! ├── formulas_candidates.jsonl   # every curated record, untouched
//! └── formulas_approved.json      # sorted, capped, versioned payload
//! ```

mod exporter;

pub use exporter::{
    AppExpressionRecord, ApprovedPayload, ExportConfig, ExportSummary, Exporter,
    FALLBACK_SUBTOPIC, ID_PREFIX, PAYLOAD_VERSION, derive_id,
};
