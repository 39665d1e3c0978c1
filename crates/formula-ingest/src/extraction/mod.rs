//! Formula extraction from Wikipedia.
//!
//! Two sources produce the same [`RawFormulaRecord`] shape:
//!
//! - [`DumpExtractor`] streams an offline XML dump page by page
//! - [`ApiExtractor`] fetches an explicit title list through a [`PageFetcher`]
//!
//! Both locate `<math>` markup with the same pattern and normalize matches
//! identically (HTML entity decoding, whitespace collapsing, trimming).
//!
//! # Example
//!
//! ```no_run
//! use formula_ingest::{DumpExtractor, FormulaExtractor};
//!
//! let extraction = DumpExtractor::new("enwiki-pages-articles.xml").extract().unwrap();
//! println!("{} formulas from {} pages", extraction.records.len(), extraction.pages_processed);
//! ```

mod api;
mod dump;
mod normalize;

pub(crate) use api::env_user_agent;
pub use api::{
    ApiExtractor, DEFAULT_USER_AGENT, PageFetcher, PageProps, USER_AGENT_ENV, WikiPage,
    WikipediaClient, WikipediaConfig, page_url,
};
pub use dump::DumpExtractor;
pub use normalize::{math_fragments, normalize_latex};

use crate::error::Result;
use crate::record::RawFormulaRecord;

/// Output of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// One record per non-empty `<math>` match, in source order.
    pub records: Vec<RawFormulaRecord>,
    /// Pages visited (dump) or returned by the API.
    pub pages_processed: usize,
}

/// Something that produces raw formula records from Wikipedia content.
pub trait FormulaExtractor {
    /// Run the extraction to completion.
    fn extract(&self) -> Result<Extraction>;
}
