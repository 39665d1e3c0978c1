//! Extraction through the live MediaWiki query API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::record::{RawFormulaRecord, RawMetadata, Source};

use super::normalize::math_fragments;
use super::{Extraction, FormulaExtractor};

/// English Wikipedia API endpoint.
const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Base for article URLs attached to API-extracted records.
const ARTICLE_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "formula-ingest/0.1 (local formula pipeline)";

/// Environment variable overriding the default user agent.
pub const USER_AGENT_ENV: &str = "FORMULA_INGEST_USER_AGENT";

/// The non-blank value of [`USER_AGENT_ENV`], if any.
pub(crate) fn env_user_agent() -> Option<String> {
    non_blank(std::env::var(USER_AGENT_ENV).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Configuration for the Wikipedia client.
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// Query API endpoint.
    pub api_url: String,
    /// Prefix for constructed page URLs.
    pub article_base_url: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Titles per request.
    pub batch_size: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            article_base_url: ARTICLE_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            batch_size: 20,
            timeout: Duration::from_secs(30),
        }
    }
}

impl WikipediaConfig {
    /// Defaults, with the user agent taken from `FORMULA_INGEST_USER_AGENT`
    /// when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(agent) = env_user_agent() {
            config.user_agent = agent;
        }
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Zero is treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Page properties returned alongside content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageProps {
    #[serde(default)]
    pub wikibase_item: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Slot {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Slots {
    #[serde(default)]
    main: Slot,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Revision {
    #[serde(default)]
    slots: Slots,
}

/// One page object from a `formatversion=2` query response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pageid: Option<u64>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub pageprops: PageProps,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl WikiPage {
    /// Wikitext of the first revision's main slot.
    ///
    /// `None` when the page came back without revisions.
    pub fn content(&self) -> Option<&str> {
        self.revisions
            .first()
            .map(|rev| rev.slots.main.content.as_deref().unwrap_or(""))
    }
}

/// Fetches page content for a batch of titles.
pub trait PageFetcher {
    /// Return the pages for `titles`, excluding any the service reports
    /// as missing.
    fn fetch_pages(&self, titles: &[String]) -> Result<Vec<WikiPage>>;
}

/// Blocking client for the MediaWiki query API.
pub struct WikipediaClient {
    client: Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WikipediaConfig {
        &self.config
    }
}

impl PageFetcher for WikipediaClient {
    fn fetch_pages(&self, titles: &[String]) -> Result<Vec<WikiPage>> {
        let joined = titles.join("|");
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("prop", "revisions|pageprops"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("titles", joined.as_str()),
            ])
            .send()
            .map_err(|e| IngestError::Http(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(IngestError::Http(format!(
                "Wikipedia API error ({}): {}",
                status, error_text
            )));
        }

        let payload: Value = response
            .json()
            .map_err(|e| IngestError::Http(format!("Failed to parse Wikipedia response: {}", e)))?;

        Ok(pages_from_payload(payload))
    }
}

/// Pull usable page objects out of a query response.
///
/// Non-object entries, pages that fail to decode, and missing pages are
/// dropped.
fn pages_from_payload(payload: Value) -> Vec<WikiPage> {
    let pages = match payload.get("query").and_then(|q| q.get("pages")) {
        Some(Value::Array(pages)) => pages.clone(),
        _ => return Vec::new(),
    };

    pages
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|page| serde_json::from_value::<WikiPage>(page).ok())
        .filter(|page| !page.missing)
        .collect()
}

/// Canonical article URL: spaces become underscores, everything except
/// unreserved characters and `/` is percent-encoded.
pub fn page_url(base: &str, title: &str) -> String {
    let encoded = urlencoding::encode(&title.replace(' ', "_")).replace("%2F", "/");
    format!("{}{}", base, encoded)
}

/// Extracts formulas for an explicit title list via a [`PageFetcher`].
pub struct ApiExtractor {
    fetcher: Box<dyn PageFetcher>,
    titles: Vec<String>,
    batch_size: usize,
    article_base_url: String,
}

impl ApiExtractor {
    pub fn new(fetcher: impl PageFetcher + 'static, titles: Vec<String>) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            titles,
            batch_size: 20,
            article_base_url: ARTICLE_BASE_URL.to_string(),
        }
    }

    /// Build from a live client, taking batch size and URL base from its
    /// configuration.
    pub fn from_client(client: WikipediaClient, titles: Vec<String>) -> Self {
        let batch_size = client.config().batch_size;
        let base = client.config().article_base_url.clone();
        Self::new(client, titles)
            .with_batch_size(batch_size)
            .with_article_base_url(base)
    }

    /// Zero is treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_article_base_url(mut self, base: impl Into<String>) -> Self {
        self.article_base_url = base.into();
        self
    }

    fn records_for_page(&self, page: &WikiPage) -> Vec<RawFormulaRecord> {
        let Some(text) = page.content() else {
            warn!(title = ?page.title, "Page returned without revisions, skipping");
            return Vec::new();
        };

        let title = page.title.clone();
        let page_id = page.pageid.map(|id| id.to_string());
        let url = page_url(&self.article_base_url, title.as_deref().unwrap_or_default());

        math_fragments(text)
            .map(|latex| {
                RawFormulaRecord::new(latex, Source::Api)
                    .with_page(title.clone(), page_id.clone())
                    .with_metadata(RawMetadata {
                        wikidata_item_id: page.pageprops.wikibase_item.clone(),
                        page_url: Some(url.clone()),
                        ..RawMetadata::default()
                    })
            })
            .collect()
    }
}

impl FormulaExtractor for ApiExtractor {
    fn extract(&self) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for (index, batch) in self.titles.chunks(self.batch_size).enumerate() {
            let pages = self.fetcher.fetch_pages(batch)?;
            debug!(batch = index, titles = batch.len(), pages = pages.len(), "Fetched page batch");

            for page in pages.iter().filter(|page| !page.missing) {
                extraction.pages_processed += 1;
                extraction.records.extend(self.records_for_page(page));
            }
        }

        info!(
            titles = self.titles.len(),
            formulas = extraction.records.len(),
            "API extraction complete"
        );
        Ok(extraction)
    }
}
