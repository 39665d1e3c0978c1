//! Live enrichment from Wikidata entity claims.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::extraction::{DEFAULT_USER_AGENT, env_user_agent};
use crate::record::RawFormulaRecord;

use super::subject_map::{SubjectEntry, SubjectMap};

/// Wikidata API endpoint.
const API_URL: &str = "https://www.wikidata.org/w/api.php";

static ITEM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q[0-9]+$").unwrap());

/// Whether `id` looks like a Wikidata item id (`Q` followed by digits).
pub fn is_item_id(id: &str) -> bool {
    ITEM_ID.is_match(id)
}

/// Configuration for the Wikidata client and claim extraction.
#[derive(Debug, Clone)]
pub struct WikidataConfig {
    /// `wbgetentities` endpoint.
    pub api_url: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Entity ids per request.
    pub batch_size: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Property whose item values are the record's subjects.
    pub subject_property: String,
    /// Property holding the defining formula.
    pub defining_formula_property: String,
    /// Label language.
    pub language: String,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            batch_size: 50,
            timeout: Duration::from_secs(30),
            subject_property: "P921".to_string(),
            defining_formula_property: "P2534".to_string(),
            language: "en".to_string(),
        }
    }
}

impl WikidataConfig {
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

    pub fn with_subject_property(mut self, property: impl Into<String>) -> Self {
        self.subject_property = property.into();
        self
    }
}

/// Looks up Wikidata entities by id.
pub trait EntityFetcher {
    /// Fetch `props` (e.g. `["labels", "claims"]`) for `ids`.
    ///
    /// Ids the service does not know are absent from the returned map.
    fn get_entities(&self, ids: &[String], props: &[&str]) -> Result<HashMap<String, Value>>;
}

/// Blocking client for `wbgetentities`.
pub struct WikidataClient {
    client: Client,
    config: WikidataConfig,
}

impl WikidataClient {
    pub fn new(config: WikidataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WikidataConfig {
        &self.config
    }
}

impl EntityFetcher for WikidataClient {
    fn get_entities(&self, ids: &[String], props: &[&str]) -> Result<HashMap<String, Value>> {
        let ids = ids.join("|");
        let props = props.join("|");
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "wbgetentities"),
                ("format", "json"),
                ("ids", ids.as_str()),
                ("props", props.as_str()),
                ("languages", self.config.language.as_str()),
            ])
            .send()
            .map_err(|e| IngestError::Http(format!("Wikidata request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(IngestError::Http(format!(
                "Wikidata API error ({}): {}",
                status, error_text
            )));
        }

        let payload: Value = response
            .json()
            .map_err(|e| IngestError::Http(format!("Failed to parse Wikidata response: {}", e)))?;

        Ok(entities_from_payload(payload))
    }
}

/// Entities keyed by id, without the `missing` placeholders.
fn entities_from_payload(payload: Value) -> HashMap<String, Value> {
    match payload {
        Value::Object(mut root) => match root.remove("entities") {
            Some(Value::Object(entities)) => entities
                .into_iter()
                .filter(|(_, entity)| entity.is_object() && entity.get("missing").is_none())
                .collect(),
            _ => HashMap::new(),
        },
        _ => HashMap::new(),
    }
}

/// The `mainsnak.datavalue.value` of every statement under `property`.
fn claim_values<'a>(entity: &'a Value, property: &str) -> impl Iterator<Item = &'a Value> + 'a {
    entity
        .get("claims")
        .and_then(|claims| claims.get(property))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|claim| claim.pointer("/mainsnak/datavalue/value"))
}

/// Item id referenced by an entity-valued claim.
fn entity_reference(value: &Value) -> Option<String> {
    if let Some(id) = value.get("id").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    value
        .get("numeric-id")
        .and_then(Value::as_u64)
        .map(|n| format!("Q{}", n))
}

/// Defining formula as plain text or a `{ "text": ... }` payload.
fn formula_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => value.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn label(entity: &Value, language: &str) -> Option<String> {
    entity
        .get("labels")
        .and_then(|labels| labels.get(language))
        .and_then(|l| l.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Claims pulled from one item before labels are resolved.
#[derive(Debug, Default)]
struct ItemClaims {
    subject_ids: Vec<String>,
    defining_formula: Option<String>,
}

/// Build a title-keyed enrichment map by querying Wikidata for the item
/// ids records already carry.
///
/// Two round trips: item claims, then labels for every referenced subject.
/// Subject labels are deduplicated and sorted; subjects without a label
/// are skipped. Any request failure aborts the build.
pub fn build_live_map(
    fetcher: &dyn EntityFetcher,
    config: &WikidataConfig,
    records: &[RawFormulaRecord],
) -> Result<SubjectMap> {
    let batch_size = config.batch_size.max(1);

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut item_ids: IndexSet<String> = IndexSet::new();
    for record in records {
        let title = record.page_title.as_deref().unwrap_or("").trim();
        let Some(item_id) = record.metadata.wikidata_item_id.as_deref() else {
            continue;
        };
        if title.is_empty() || !is_item_id(item_id) {
            continue;
        }
        pairs.push((title.to_string(), item_id.to_string()));
        item_ids.insert(item_id.to_string());
    }

    if item_ids.is_empty() {
        return Ok(SubjectMap::new());
    }

    let ids: Vec<String> = item_ids.into_iter().collect();
    let mut claims: HashMap<String, ItemClaims> = HashMap::new();
    for batch in ids.chunks(batch_size) {
        let entities = fetcher.get_entities(batch, &["labels", "claims"])?;
        debug!(requested = batch.len(), returned = entities.len(), "Fetched item batch");

        for (id, entity) in entities {
            let subject_ids = claim_values(&entity, &config.subject_property)
                .filter_map(entity_reference)
                .collect();
            let defining_formula =
                claim_values(&entity, &config.defining_formula_property).find_map(formula_text);
            claims.insert(
                id,
                ItemClaims {
                    subject_ids,
                    defining_formula,
                },
            );
        }
    }

    let subject_ids: Vec<String> = claims
        .values()
        .flat_map(|item| item.subject_ids.iter().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let mut labels: HashMap<String, String> = HashMap::new();
    for batch in subject_ids.chunks(batch_size) {
        let entities = fetcher.get_entities(batch, &["labels"])?;
        labels.extend(
            entities
                .into_iter()
                .filter_map(|(id, entity)| label(&entity, &config.language).map(|l| (id, l))),
        );
    }

    let mut map = SubjectMap::new();
    for (title, item_id) in pairs {
        let Some(item) = claims.get(&item_id) else {
            continue;
        };
        let subjects: BTreeSet<String> = item
            .subject_ids
            .iter()
            .filter_map(|id| labels.get(id).cloned())
            .collect();

        map.entry(title).or_insert_with(|| SubjectEntry {
            item_id: Some(item_id.clone()),
            subjects: Some(subjects.into_iter().collect()),
            defining_formula: item.defining_formula.clone(),
        });
    }

    info!(
        items = ids.len(),
        subjects = subject_ids.len(),
        titles = map.len(),
        "Built live Wikidata map"
    );
    Ok(map)
}
