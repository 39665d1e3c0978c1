//! End-to-end pipeline: extract, enrich, curate and export.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::curation::{CurationStats, Curator, TopicRules};
use crate::enrichment::{
    EnrichmentStats, Enricher, SubjectMap, WikidataClient, WikidataConfig, build_live_map,
    load_subject_map,
};
use crate::error::{IngestError, Result};
use crate::export::{ExportConfig, Exporter};
use crate::extraction::{
    ApiExtractor, DumpExtractor, Extraction, FormulaExtractor, WikipediaClient, WikipediaConfig,
};
use crate::record::{
    CuratedFormulaRecord, EnrichedFormulaRecord, RawFormulaRecord, load_titles, read_records,
    write_records,
};

pub const EXTRACTED_FILE: &str = "wiki_math.jsonl";
pub const ENRICHED_FILE: &str = "wiki_math_enriched.jsonl";
pub const CURATED_FILE: &str = "wiki_math_curated.jsonl";
pub const CANDIDATES_FILE: &str = "formulas_candidates.jsonl";
pub const APPROVED_FILE: &str = "formulas_approved.json";

/// Default topic-rule file, relative to the working directory.
pub const DEFAULT_TOPIC_MAP: &str = "config/topic_map.yaml";

/// Where raw formulas come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSource {
    /// A MediaWiki XML dump.
    Dump(PathBuf),
    /// A file listing page titles to fetch from the live API.
    Titles(PathBuf),
}

/// Configuration for a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: PipelineSource,
    pub staging_dir: PathBuf,
    pub generated_dir: PathBuf,
    /// Precomputed title-keyed enrichment map (JSON).
    pub subject_map: Option<PathBuf>,
    pub topic_map: PathBuf,
    pub max_approved: usize,
    /// Query Wikidata for records that carry an item id.
    pub live_enrichment: bool,
    pub wikipedia: WikipediaConfig,
    pub wikidata: WikidataConfig,
}

impl PipelineConfig {
    pub fn new(
        source: PipelineSource,
        staging_dir: impl Into<PathBuf>,
        generated_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            staging_dir: staging_dir.into(),
            generated_dir: generated_dir.into(),
            subject_map: None,
            topic_map: PathBuf::from(DEFAULT_TOPIC_MAP),
            max_approved: ExportConfig::default().max_approved,
            live_enrichment: false,
            wikipedia: WikipediaConfig::from_env(),
            wikidata: WikidataConfig::from_env(),
        }
    }

    pub fn with_subject_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.subject_map = Some(path.into());
        self
    }

    pub fn with_topic_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.topic_map = path.into();
        self
    }

    pub fn with_max_approved(mut self, max: usize) -> Self {
        self.max_approved = max;
        self
    }

    pub fn with_live_enrichment(mut self, enabled: bool) -> Self {
        self.live_enrichment = enabled;
        self
    }

    pub fn with_wikipedia(mut self, config: WikipediaConfig) -> Self {
        self.wikipedia = config;
        self
    }

    pub fn with_wikidata(mut self, config: WikidataConfig) -> Self {
        self.wikidata = config;
        self
    }

    pub fn extracted_path(&self) -> PathBuf {
        self.staging_dir.join(EXTRACTED_FILE)
    }

    pub fn enriched_path(&self) -> PathBuf {
        self.staging_dir.join(ENRICHED_FILE)
    }

    pub fn curated_path(&self) -> PathBuf {
        self.staging_dir.join(CURATED_FILE)
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.generated_dir.join(CANDIDATES_FILE)
    }

    pub fn approved_path(&self) -> PathBuf {
        self.generated_dir.join(APPROVED_FILE)
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Pages that contributed to extraction.
    pub pages_processed: usize,
    /// Raw formulas extracted.
    pub extracted: usize,
    pub enrichment: EnrichmentStats,
    pub curation: CurationStats,
    /// Records in the candidates file.
    pub curated: usize,
    /// Records in the approved payload.
    pub approved: usize,
    pub extracted_path: PathBuf,
    pub enriched_path: PathBuf,
    pub curated_path: PathBuf,
    pub candidates_path: PathBuf,
    pub approved_path: PathBuf,
}

/// Runs every stage in order, persisting each stage's output.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> Result<PipelineReport> {
        let config = &self.config;
        create_dir(&config.staging_dir)?;
        create_dir(&config.generated_dir)?;

        let extraction = self.extract()?;
        write_records(config.extracted_path(), &extraction.records)?;
        info!(
            pages = extraction.pages_processed,
            records = extraction.records.len(),
            path = %config.extracted_path().display(),
            "Extraction complete"
        );

        let raw: Vec<RawFormulaRecord> = read_records(config.extracted_path())?;
        let (enriched, enrichment) = self.enrich(raw)?;
        write_records(config.enriched_path(), &enriched)?;

        let enriched: Vec<EnrichedFormulaRecord> = read_records(config.enriched_path())?;
        let rules = TopicRules::load(&config.topic_map)?;
        let (curated, curation) = Curator::new(rules).curate(&enriched);
        write_records(config.curated_path(), &curated)?;

        let curated: Vec<CuratedFormulaRecord> = read_records(config.curated_path())?;
        let exporter =
            Exporter::new(ExportConfig::default().with_max_approved(config.max_approved));
        let summary = exporter.export(&curated, config.candidates_path(), config.approved_path())?;

        Ok(PipelineReport {
            pages_processed: extraction.pages_processed,
            extracted: extraction.records.len(),
            enrichment,
            curation,
            curated: summary.candidates,
            approved: summary.approved,
            extracted_path: config.extracted_path(),
            enriched_path: config.enriched_path(),
            curated_path: config.curated_path(),
            candidates_path: config.candidates_path(),
            approved_path: config.approved_path(),
        })
    }

    fn extract(&self) -> Result<Extraction> {
        match &self.config.source {
            PipelineSource::Dump(path) => DumpExtractor::new(path).extract(),
            PipelineSource::Titles(path) => {
                let titles = load_titles(path)?;
                let client = WikipediaClient::new(self.config.wikipedia.clone())?;
                ApiExtractor::from_client(client, titles).extract()
            }
        }
    }

    fn enrich(
        &self,
        records: Vec<RawFormulaRecord>,
    ) -> Result<(Vec<EnrichedFormulaRecord>, EnrichmentStats)> {
        let static_map = load_subject_map(self.config.subject_map.as_deref())?;

        let live_map = if self.config.live_enrichment {
            let client = WikidataClient::new(self.config.wikidata.clone())?;
            build_live_map(&client, &self.config.wikidata, &records)?
        } else {
            SubjectMap::new()
        };

        Ok(Enricher::new(static_map)
            .with_live_map(live_map)
            .enrich(records))
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| IngestError::io(path, e))
}
