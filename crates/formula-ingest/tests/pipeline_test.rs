//! Integration tests for the staged pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use formula_ingest::export::derive_id;
use formula_ingest::record::{read_records, write_records};
use formula_ingest::{
    CuratedFormulaRecord, Curator, Difficulty, EnrichedFormulaRecord, Enricher, IngestError,
    Pipeline, PipelineConfig, PipelineSource, RawFormulaRecord, Source, SubjectMap, TopicRules,
};

const DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <page>
    <title>Pythagorean theorem</title>
    <id>26513034</id>
    <revision>
      <id>1</id>
      <text>&lt;math&gt;a^2 + b^2 = c^2&lt;/math&gt; restated as
&lt;math&gt;a^2+b^2=c^2&lt;/math&gt; with &lt;math&gt;x&lt;/math&gt;</text>
    </revision>
  </page>
  <page>
    <title>Integral</title>
    <id>15258</id>
    <revision>
      <id>2</id>
      <text>&lt;math&gt;\int_0^1 x\,dx&lt;/math&gt;</text>
    </revision>
  </page>
</mediawiki>"#;

const TOPIC_MAP: &str = r#"
topics:
  geometry:
    keywords: ['pythagorean', 'euclidean']
  calculus:
    keywords: ['\int', 'integral']
"#;

const SUBJECT_MAP: &str = r#"{
  "Pythagorean theorem": {"item_id": "Q11518", "subjects": ["Euclidean geometry"]},
  "Broken": 7
}"#;

/// Helper to write a fixture file into `dir`.
fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn dump_config(dir: &TempDir) -> PipelineConfig {
    let dump = write_fixture(dir.path(), "dump.xml", DUMP);
    let topics = write_fixture(dir.path(), "topic_map.yaml", TOPIC_MAP);
    let subjects = write_fixture(dir.path(), "subjects.json", SUBJECT_MAP);

    PipelineConfig::new(
        PipelineSource::Dump(dump),
        dir.path().join("staging"),
        dir.path().join("generated"),
    )
    .with_topic_map(topics)
    .with_subject_map(subjects)
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&text).expect("Output is not JSON")
}

// =============================================================================
// Stage Composition Tests
// =============================================================================

#[test]
fn test_whitespace_variants_collapse_to_one_record() {
    let dir = TempDir::new().unwrap();
    let raw_path = dir.path().join("raw.jsonl");

    let raw = vec![
        RawFormulaRecord::new("x^2 + 1", Source::Dump),
        RawFormulaRecord::new(" x^2+1 ", Source::Dump),
        RawFormulaRecord::new("\\frac{a}{b}", Source::Dump),
    ];
    write_records(&raw_path, &raw).unwrap();

    let raw: Vec<RawFormulaRecord> = read_records(&raw_path).unwrap();
    let (enriched, _) = Enricher::new(SubjectMap::new()).enrich(raw);
    let (curated, stats) = Curator::new(TopicRules::default()).curate(&enriched);

    assert_eq!(curated.len(), 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(curated[0].latex, "x^2 + 1");
    assert_eq!(curated[0].name, "Formula: x^2 + 1");
    assert_eq!(curated[1].latex, "\\frac{a}{b}");
    assert!(curated.iter().all(|c| c.difficulty == Difficulty::Easy));
    assert!(curated.iter().all(|c| c.topics == vec!["algebra"]));
}

#[test]
fn test_stage_files_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let enriched_path = dir.path().join("enriched.jsonl");
    let curated_path = dir.path().join("curated.jsonl");

    let (enriched, _) = Enricher::default().enrich(vec![
        RawFormulaRecord::new("E = mc^2", Source::Api)
            .with_page(Some("Mass".into()), Some("7".into())),
    ]);
    write_records(&enriched_path, &enriched).unwrap();

    let enriched: Vec<EnrichedFormulaRecord> = read_records(&enriched_path).unwrap();
    let (curated, _) = Curator::default().curate(&enriched);
    write_records(&curated_path, &curated).unwrap();

    let reloaded: Vec<CuratedFormulaRecord> = read_records(&curated_path).unwrap();
    assert_eq!(reloaded, curated);
    assert_eq!(reloaded[0].source, Source::Api);
}

// =============================================================================
// Full Pipeline Tests
// =============================================================================

#[test]
fn test_pipeline_from_dump() {
    let dir = TempDir::new().unwrap();
    let report = Pipeline::new(dump_config(&dir)).run().expect("Pipeline failed");

    assert_eq!(report.pages_processed, 2);
    assert_eq!(report.extracted, 4);
    assert_eq!(report.enrichment.matched_static, 3);
    assert_eq!(report.curation.rejected_by_quality_gate, 1);
    assert_eq!(report.curation.duplicates, 1);
    assert_eq!(report.curated, 2);
    assert_eq!(report.approved, 2);

    for path in [
        &report.extracted_path,
        &report.enriched_path,
        &report.curated_path,
        &report.candidates_path,
        &report.approved_path,
    ] {
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn test_pipeline_enriched_stage_carries_subjects() {
    let dir = TempDir::new().unwrap();
    let report = Pipeline::new(dump_config(&dir)).run().unwrap();

    let enriched: Vec<EnrichedFormulaRecord> = read_records(&report.enriched_path).unwrap();
    let pythagoras = &enriched[0];
    assert_eq!(pythagoras.metadata.wikidata_item_id.as_deref(), Some("Q11518"));
    assert_eq!(pythagoras.metadata.wikidata_subjects, vec!["Euclidean geometry"]);

    let integral = enriched.last().unwrap();
    assert_eq!(integral.metadata.wikidata_item_id, None);
    assert!(integral.metadata.wikidata_subjects.is_empty());
}

#[test]
fn test_pipeline_approved_payload() {
    let dir = TempDir::new().unwrap();
    let report = Pipeline::new(dump_config(&dir)).run().unwrap();

    let payload = read_json(&report.approved_path);
    assert_eq!(payload["version"], "v1");
    let generated_at = payload["generatedAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(generated_at).is_ok());

    let expressions = payload["expressions"].as_array().unwrap();
    assert_eq!(expressions.len(), 2);

    assert_eq!(expressions[0]["name"], "Integral");
    assert_eq!(expressions[0]["topics"], serde_json::json!(["calculus"]));

    let pythagoras = &expressions[1];
    assert_eq!(pythagoras["name"], "Pythagorean theorem");
    assert_eq!(pythagoras["latex"], "a^2 + b^2 = c^2");
    assert_eq!(pythagoras["id"], derive_id("a^2 + b^2 = c^2", 12));
    assert_eq!(pythagoras["topics"], serde_json::json!(["geometry"]));
    assert_eq!(pythagoras["subtopics"], serde_json::json!(["fundamentals"]));
    assert_eq!(pythagoras["source"], "wikipedia");
    assert_eq!(pythagoras["difficulty"], "easy");
}

#[test]
fn test_pipeline_candidates_keep_curated_order() {
    let dir = TempDir::new().unwrap();
    let report = Pipeline::new(dump_config(&dir)).run().unwrap();

    let candidates: Vec<CuratedFormulaRecord> = read_records(&report.candidates_path).unwrap();
    let curated: Vec<CuratedFormulaRecord> = read_records(&report.curated_path).unwrap();
    assert_eq!(candidates, curated);
    assert_eq!(candidates[0].name, "Pythagorean theorem");
    assert_eq!(candidates[0].metadata.page_id.as_deref(), Some("26513034"));
}

#[test]
fn test_pipeline_respects_max_approved() {
    let dir = TempDir::new().unwrap();
    let report = Pipeline::new(dump_config(&dir).with_max_approved(1)).run().unwrap();

    assert_eq!(report.curated, 2);
    assert_eq!(report.approved, 1);
    let payload = read_json(&report.approved_path);
    assert_eq!(payload["expressions"][0]["name"], "Integral");
}

#[test]
fn test_pipeline_rerun_is_stable() {
    let dir = TempDir::new().unwrap();
    let config = dump_config(&dir);

    let first = Pipeline::new(config.clone()).run().unwrap();
    let first_payload = read_json(&first.approved_path);
    let second = Pipeline::new(config).run().unwrap();
    let second_payload = read_json(&second.approved_path);

    assert_eq!(first.curated, second.curated);
    assert_eq!(first_payload["expressions"], second_payload["expressions"]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_pipeline_missing_topic_map_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dump_config(&dir).with_topic_map(dir.path().join("nope.yaml"));

    let result = Pipeline::new(config).run();
    assert!(matches!(result, Err(IngestError::Io { .. })));
}

#[test]
fn test_pipeline_missing_dump_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new(
        PipelineSource::Dump(dir.path().join("absent.xml")),
        dir.path().join("staging"),
        dir.path().join("generated"),
    );

    assert!(Pipeline::new(config).run().is_err());
    assert!(!dir.path().join("generated/formulas_approved.json").exists());
}

#[test]
fn test_corrupt_staged_record_names_line() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        dir.path(),
        "wiki_math.jsonl",
        "{\"latex\": \"a+b\"}\n\nnot json\n",
    );

    match read_records::<RawFormulaRecord>(&path) {
        Err(IngestError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other.map(|r| r.len())),
    }
}
