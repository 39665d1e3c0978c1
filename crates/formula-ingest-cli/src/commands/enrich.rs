//! Enrich command - attach Wikidata metadata by page title.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::enrichment::{build_live_map, load_subject_map};
use formula_ingest::record::{read_records, write_records};
use formula_ingest::{Enricher, RawFormulaRecord, SubjectMap, WikidataClient, WikidataConfig};

use super::print_written;

pub fn run(
    input: PathBuf,
    output: PathBuf,
    subject_map: Option<PathBuf>,
    live: bool,
    user_agent: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<RawFormulaRecord> = read_records(&input)?;
    let static_map = load_subject_map(subject_map.as_deref())?;

    println!(
        "{} {} records ({} static entries{})",
        "Enriching".cyan().bold(),
        records.len().to_string().white().bold(),
        static_map.len(),
        if live { ", live Wikidata" } else { "" }
    );

    let live_map = if live {
        let mut config = WikidataConfig::from_env();
        if let Some(agent) = user_agent {
            config = config.with_user_agent(agent);
        }
        let client = WikidataClient::new(config.clone())?;
        build_live_map(&client, &config, &records)?
    } else {
        SubjectMap::new()
    };

    let (enriched, stats) = Enricher::new(static_map)
        .with_live_map(live_map)
        .enrich(records);
    write_records(&output, &enriched)?;

    println!("  Static matches: {}", stats.matched_static.to_string().green());
    if live {
        println!("  Live matches:   {}", stats.matched_live.to_string().green());
    }
    print_written(enriched.len(), &output);

    Ok(())
}
