//! Run command - every stage end to end.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::{Pipeline, PipelineConfig, PipelineSource};

use super::non_negative;

/// Arguments of the `run` subcommand.
pub struct RunArgs {
    pub wiki_dump: Option<PathBuf>,
    pub titles_file: Option<PathBuf>,
    pub staging_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub subject_map: Option<PathBuf>,
    pub topic_map: PathBuf,
    pub max_approved: i64,
    pub live: bool,
    pub user_agent: Option<String>,
}

pub fn run(args: RunArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = match (args.wiki_dump, args.titles_file) {
        (Some(dump), _) => PipelineSource::Dump(dump),
        (None, Some(titles)) => PipelineSource::Titles(titles),
        (None, None) => return Err("Either --wiki-dump or --titles-file is required".into()),
    };

    let mut config = PipelineConfig::new(source, args.staging_dir, args.generated_dir)
        .with_topic_map(args.topic_map)
        .with_max_approved(non_negative(args.max_approved))
        .with_live_enrichment(args.live);
    if let Some(path) = args.subject_map {
        config = config.with_subject_map(path);
    }
    if let Some(agent) = args.user_agent {
        config.wikipedia.user_agent = agent.clone();
        config.wikidata.user_agent = agent;
    }

    println!("{}", "Running formula ingestion pipeline".cyan().bold());
    let report = Pipeline::new(config).run()?;

    println!();
    println!("{}", "Extract".yellow().bold());
    println!("  Pages processed:    {}", report.pages_processed);
    println!("  Formulas extracted: {}", report.extracted);

    println!("{}", "Enrich".yellow().bold());
    println!("  Static matches: {}", report.enrichment.matched_static);
    println!("  Live matches:   {}", report.enrichment.matched_live);

    println!("{}", "Curate".yellow().bold());
    println!(
        "  Rejected by quality gate: {}",
        report.curation.rejected_by_quality_gate.to_string().red()
    );
    println!(
        "  Duplicates dropped:       {}",
        report.curation.duplicates.to_string().yellow()
    );
    println!("  Curated:                  {}", report.curated.to_string().green());

    println!("{}", "Export".yellow().bold());
    println!("  Approved: {}", report.approved.to_string().green().bold());

    if verbose {
        println!();
        println!("{}", "Files:".yellow().bold());
        for path in [
            &report.extracted_path,
            &report.enriched_path,
            &report.curated_path,
            &report.candidates_path,
            &report.approved_path,
        ] {
            println!("  {}", path.display());
        }
    }

    println!();
    println!(
        "{} {}",
        "Approved payload written to".green().bold(),
        report.approved_path.display()
    );

    Ok(())
}
