//! Curate command - gate, deduplicate and classify.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::record::{read_records, write_records};
use formula_ingest::{Curator, EnrichedFormulaRecord, TopicRules};

use super::print_written;

pub fn run(
    input: PathBuf,
    output: PathBuf,
    topic_map: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    if !topic_map.exists() {
        return Err(format!("Topic map not found: {}", topic_map.display()).into());
    }

    let records: Vec<EnrichedFormulaRecord> = read_records(&input)?;
    let rules = TopicRules::load(&topic_map)?;

    println!(
        "{} {} records against {} topic rules",
        "Curating".cyan().bold(),
        records.len().to_string().white().bold(),
        rules.len()
    );

    let (curated, stats) = Curator::new(rules).curate(&records);
    write_records(&output, &curated)?;

    println!(
        "  Rejected by quality gate: {}",
        stats.rejected_by_quality_gate.to_string().red()
    );
    println!("  Duplicates dropped:       {}", stats.duplicates.to_string().yellow());
    println!("  Curated:                  {}", stats.curated.to_string().green());
    print_written(curated.len(), &output);

    Ok(())
}
