//! Export command - candidates file plus approved payload.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::record::read_records;
use formula_ingest::{CuratedFormulaRecord, ExportConfig, Exporter};

use super::non_negative;

pub fn run(
    input: PathBuf,
    candidates_output: PathBuf,
    approved_output: PathBuf,
    max_approved: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let curated: Vec<CuratedFormulaRecord> = read_records(&input)?;
    let config = ExportConfig::default().with_max_approved(non_negative(max_approved));

    let summary = Exporter::new(config).export(&curated, &candidates_output, &approved_output)?;

    println!("{}", "Export complete".green().bold());
    println!(
        "  Candidates: {} -> {}",
        summary.candidates.to_string().white().bold(),
        candidates_output.display()
    );
    println!(
        "  Approved:   {} -> {}",
        summary.approved.to_string().white().bold(),
        approved_output.display()
    );

    Ok(())
}
