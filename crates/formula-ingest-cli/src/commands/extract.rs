//! Extract command - pull formulas out of an XML dump.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::record::write_records;
use formula_ingest::{DumpExtractor, FormulaExtractor};

use super::print_written;

pub fn run(wiki_dump: PathBuf, output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !wiki_dump.exists() {
        return Err(format!("Wiki dump not found: {}", wiki_dump.display()).into());
    }

    println!(
        "{} {}",
        "Extracting formulas from".cyan().bold(),
        wiki_dump.display().to_string().white()
    );

    let extraction = DumpExtractor::new(&wiki_dump).extract()?;
    write_records(&output, &extraction.records)?;

    println!("  Pages processed:    {}", extraction.pages_processed);
    println!("  Formulas extracted: {}", extraction.records.len());
    print_written(extraction.records.len(), &output);

    Ok(())
}
