//! Extract-api command - fetch pages by title from the live API.

use std::path::PathBuf;

use colored::Colorize;
use formula_ingest::record::{load_titles, write_records};
use formula_ingest::{ApiExtractor, FormulaExtractor, WikipediaClient, WikipediaConfig};

use super::{non_negative, print_written};

pub fn run(
    titles_file: PathBuf,
    output: PathBuf,
    batch_size: i64,
    user_agent: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !titles_file.exists() {
        return Err(format!("Titles file not found: {}", titles_file.display()).into());
    }

    let titles = load_titles(&titles_file)?;
    if titles.is_empty() {
        println!("{}", "No titles to fetch.".yellow());
    }

    let mut config = WikipediaConfig::from_env().with_batch_size(non_negative(batch_size));
    if let Some(agent) = user_agent {
        config = config.with_user_agent(agent);
    }

    println!(
        "{} {} titles ({} per request)",
        "Fetching".cyan().bold(),
        titles.len().to_string().white().bold(),
        config.batch_size
    );

    let client = WikipediaClient::new(config)?;
    let extraction = ApiExtractor::from_client(client, titles).extract()?;
    write_records(&output, &extraction.records)?;

    println!("  Pages returned:     {}", extraction.pages_processed);
    println!("  Formulas extracted: {}", extraction.records.len());
    print_written(extraction.records.len(), &output);

    Ok(())
}
