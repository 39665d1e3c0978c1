//! CLI command implementations.

pub mod curate;
pub mod enrich;
pub mod export;
pub mod extract;
pub mod extract_api;
pub mod run;

use std::path::Path;

use colored::Colorize;

/// Clamp a signed flag value to a count.
pub fn non_negative(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Print a "wrote N records" line.
pub fn print_written(count: usize, path: &Path) {
    println!(
        "{} {} records to {}",
        "Wrote".green().bold(),
        count.to_string().white().bold(),
        path.display()
    );
}
