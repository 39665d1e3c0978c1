//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Formula Ingest: curate Wikipedia math markup into an app-ready dataset
#[derive(Parser)]
#[command(name = "formula-ingest")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract <math> formulas from a MediaWiki XML dump
    Extract {
        /// Path to the pages-articles XML dump
        #[arg(long, value_name = "FILE")]
        wiki_dump: PathBuf,

        /// Output JSONL file for raw records
        #[arg(short, long, default_value = "staging/wiki_math.jsonl")]
        output: PathBuf,
    },

    /// Extract formulas for a list of page titles via the Wikipedia API
    ExtractApi {
        /// File with one page title per line (# starts a comment)
        #[arg(long, value_name = "FILE")]
        titles_file: PathBuf,

        /// Output JSONL file for raw records
        #[arg(short, long, default_value = "staging/wiki_math.jsonl")]
        output: PathBuf,

        /// Titles per API request (values below 1 are treated as 1)
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        batch_size: i64,

        /// User-Agent header sent to Wikipedia
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Attach Wikidata subjects and defining formulas to raw records
    Enrich {
        /// Raw records (JSONL)
        #[arg(short, long, default_value = "staging/wiki_math.jsonl")]
        input: PathBuf,

        /// Output JSONL file for enriched records
        #[arg(short, long, default_value = "staging/wiki_math_enriched.jsonl")]
        output: PathBuf,

        /// Precomputed title-keyed subject map (JSON)
        #[arg(long, value_name = "FILE")]
        subject_map: Option<PathBuf>,

        /// Query Wikidata for records that carry an item id
        #[arg(long)]
        live: bool,

        /// User-Agent header sent to Wikidata
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Quality-gate, deduplicate and classify enriched records
    Curate {
        /// Enriched records (JSONL)
        #[arg(short, long, default_value = "staging/wiki_math_enriched.jsonl")]
        input: PathBuf,

        /// Output JSONL file for curated records
        #[arg(short, long, default_value = "staging/wiki_math_curated.jsonl")]
        output: PathBuf,

        /// Topic rules (YAML or JSON)
        #[arg(long, default_value = "config/topic_map.yaml")]
        topic_map: PathBuf,
    },

    /// Write the candidates file and the approved payload
    Export {
        /// Curated records (JSONL)
        #[arg(short, long, default_value = "staging/wiki_math_curated.jsonl")]
        input: PathBuf,

        /// Full candidates dataset (JSONL)
        #[arg(long, default_value = "generated/formulas_candidates.jsonl")]
        candidates_output: PathBuf,

        /// Approved payload consumed by the app (JSON)
        #[arg(long, default_value = "generated/formulas_approved.json")]
        approved_output: PathBuf,

        /// Cap on approved expressions (negative values mean zero)
        #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
        max_approved: i64,
    },

    /// Run every stage end to end
    Run {
        /// Extract from a MediaWiki XML dump
        #[arg(
            long,
            value_name = "FILE",
            conflicts_with = "titles_file",
            required_unless_present = "titles_file"
        )]
        wiki_dump: Option<PathBuf>,

        /// Extract from the live API for the titles in this file
        #[arg(long, value_name = "FILE")]
        titles_file: Option<PathBuf>,

        /// Directory for intermediate stage files
        #[arg(long, default_value = "staging")]
        staging_dir: PathBuf,

        /// Directory for exported files
        #[arg(long, default_value = "generated")]
        generated_dir: PathBuf,

        /// Precomputed title-keyed subject map (JSON)
        #[arg(long, value_name = "FILE")]
        subject_map: Option<PathBuf>,

        /// Topic rules (YAML or JSON)
        #[arg(long, default_value = "config/topic_map.yaml")]
        topic_map: PathBuf,

        /// Cap on approved expressions (negative values mean zero)
        #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
        max_approved: i64,

        /// Query Wikidata for records that carry an item id
        #[arg(long)]
        live: bool,

        /// User-Agent header sent to Wikipedia and Wikidata
        #[arg(long)]
        user_agent: Option<String>,
    },
}
