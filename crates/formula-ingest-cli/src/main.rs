//! Formula Ingest CLI - build the formula dataset from Wikipedia.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract { wiki_dump, output } => commands::extract::run(wiki_dump, output),

        Commands::ExtractApi {
            titles_file,
            output,
            batch_size,
            user_agent,
        } => commands::extract_api::run(titles_file, output, batch_size, user_agent),

        Commands::Enrich {
            input,
            output,
            subject_map,
            live,
            user_agent,
        } => commands::enrich::run(input, output, subject_map, live, user_agent),

        Commands::Curate {
            input,
            output,
            topic_map,
        } => commands::curate::run(input, output, topic_map),

        Commands::Export {
            input,
            candidates_output,
            approved_output,
            max_approved,
        } => commands::export::run(input, candidates_output, approved_output, max_approved),

        Commands::Run {
            wiki_dump,
            titles_file,
            staging_dir,
            generated_dir,
            subject_map,
            topic_map,
            max_approved,
            live,
            user_agent,
        } => commands::run::run(
            commands::run::RunArgs {
                wiki_dump,
                titles_file,
                staging_dir,
                generated_dir,
                subject_map,
                topic_map,
                max_approved,
                live,
                user_agent,
            },
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
