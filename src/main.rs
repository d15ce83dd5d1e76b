//! CLI entry point for the Omeka archiver.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};

mod app;
mod cli;

use app::exit_handler::{ProcessExit, determine_exit_outcome};
use app::{runtime, terminal};
use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = terminal::resolve_default_log_level(args.verbose, args.quiet);
    if let Err(e) = terminal::init_tracing(default_level, &args.log_file) {
        eprintln!("error: {e:#}");
        return ProcessExit::Failure.code();
    }
    debug!(url = %args.url, "CLI arguments parsed");

    let outcome = match runtime::run_archive(&args).await {
        Ok(summary) => {
            let stats = summary.stats;
            info!(
                archive_dir = %summary.archive_dir.display(),
                asset_bytes = stats.asset_bytes,
                skipped_resources = stats.skipped_resources,
                "Archive complete"
            );
            if !args.quiet {
                println!(
                    "Archived {} collections, {} items, {} files, {} assets and {} other records into {}",
                    stats.collections,
                    stats.items,
                    stats.files,
                    stats.assets,
                    stats.other_records,
                    summary.archive_dir.display()
                );
            }
            ProcessExit::Success
        }
        Err(err) => {
            let outcome = determine_exit_outcome(&err);
            if outcome == ProcessExit::Interrupted {
                warn!("archive interrupted by user");
                eprintln!("Interrupted. The archive is incomplete; run the same command again to finish it.");
            } else {
                error!(error = %format!("{err:#}"), "archive failed");
                eprintln!("error: {err:#}");
            }
            outcome
        }
    };

    outcome.code()
}
