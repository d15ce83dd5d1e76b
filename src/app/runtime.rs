use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use omeka_archive_core::{ArchiveConfig, ArchiveStats, Archiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::terminal;
use crate::cli::Args;

/// Outcome of a completed run.
pub(crate) struct RunSummary {
    pub(crate) stats: ArchiveStats,
    pub(crate) archive_dir: PathBuf,
}

/// Builds the run configuration from CLI arguments.
pub(crate) fn build_config(args: &Args) -> Result<ArchiveConfig> {
    let config = ArchiveConfig::new(&args.url)?
        .with_key(args.key.clone())
        .with_sleep_secs(args.sleep)?
        .with_excluded_resources(args.skip_resources.iter().cloned())
        .with_timeouts(
            Duration::from_secs(args.connect_timeout),
            Duration::from_secs(args.timeout),
        );

    let archive_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.archive_dir().to_path_buf());
    let archive_dir = std::path::absolute(&archive_dir)
        .with_context(|| format!("cannot resolve archive directory {}", archive_dir.display()))?;
    Ok(config.with_archive_dir(archive_dir))
}

/// Runs one archive, cancelling it on Ctrl-C.
pub(crate) async fn run_archive(args: &Args) -> Result<RunSummary> {
    let config = build_config(args)?;
    info!(
        url = %config.base_url(),
        archive_dir = %config.archive_dir().display(),
        sleep_secs = config.throttle().as_secs_f64(),
        has_key = config.key().is_some(),
        "Omeka archive starting"
    );

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            signal_token.cancel();
        }
    });

    let show_progress =
        terminal::should_show_progress(io::stderr().is_terminal(), args.quiet, args.no_progress);
    let archive_dir = config.archive_dir().to_path_buf();
    let archiver = Archiver::new(config, cancel)?.with_progress(show_progress);
    let stats = archiver.run().await?;

    Ok(RunSummary { stats, archive_dir })
}
