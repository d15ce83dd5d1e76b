//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use omeka_archive_core::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};

/// Default run log, created in the working directory.
pub const DEFAULT_LOG_FILE: &str = "omeka-archive.log";

/// Archive an Omeka site to disk.
///
/// Downloads the site metadata, every collection, item and file record, every
/// file asset, and every other browsable resource type into a directory tree
/// mirroring the API.
#[derive(Parser, Debug)]
#[command(name = "omeka-archive")]
#[command(author, version, about)]
pub struct Args {
    /// Omeka base URL, e.g. http://example.org/omeka
    pub url: String,

    /// Omeka API key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Seconds to sleep after each page fetch and download (fractions allowed)
    #[arg(short, long, default_value_t = 0.0, value_parser = parse_sleep)]
    pub sleep: f64,

    /// Archive directory (default: host and path of URL with '/' replaced by '-')
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Additional resource type to leave out of the archive (repeatable)
    #[arg(long = "skip-resource", value_name = "NAME")]
    pub skip_resources: Vec<String>,

    /// Run log, appended to on every run
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_sleep(value: &str) -> Result<f64, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("`{value}` must be a non-negative number of seconds"));
    }
    Ok(secs)
}
