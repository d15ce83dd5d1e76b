//! Immutable run configuration.
//!
//! An [`ArchiveConfig`] is built once from command-line input and then passed
//! by reference into the API client, the persister and the archiver. Nothing
//! in the library reads configuration from anywhere else.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};

/// Resource types never visited by the other-resources sweep.
///
/// `collections`, `items` and `files` are archived by the main traversal,
/// `site` and `resources` are meta endpoints, and `users` is not archived.
pub const DEFAULT_EXCLUDED_RESOURCES: &[&str] =
    &["collections", "items", "files", "users", "site", "resources"];

/// Errors raised while building an [`ArchiveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed or is not http(s).
    #[error("invalid Omeka base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected input.
        url: String,
    },

    /// The sleep interval is negative, NaN or too large to represent.
    #[error("invalid sleep interval {value}: expected a non-negative number of seconds")]
    InvalidSleep {
        /// The rejected value.
        value: f64,
    },
}

/// Settings for a single archive run.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    base_url: Url,
    api_url: Url,
    key: Option<String>,
    throttle: Duration,
    archive_dir: PathBuf,
    excluded_resources: BTreeSet<String>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl ArchiveConfig {
    /// Creates a configuration for the Omeka site at `base_url`.
    ///
    /// Trailing slashes are removed; the API root becomes `<base>/api/` and
    /// the archive directory defaults to [`default_archive_dir`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse or
    /// its scheme is not `http`/`https`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = || ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
        };

        let base = Url::parse(trimmed).map_err(|_| invalid())?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(invalid());
        }
        let api_url = Url::parse(&format!("{trimmed}/api/")).map_err(|_| invalid())?;
        let archive_dir = default_archive_dir(&base);

        Ok(Self {
            base_url: base,
            api_url,
            key: None,
            throttle: Duration::ZERO,
            archive_dir,
            excluded_resources: DEFAULT_EXCLUDED_RESOURCES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        })
    }

    /// Sets the API key appended to every API request.
    #[must_use]
    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key.filter(|k| !k.is_empty());
        self
    }

    /// Sets the delay inserted after every page fetch and asset download.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSleep`] for negative or non-finite values.
    pub fn with_sleep_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        self.throttle =
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidSleep { value: secs })?;
        Ok(self)
    }

    /// Overrides the archive root directory.
    #[must_use]
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    /// Adds resource types to skip during the other-resources sweep.
    #[must_use]
    pub fn with_excluded_resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_resources
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Overrides HTTP connect and read timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// The site base URL, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API root (`<base>/api/`).
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The configured API key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Delay applied after every page fetch and asset download.
    #[must_use]
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Root directory of the archive.
    #[must_use]
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Whether `name` is skipped by the other-resources sweep.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_resources.contains(name)
    }

    /// HTTP connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// HTTP read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

/// Derives an archive directory name from the host and path of `base`.
///
/// `http://example.org/omeka` becomes `example.org-omeka`.
#[must_use]
pub fn default_archive_dir(base: &Url) -> PathBuf {
    let mut name = base.host_str().unwrap_or_default().to_string();
    if let Some(port) = base.port() {
        name.push(':');
        name.push_str(&port.to_string());
    }
    name.push_str(base.path().trim_end_matches('/'));
    PathBuf::from(name.replace('/', "-"))
}
