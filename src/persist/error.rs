//! Error types for the persist module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing records and assets to disk.
#[derive(Debug, Error)]
pub enum PersistError {
    /// An asset request returned a non-success status.
    #[error("HTTP {status} downloading {url}")]
    Download {
        /// The asset URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level error while requesting or streaming an asset.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The asset URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The asset URL.
        url: String,
    },

    /// File system error (create directory, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("failed to serialize record for {path}: {source}")]
    Serialize {
        /// Destination of the record.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The run was cancelled while the asset was streaming.
    #[error("download of {url} interrupted")]
    Interrupted {
        /// The asset URL.
        url: String,
    },
}

impl PersistError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates a download status error.
    pub fn download(url: impl Into<String>, status: u16) -> Self {
        Self::Download {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
