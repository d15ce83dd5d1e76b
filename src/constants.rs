//! Constants shared by the HTTP and persistence layers.

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large assets).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Buffer size used when streaming binary assets to disk.
pub(crate) const DOWNLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Suffix of the temporary sibling a file is written to before it is renamed into place.
pub(crate) const PARTIAL_SUFFIX: &str = "part";
