//! Writes decoded records and streamed assets to disk.
//!
//! Both kinds of write create missing parent directories, overwrite whatever
//! is already at the destination, and go through a `.part` sibling that is
//! renamed into place once complete. An interrupted run therefore never
//! leaves a truncated file at a final archive path.

mod error;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

pub use error::PersistError;

use crate::constants::{DOWNLOAD_CHUNK_SIZE, PARTIAL_SUFFIX};
use crate::throttle::Throttle;

/// Writes JSON records and binary assets into the archive.
#[derive(Debug, Clone)]
pub struct Persister {
    client: Client,
    throttle: Throttle,
    cancel: CancellationToken,
}

impl Persister {
    /// Creates a persister downloading through `client`.
    ///
    /// `throttle` is applied after every completed asset download; `cancel`
    /// aborts a download between chunks.
    #[must_use]
    pub fn new(client: Client, throttle: Throttle, cancel: CancellationToken) -> Self {
        Self {
            client,
            throttle,
            cancel,
        }
    }

    /// Writes `value` to `path` as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if serialization or any file operation fails.
    pub async fn persist_json(&self, value: &Value, path: &Path) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        ensure_parent_dir(path).await?;

        info!(path = %path.display(), "writing record");
        let partial = partial_path(path);
        if let Err(e) = tokio::fs::write(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(PersistError::io(partial, e));
        }
        commit(&partial, path).await
    }

    /// Streams the body of `url` to `path`, returning the number of bytes written.
    ///
    /// Any non-success status is an error; nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Download`] on a non-success status,
    /// [`PersistError::Interrupted`] if the run is cancelled mid-stream, and
    /// network or IO errors otherwise.
    #[instrument(skip(self, path))]
    pub async fn persist_binary(&self, url: &str, path: &Path) -> Result<u64, PersistError> {
        if self.cancel.is_cancelled() {
            return Err(PersistError::Interrupted {
                url: url.to_string(),
            });
        }
        info!(url, path = %path.display(), "saving asset");
        ensure_parent_dir(path).await?;

        let sent = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                return Err(PersistError::Interrupted { url: url.to_string() });
            }
            sent = self.client.get(url).send() => sent,
        };
        let response = sent.map_err(|e| PersistError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url, "asset download failed");
            return Err(PersistError::download(url, status.as_u16()));
        }

        let partial = partial_path(path);
        let file = File::create(&partial)
            .await
            .map_err(|e| PersistError::io(partial.clone(), e))?;

        let bytes = match self.stream_to_file(file, response, url, &partial).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %partial.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        commit(&partial, path).await?;
        debug!(bytes, "asset saved");

        self.throttle.pause().await;
        Ok(bytes)
    }

    async fn stream_to_file(
        &self,
        file: File,
        response: reqwest::Response,
        url: &str,
        file_path: &Path,
    ) -> Result<u64, PersistError> {
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(PersistError::Interrupted { url: url.to_string() });
                }
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| PersistError::network(url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| PersistError::io(file_path, e))?;
            bytes_written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| PersistError::io(file_path, e))?;
        Ok(bytes_written)
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PersistError::io(parent, e))?;
    }
    Ok(())
}

async fn commit(partial: &Path, path: &Path) -> Result<(), PersistError> {
    if let Err(e) = tokio::fs::rename(partial, path).await {
        let _ = tokio::fs::remove_file(partial).await;
        return Err(PersistError::io(path, e));
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
