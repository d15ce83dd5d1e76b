//! The archive traversal.
//!
//! [`Archiver::run`] walks an Omeka installation in strictly sequential
//! phases:
//!
//! 1. bootstrap check (nothing is written if it fails)
//! 2. `site.json`
//! 3. advisory item count for progress reporting
//! 4. collections, each followed by its items, their files and assets
//! 5. items straight from the flat endpoint when there are no collections
//! 6. every other browsable resource type listed by `resources`
//!
//! Each record is written as soon as it is fetched. Any failure aborts the
//! run; re-running overwrites the same paths with the same content.

mod error;
mod progress;
mod sweep;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use error::ArchiveError;
pub use progress::ArchiveProgress;

use crate::api::{ApiClient, Paginator};
use crate::config::ArchiveConfig;
use crate::layout::{ArchiveLayout, ItemScope};
use crate::persist::{PersistError, Persister};
use crate::record::{RecordId, collection_item_count, file_renditions, record_id};

/// Counts of what a run archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Collection records written.
    pub collections: u64,
    /// Item records written (the progress counter).
    pub items: u64,
    /// Advisory item total used for progress reporting.
    pub estimated_items: u64,
    /// File records written.
    pub files: u64,
    /// Binary assets downloaded.
    pub assets: u64,
    /// Bytes of binary assets downloaded.
    pub asset_bytes: u64,
    /// Records written by the other-resources sweep.
    pub other_records: u64,
    /// Resource types skipped because the server refused them.
    pub skipped_resources: u64,
}

/// Archives one Omeka installation into a directory tree.
#[derive(Debug)]
pub struct Archiver {
    config: ArchiveConfig,
    client: ApiClient,
    persister: Persister,
    layout: ArchiveLayout,
    cancel: CancellationToken,
    show_progress: bool,
}

impl Archiver {
    /// Creates an archiver for `config`; cancelling `cancel` abandons the
    /// request or download in flight and stops the run.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Api`] if the HTTP client cannot be built.
    pub fn new(config: ArchiveConfig, cancel: CancellationToken) -> Result<Self, ArchiveError> {
        let client = ApiClient::new(&config)?.with_cancellation(cancel.clone());
        let persister = Persister::new(client.http().clone(), client.throttle(), cancel.clone());
        let layout = ArchiveLayout::new(config.archive_dir());
        Ok(Self {
            config,
            client,
            persister,
            layout,
            cancel,
            show_progress: false,
        })
    }

    /// Draws a progress bar on stderr during the run.
    #[must_use]
    pub fn with_progress(mut self, visible: bool) -> Self {
        self.show_progress = visible;
        self
    }

    /// Runs the full traversal.
    ///
    /// # Errors
    ///
    /// Returns the first failure: [`ArchiveError::Api`] for bootstrap, page
    /// or decode failures, [`ArchiveError::Persist`] for write and download
    /// failures, [`ArchiveError::Record`] for records missing a required
    /// field, and [`ArchiveError::Interrupted`] when cancelled.
    pub async fn run(&self) -> Result<ArchiveStats, ArchiveError> {
        self.client.check_api().await?;

        let root = self.layout.root();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| PersistError::io(root, e))?;
        info!(
            site = %self.config.base_url(),
            api = %self.client.api_url(),
            root = %root.display(),
            "archiving Omeka site"
        );

        let mut stats = ArchiveStats::default();
        self.archive_site().await?;

        stats.estimated_items = self.estimate_total_items().await?;
        let progress = ArchiveProgress::new(stats.estimated_items, self.show_progress);

        let result = self.traverse(&progress, &mut stats).await;
        progress.finish();
        result?;

        info!(
            collections = stats.collections,
            items = stats.items,
            files = stats.files,
            assets = stats.assets,
            other_records = stats.other_records,
            "finished archiving {}",
            self.config.base_url()
        );
        Ok(stats)
    }

    async fn traverse(
        &self,
        progress: &ArchiveProgress,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        self.archive_collections(progress, stats).await?;

        if stats.collections == 0 {
            info!("no collections found; archiving items from the flat endpoint");
            self.archive_items(&ItemScope::Orphan, progress, stats).await?;
        }

        self.archive_other_resources(stats).await
    }

    async fn archive_site(&self) -> Result<(), ArchiveError> {
        self.ensure_running()?;
        let url = self.client.endpoint("site")?;
        self.persister
            .persist_binary(url.as_str(), &self.layout.site())
            .await?;
        Ok(())
    }

    /// Sums `items.count` over all collections, or counts flat items when
    /// there are no collections. Only feeds the progress bar.
    async fn estimate_total_items(&self) -> Result<u64, ArchiveError> {
        let mut total: u64 = 0;
        let mut saw_collection = false;

        let mut collections = self.client.paginate("collections", &[])?;
        while let Some(collection) = self.next_record(&mut collections).await? {
            saw_collection = true;
            match collection_item_count(&collection) {
                Ok(count) => total = total.saturating_add(count),
                Err(e) => warn!(error = %e, "no usable item count; progress total will be low"),
            }
        }

        if !saw_collection {
            let mut items = self.client.paginate("items", &[])?;
            while self.next_record(&mut items).await?.is_some() {
                total += 1;
            }
        }

        info!(total, "estimated item count");
        Ok(total)
    }

    async fn archive_collections(
        &self,
        progress: &ArchiveProgress,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        let mut collections = self.client.paginate("collections", &[])?;
        while let Some(collection) = self.next_record(&mut collections).await? {
            let id = record_id(&collection, "collection")?;
            self.persister
                .persist_json(&collection, &self.layout.collection_record(&id))
                .await?;
            stats.collections += 1;

            self.archive_items(&ItemScope::Collection(id), progress, stats)
                .await?;
        }
        Ok(())
    }

    async fn archive_items(
        &self,
        scope: &ItemScope,
        progress: &ArchiveProgress,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        let filter: Vec<(&str, &str)> = match scope {
            ItemScope::Collection(collection) => vec![("collection", collection.as_str())],
            ItemScope::Orphan => Vec::new(),
        };

        let mut items = self.client.paginate("items", &filter)?;
        while let Some(item) = self.next_record(&mut items).await? {
            let id = record_id(&item, "item")?;
            self.persister
                .persist_json(&item, &self.layout.item_record(scope, &id))
                .await?;
            progress.advance();
            stats.items += 1;

            self.archive_files(scope, &id, stats).await?;
        }
        Ok(())
    }

    async fn archive_files(
        &self,
        scope: &ItemScope,
        item: &RecordId,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        let mut files = self.client.paginate("files", &[("item", item.as_str())])?;
        while let Some(file) = self.next_record(&mut files).await? {
            let id = record_id(&file, "file")?;
            self.persister
                .persist_json(&file, &self.layout.file_record(scope, item, &id))
                .await?;
            stats.files += 1;

            for rendition in file_renditions(&file)? {
                let Some(url) = rendition.url else {
                    debug!(file = %id, rendition = rendition.name, "no URL for rendition");
                    continue;
                };
                self.ensure_running()?;
                let path = self
                    .layout
                    .rendition(scope, item, &id, rendition.name, url);
                stats.asset_bytes += self.persister.persist_binary(url, &path).await?;
                stats.assets += 1;
            }
        }
        Ok(())
    }

    /// Pulls the next record, giving up as soon as the run is cancelled.
    async fn next_record(&self, pager: &mut Paginator<'_>) -> Result<Option<Value>, ArchiveError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ArchiveError::Interrupted),
            record = pager.next_record() => Ok(record?),
        }
    }

    fn ensure_running(&self) -> Result<(), ArchiveError> {
        if self.cancel.is_cancelled() {
            Err(ArchiveError::Interrupted)
        } else {
            Ok(())
        }
    }
}
