//! Archives every resource type not covered by the collection/item/file chain.

use tracing::{debug, info, warn};

use super::{ArchiveError, ArchiveStats, Archiver};
use crate::api::{ResourceInfo, ResourceKind};
use crate::record::record_id;

impl Archiver {
    /// Walks the `resources` descriptor and archives each remaining type:
    /// singletons as `<name>.json`, paginated types as `<name>/<id>.json`.
    ///
    /// Types the server refuses (401/403/404) are skipped with a warning.
    pub(super) async fn archive_other_resources(
        &self,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        self.ensure_running()?;
        let descriptor = self.client.resources().await?;
        if descriptor.is_empty() {
            warn!("resource descriptor lists no resource types");
            return Ok(());
        }
        debug!(resources = descriptor.len(), "fetched resource descriptor");

        for (name, info) in descriptor.iter() {
            if self.config.is_excluded(name) {
                debug!(resource = name, "excluded resource type");
                continue;
            }

            let outcome = match info.kind() {
                ResourceKind::Paginated => self.archive_paginated_resource(name, info, stats).await,
                ResourceKind::Singleton => self.archive_singleton_resource(name, info, stats).await,
                ResourceKind::Unbrowsable => {
                    debug!(resource = name, "resource type supports neither index nor get");
                    continue;
                }
            };

            match outcome {
                Err(ArchiveError::Api(e)) if e.is_access_denied() => {
                    warn!(resource = name, error = %e, "resource type not accessible; skipping");
                    stats.skipped_resources += 1;
                }
                other => other?,
            }
        }
        Ok(())
    }

    async fn archive_singleton_resource(
        &self,
        name: &str,
        info: &ResourceInfo,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        self.ensure_running()?;
        let url = self.client.browse_url(name, info)?;
        match self.client.get_json(url.as_str()).await? {
            Some(value) => {
                self.persister
                    .persist_json(&value, &self.layout.singleton_resource(name))
                    .await?;
                stats.other_records += 1;
            }
            None => warn!(resource = name, url = %url, "empty response; nothing archived"),
        }
        Ok(())
    }

    async fn archive_paginated_resource(
        &self,
        name: &str,
        info: &ResourceInfo,
        stats: &mut ArchiveStats,
    ) -> Result<(), ArchiveError> {
        let url = self.client.browse_url(name, info)?;
        let mut records = self.client.paginate(url.as_str(), &[])?;
        let mut written: u64 = 0;
        while let Some(record) = self.next_record(&mut records).await? {
            let id = record_id(&record, name)?;
            self.persister
                .persist_json(&record, &self.layout.resource_record(name, &id))
                .await?;
            stats.other_records += 1;
            written += 1;
        }
        info!(resource = name, records = written, "archived resource type");
        Ok(())
    }
}
