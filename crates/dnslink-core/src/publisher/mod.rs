//! Content publisher
//!
//! Uploads an artifact tree to a [`PinningService`] and garbage-collects the
//! pins left under the same alias by previous runs.
//!
//! ## Flow
//!
//! 1. Authenticate (fatal on failure, never retried)
//! 2. List current pins for the alias (read, retried on transient failure)
//! 3. Upload once (non-idempotent, never retried)
//! 4. Unpin every previous CID that differs from the new one, independently
//!
//! Step 4 is best-effort: the new pin is already live, so a failed unpin
//! only leaves clutter. Each result is kept in [`PublishOutcome::cleanup`].

use std::path::Path;
use tracing::{debug, info, warn};

use crate::cid::ContentId;
use crate::error::{CleanupReport, Error, Result};
use crate::retry::{RetryPolicy, retry};
use crate::traits::{PinFilter, PinningService, ReplicationRegion, UploadOptions};

/// Result of a publish run
#[derive(Debug)]
pub struct PublishOutcome {
    /// The newly pinned CID
    pub cid: ContentId,

    /// CIDs pinned under the alias before the upload
    pub previous: Vec<ContentId>,

    /// One report per stale pin removal attempted
    pub cleanup: Vec<CleanupReport>,
}

impl PublishOutcome {
    /// Warnings for every failed unpin
    pub fn warnings(&self) -> Vec<String> {
        self.cleanup.iter().filter_map(CleanupReport::warning).collect()
    }

    /// CIDs that were successfully unpinned
    pub fn unpinned(&self) -> Vec<&str> {
        self.cleanup
            .iter()
            .filter(|report| report.is_ok())
            .map(|report| report.target.as_str())
            .collect()
    }
}

/// Publishes artifact trees to a pinning service
pub struct ContentPublisher<'a> {
    service: &'a dyn PinningService,
    read_policy: RetryPolicy,
}

impl<'a> ContentPublisher<'a> {
    /// Create a publisher
    ///
    /// `read_policy` governs pin listing only. Authentication and upload
    /// are always single attempts.
    pub fn new(service: &'a dyn PinningService, read_policy: RetryPolicy) -> Self {
        Self {
            service,
            read_policy,
        }
    }

    /// Upload `local_path` under `alias` and clean up stale pins
    ///
    /// # Returns
    ///
    /// - `Ok(PublishOutcome)`: the new CID is pinned; cleanup failures are in the outcome
    /// - `Err(Error)`: authentication, listing or upload failed
    pub async fn publish(
        &self,
        local_path: &Path,
        alias: &str,
        regions: &[ReplicationRegion],
    ) -> Result<PublishOutcome> {
        let service_name = self.service.service_name();

        if alias.trim().is_empty() {
            return Err(Error::invalid_input("Pin alias cannot be empty"));
        }

        if tokio::fs::metadata(local_path).await.is_err() {
            return Err(Error::invalid_input(format!(
                "Artifact path does not exist: {}",
                local_path.display()
            )));
        }

        info!(service = service_name, path = %local_path.display(), alias, "Publishing artifact tree");

        self.service.authenticate().await?;
        debug!(service = service_name, "Authentication successful");

        let filter = PinFilter::pinned(alias);
        let resource = format!("{} pin listing", service_name);
        let pins = retry(&self.read_policy, &resource, |_| self.service.list_pins(&filter)).await?;

        let mut previous: Vec<ContentId> = Vec::with_capacity(pins.len());
        for pin in pins {
            if !previous.contains(&pin.cid) {
                previous.push(pin.cid);
            }
        }

        if !previous.is_empty() {
            info!(
                alias,
                pins = %join(&previous),
                "Found previous pins"
            );
        }

        let options = UploadOptions::new(alias).with_regions(regions.to_vec());
        let cid = self.service.upload(local_path, &options).await?;
        info!(cid = %cid, "Uploaded");

        let stale: Vec<&ContentId> = previous.iter().filter(|old| **old != cid).collect();

        let mut cleanup = Vec::with_capacity(stale.len());
        if !stale.is_empty() {
            info!(count = stale.len(), "Cleaning up previous pins");
        }

        for old in stale {
            let result = self.service.unpin(old).await;
            match &result {
                Ok(()) => info!(cid = %old, "Unpinned"),
                Err(e) => warn!(cid = %old, error = %e, "Failed to unpin, leaving it pinned"),
            }
            cleanup.push(CleanupReport::new(old.as_str(), result));
        }

        Ok(PublishOutcome {
            cid,
            previous,
            cleanup,
        })
    }
}

fn join(cids: &[ContentId]) -> String {
    cids.iter()
        .map(ContentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
