// # Pinning Service Trait
//
// Defines the interface to a content-addressed storage backend that keeps
// ("pins") uploaded artifact trees.
//
// ## Implementations
//
// - Pinata: `dnslink-pinning-pinata` crate
//
// ## Usage
//
// ```rust,ignore
// use dnslink_core::traits::{PinningService, UploadOptions};
//
// let service = /* PinningService implementation */;
// service.authenticate().await?;
// let cid = service.upload(Path::new("build"), &UploadOptions::new("app")).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::cid::ContentId;
use crate::error::{Error, Result};

/// Pin status filter for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStatus {
    /// Currently pinned
    Pinned,
    /// Previously pinned, since removed
    Unpinned,
    /// Any status
    All,
}

impl PinStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            PinStatus::Pinned => "pinned",
            PinStatus::Unpinned => "unpinned",
            PinStatus::All => "all",
        }
    }
}

/// Filter for [`PinningService::list_pins`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinFilter {
    /// Human-readable alias the pins were created under
    pub alias: String,
    /// Status to match
    pub status: PinStatus,
}

impl PinFilter {
    /// Currently pinned items under `alias`
    pub fn pinned(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            status: PinStatus::Pinned,
        }
    }
}

/// A backend record associating a CID with an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Pinned content
    pub cid: ContentId,
    /// Alias the pin was created under, if the backend reports one
    pub alias: Option<String>,
}

/// One storage region in a replication policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationRegion {
    /// Region id (e.g. "FRA1")
    pub id: String,
    /// Desired replica count in this region
    pub replicas: u32,
}

impl ReplicationRegion {
    /// Create a region entry
    pub fn new(id: impl Into<String>, replicas: u32) -> Self {
        Self {
            id: id.into(),
            replicas,
        }
    }

    /// Parse a comma-separated list such as `FRA1:2,NYC1:2`
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::from_str)
            .collect()
    }
}

impl FromStr for ReplicationRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, replicas) = s.split_once(':').ok_or_else(|| {
            Error::config(format!("Replication region must be ID:COUNT, got '{}'", s))
        })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::config(format!("Replication region id is empty in '{}'", s)));
        }
        let replicas: u32 = replicas.trim().parse().map_err(|_| {
            Error::config(format!("Invalid replica count in '{}'", s))
        })?;
        if replicas == 0 {
            return Err(Error::config(format!("Replica count must be > 0 in '{}'", s)));
        }
        Ok(Self::new(id, replicas))
    }
}

impl fmt::Display for ReplicationRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.replicas)
    }
}

/// CID addressing version requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CidVersion {
    /// CIDv0 (base58 `Qm...`)
    V0,
    /// CIDv1 (base32 `bafy...`)
    #[default]
    V1,
}

impl CidVersion {
    /// Numeric version
    pub fn as_u8(&self) -> u8 {
        match self {
            CidVersion::V0 => 0,
            CidVersion::V1 => 1,
        }
    }
}

/// Options for [`PinningService::upload`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Alias stored as pin metadata
    pub alias: String,
    /// Replication policy
    pub regions: Vec<ReplicationRegion>,
    /// CID version
    pub cid_version: CidVersion,
}

impl UploadOptions {
    /// Options with no explicit replication policy and CIDv1
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            regions: Vec::new(),
            cid_version: CidVersion::V1,
        }
    }

    /// Set the replication policy
    pub fn with_regions(mut self, regions: Vec<ReplicationRegion>) -> Self {
        self.regions = regions;
        self
    }
}

/// Trait for content-addressed storage backends
///
/// Implementations execute single API calls and return errors classified
/// through [`Error::disposition`]. Retry policy and cleanup semantics are
/// owned by [`crate::ContentPublisher`].
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Verify the configured credentials
    ///
    /// Bad credentials must map to [`Error::Authentication`].
    async fn authenticate(&self) -> Result<()>;

    /// List pins matching `filter`
    async fn list_pins(&self, filter: &PinFilter) -> Result<Vec<Pin>>;

    /// Upload the artifact tree at `path` and pin it
    ///
    /// Not idempotent: every successful call may create a new pin.
    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<ContentId>;

    /// Remove the pin for `cid`
    async fn unpin(&self, cid: &ContentId) -> Result<()>;

    /// Get the service name (for logging/debugging)
    fn service_name(&self) -> &'static str;
}

/// Helper trait for constructing pinning services from configuration
pub trait PinningServiceFactory: Send + Sync {
    /// Create a PinningService instance from configuration
    fn create(
        &self,
        config: &crate::config::PinningConfig,
    ) -> Result<Box<dyn PinningService>>;
}
