//! Content identifiers and the dnslink encoding

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Prefix every dnslink TXT value starts with
pub const DNSLINK_PREFIX: &str = "dnslink=";

/// Opaque, content-derived identifier of a published artifact tree
///
/// Equality is exact string equality. The empty string is never a valid CID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Create a CID, rejecting empty or whitespace-only input
    pub fn new(cid: impl Into<String>) -> Result<Self> {
        let cid = cid.into();
        let trimmed = cid.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input("No CID provided"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the CID string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The gateway path for this CID (`/ipfs/<cid>`)
    pub fn ipfs_path(&self) -> String {
        format!("/ipfs/{}", self.0)
    }

    /// The TXT record value pointing at this CID (`dnslink=/ipfs/<cid>`)
    pub fn dnslink_value(&self) -> String {
        format!("{}{}", DNSLINK_PREFIX, self.ipfs_path())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(cid: ContentId) -> Self {
        cid.0
    }
}

impl std::str::FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
