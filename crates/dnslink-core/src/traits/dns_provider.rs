// # DNS Provider Trait
//
// Defines the interface for reading and mutating records in a DNS zone.
//
// ## Implementations
//
// - Netlify: `dnslink-provider-netlify` crate
//
// ## Usage
//
// ```rust,ignore
// use dnslink_core::traits::{DnsProvider, NewDnsRecord};
//
// let provider = /* DnsProvider implementation */;
// let records = provider.list_records("zone-id").await?;
// provider
//     .create_record("zone-id", &NewDnsRecord::txt("_dnslink.example.com", "dnslink=/ipfs/bafy...", 300))
//     .await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cid::DNSLINK_PREFIX;
use crate::error::Result;

/// Record type handled by the reconciler
pub const TXT_RECORD_TYPE: &str = "TXT";

/// A record as reported by the zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record id
    pub id: String,
    /// Record type ("TXT", "A", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified hostname
    pub hostname: String,
    /// Record value
    pub value: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl DnsRecord {
    /// Whether this is a TXT record
    pub fn is_txt(&self) -> bool {
        self.record_type.eq_ignore_ascii_case(TXT_RECORD_TYPE)
    }

    /// Whether this record lives at `hostname`
    ///
    /// Comparison ignores ASCII case and a trailing root dot.
    pub fn matches_hostname(&self, hostname: &str) -> bool {
        normalize_hostname(&self.hostname) == normalize_hostname(hostname)
    }

    /// Whether the value is a dnslink pointer
    pub fn is_dnslink(&self) -> bool {
        self.value.starts_with(DNSLINK_PREFIX)
    }
}

/// A record to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDnsRecord {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified hostname
    pub hostname: String,
    /// Record value
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl NewDnsRecord {
    /// A TXT record
    pub fn txt(hostname: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: TXT_RECORD_TYPE.to_string(),
            hostname: hostname.into(),
            value: value.into(),
            ttl,
        }
    }
}

fn normalize_hostname(hostname: &str) -> String {
    hostname.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Trait for DNS provider implementations
///
/// Providers are single-shot: one API call per method, no retries, no
/// caching. Ordering and idempotence decisions are owned by
/// [`crate::DnsReconciler`].
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record in `zone_id`
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record in `zone_id`, returning it as stored
    async fn create_record(&self, zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord>;

    /// Delete record `record_id` from `zone_id`
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::DnsProviderConfig,
    ) -> Result<Box<dyn DnsProvider>>;
}
