// # Netlify DNS Provider
//
// This crate provides a Netlify DNS provider implementation for the dnslink
// deployment pipeline.
//
// ## Scope
//
// - One HTTP request per trait call
// - Full error propagation (the reconciler owns ordering, the retry
//   primitive owns retries)
// - HTTP timeout configured (30 seconds)
// - Status codes mapped onto the core error taxonomy (401/403, 408, 429, 5xx)
// - NO retry logic, NO caching, NO background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if the token is empty
//
// ## API Reference
//
// - Netlify API v1: https://open-api.netlify.com/
// - List records:  GET    `/dns_zones/:zone_id/dns_records`
// - Create record: POST   `/dns_zones/:zone_id/dns_records`
// - Delete record: DELETE `/dns_zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnslink_core::ProviderRegistry;
use dnslink_core::config::DnsProviderConfig;
use dnslink_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, NewDnsRecord};
use dnslink_core::{Error, Result};
use std::time::Duration;

/// Netlify API base URL
pub const NETLIFY_API_BASE: &str = "https://api.netlify.com/api/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "netlify";

/// Netlify DNS provider
///
/// Stateless and single-shot. Which records to create or delete, and in
/// what order, is decided by `DnsReconciler`.
pub struct NetlifyProvider {
    /// Netlify personal access token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests and proxies)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for NetlifyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetlifyProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NetlifyProvider {
    /// Create a new Netlify provider against the public API
    ///
    /// # Errors
    ///
    /// - [`Error::Config`]: the token is empty
    /// - [`Error::Http`]: the HTTP client could not be built
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, NETLIFY_API_BASE)
    }

    /// Create a provider against a custom API base URL
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Netlify API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/dns_zones/{}/dns_records", self.base_url, zone_id)
    }

    fn record_url(&self, zone_id: &str, record_id: &str) -> String {
        format!("{}/{}", self.records_url(zone_id), record_id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("Netlify request failed: {}", e)))?;

        check_status(response).await
    }
}

/// Map a non-success response onto the error taxonomy, keeping the body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    Err(status_error(status.as_u16(), body))
}

fn status_error(status: u16, body: String) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "Netlify rejected the API token or it lacks DNS permissions. Status: {}, body: {}",
            status, body
        )),
        // 408/429/5xx stay `Api` so `Error::disposition` marks them retryable
        _ => Error::api(PROVIDER_NAME, status, body),
    }
}

#[async_trait]
impl DnsProvider for NetlifyProvider {
    /// ```http
    /// GET /dns_zones/:zone_id/dns_records
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!(zone_id, "Listing Netlify DNS records");

        let response = self.send(self.client.get(self.records_url(zone_id))).await?;
        let records: Vec<DnsRecord> = response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse record list: {}", e))
        })?;

        tracing::debug!(zone_id, count = records.len(), "Fetched DNS records");
        Ok(records)
    }

    /// ```http
    /// POST /dns_zones/:zone_id/dns_records
    /// {"type": "TXT", "hostname": "...", "value": "dnslink=/ipfs/...", "ttl": 300}
    /// ```
    async fn create_record(&self, zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord> {
        tracing::debug!(
            zone_id,
            hostname = %record.hostname,
            value = %record.value,
            "Creating Netlify DNS record"
        );

        let response = self
            .send(self.client.post(self.records_url(zone_id)).json(record))
            .await?;

        response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse created record: {}", e))
        })
    }

    /// ```http
    /// DELETE /dns_zones/:zone_id/dns_records/:record_id
    /// ```
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        tracing::debug!(zone_id, record_id, "Deleting Netlify DNS record");

        self.send(self.client.delete(self.record_url(zone_id, record_id)))
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Netlify providers
pub struct NetlifyFactory;

impl DnsProviderFactory for NetlifyFactory {
    fn create(&self, config: &DnsProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            DnsProviderConfig::Netlify { api_token } => {
                if api_token.is_empty() {
                    return Err(Error::config("Netlify API token is required"));
                }
                Ok(Box::new(NetlifyProvider::new(api_token.clone())?))
            }
            _ => Err(Error::config("Invalid config for Netlify provider")),
        }
    }
}

/// Register the Netlify provider with a registry
///
/// # Example
///
/// ```rust
/// use dnslink_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnslink_provider_netlify::register(&registry);
/// assert!(registry.has_dns_provider("netlify"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_dns_provider(PROVIDER_NAME, Box::new(NetlifyFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let config = DnsProviderConfig::Netlify {
            api_token: "test_token".to_string(),
        };

        let provider = NetlifyFactory.create(&config).unwrap();
        assert_eq!(provider.provider_name(), "netlify");
    }

    #[test]
    fn test_factory_missing_token() {
        let config = DnsProviderConfig::Netlify {
            api_token: String::new(),
        };

        assert!(matches!(NetlifyFactory.create(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let config = DnsProviderConfig::Custom {
            factory: "route53".to_string(),
            config: serde_json::Value::Null,
        };

        assert!(NetlifyFactory.create(&config).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(NetlifyProvider::new(""), Err(Error::Config(_))));
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = NetlifyProvider::new("nfp_secret_token_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("nfp_secret_token_12345"));
        assert!(debug_str.contains("NetlifyProvider"));
    }

    #[test]
    fn test_urls() {
        let provider = NetlifyProvider::with_base_url("token", "https://netlify.test/api/v1/").unwrap();

        assert_eq!(
            provider.records_url("zone"),
            "https://netlify.test/api/v1/dns_zones/zone/dns_records"
        );
        assert_eq!(
            provider.record_url("zone", "rec-1"),
            "https://netlify.test/api/v1/dns_zones/zone/dns_records/rec-1"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(401, String::new()), Error::Authentication(_)));
        assert!(matches!(status_error(403, String::new()), Error::Authentication(_)));

        match status_error(401, "{\"code\":401,\"message\":\"Access Denied\"}".to_string()) {
            Error::Authentication(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Access Denied"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = status_error(422, "{\"message\":\"bad value\"}".to_string());
        assert!(!err.is_retryable());
        match err {
            Error::Api { provider, status, body } => {
                assert_eq!(provider, "netlify");
                assert_eq!(status, 422);
                assert!(body.contains("bad value"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(status_error(429, String::new()).is_retryable());
        assert!(status_error(502, String::new()).is_retryable());
    }

    #[test]
    fn test_record_wire_format() {
        let json = r#"[{
            "id": "5f1e",
            "hostname": "_dnslink.app.example.com",
            "type": "TXT",
            "value": "dnslink=/ipfs/bafyX",
            "ttl": 300,
            "priority": null,
            "managed": false
        }]"#;

        let records: Vec<DnsRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_txt());
        assert!(records[0].is_dnslink());
        assert_eq!(records[0].ttl, Some(300));

        let body = serde_json::to_value(NewDnsRecord::txt(
            "_dnslink.app.example.com",
            "dnslink=/ipfs/bafyY",
            300,
        ))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "type": "TXT",
                "hostname": "_dnslink.app.example.com",
                "value": "dnslink=/ipfs/bafyY",
                "ttl": 300,
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let provider = NetlifyProvider::with_base_url("token", "http://127.0.0.1:1").unwrap();

        let err = provider.list_records("zone").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.is_retryable());
    }
}
