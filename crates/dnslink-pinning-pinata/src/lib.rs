// # Pinata Pinning Service
//
// This crate provides a Pinata implementation of `PinningService` for the
// dnslink deployment pipeline.
//
// ## Scope
//
// - One HTTP request per trait call, except pin listing, which follows
//   `pageOffset` until a short page comes back
// - Artifact trees uploaded as a single multipart request, so the service
//   returns one directory CID
// - Status codes mapped onto the core error taxonomy
// - NO retry logic (owned by the retry primitive), NO caching
//
// ## Security Requirements
//
// - API key and secret NEVER appear in logs or Debug output
//
// ## API Reference
//
// - Pinata API: https://docs.pinata.cloud/
// - Test credentials: GET    `/data/testAuthentication`
// - List pins:        GET    `/data/pinList?status=pinned&metadata[name]=<alias>&pageLimit=1000&pageOffset=<n>`
// - Upload:           POST   `/pinning/pinFileToIPFS` (multipart)
// - Unpin:            DELETE `/pinning/unpin/:cid`

mod files;

use async_trait::async_trait;
use dnslink_core::config::PinningConfig;
use dnslink_core::traits::{
    Pin, PinFilter, PinningService, PinningServiceFactory, UploadOptions,
};
use dnslink_core::{ContentId, Error, ProviderRegistry, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

pub use files::{ArtifactFile, collect_artifact_files};

/// Pinata API base URL
pub const PINATA_API_BASE: &str = "https://api.pinata.cloud";

/// Timeout for metadata calls (auth, listing, unpin)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the upload request; site bundles can be large
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Pinata caps `pageLimit` at 1000
const PIN_LIST_PAGE_LIMIT: usize = 1000;

const SERVICE_NAME: &str = "pinata";

#[derive(Debug, Deserialize)]
struct PinListResponse {
    #[serde(default)]
    rows: Vec<PinRow>,
}

#[derive(Debug, Deserialize)]
struct PinRow {
    ipfs_pin_hash: String,
    #[serde(default)]
    metadata: Option<PinRowMetadata>,
}

#[derive(Debug, Deserialize)]
struct PinRowMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata pinning service client
pub struct PinataService {
    /// ⚠️ NEVER log this value
    api_key: String,

    /// ⚠️ NEVER log this value
    api_secret: String,

    /// API base URL (overridable for tests and proxies)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for PinataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataService")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PinataService {
    /// Create a client against the public Pinata API
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, api_secret, PINATA_API_BASE)
    }

    /// Create a client against a custom API base URL
    pub fn with_base_url(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(Error::config("Pinata API key and secret cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_secret,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.api_secret)
            .send()
            .await
            .map_err(|e| Error::http(format!("Pinata request failed: {}", e)))?;

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

    async fn fetch_pin_page(&self, filter: &PinFilter, offset: usize) -> Result<Vec<PinRow>> {
        let limit = PIN_LIST_PAGE_LIMIT.to_string();
        let offset = offset.to_string();
        let request = self.client.get(self.url("/data/pinList")).query(&[
            ("status", filter.status.as_str()),
            ("metadata[name]", filter.alias.as_str()),
            ("pageLimit", limit.as_str()),
            ("pageOffset", offset.as_str()),
        ]);

        let response: PinListResponse = self.send(request).await?.json().await.map_err(|e| {
            Error::provider(SERVICE_NAME, format!("Failed to parse pin list: {}", e))
        })?;
        Ok(response.rows)
    }

    /// Build the multipart form for an artifact tree
    async fn build_form(&self, path: &Path, options: &UploadOptions) -> Result<(Form, usize)> {
        let root = path.to_path_buf();
        let files = tokio::task::spawn_blocking(move || collect_artifact_files(&root))
            .await
            .map_err(|e| Error::Other(format!("Artifact scan task failed: {}", e)))??;

        if files.is_empty() {
            return Err(Error::invalid_input(format!(
                "Artifact tree is empty: {}",
                path.display()
            )));
        }

        let count = files.len();
        let mut form = Form::new();
        for file in files {
            let handle = tokio::fs::File::open(&file.path).await?;
            let length = handle.metadata().await?.len();
            let part = Part::stream_with_length(reqwest::Body::from(handle), length)
                .file_name(file.part_name);
            form = form.part("file", part);
        }

        let form = form
            .text("pinataMetadata", pin_metadata(&options.alias).to_string())
            .text("pinataOptions", pin_options(options).to_string());

        Ok((form, count))
    }
}

fn status_error(status: u16, body: String) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "Pinata rejected the API key or secret. Status: {}, body: {}",
            status, body
        )),
        _ => Error::api(SERVICE_NAME, status, body),
    }
}

/// Offset of the page after one that returned `rows` rows, if any
fn next_page_offset(offset: usize, rows: usize) -> Option<usize> {
    (rows >= PIN_LIST_PAGE_LIMIT).then_some(offset + rows)
}

/// `pinataMetadata` form field
fn pin_metadata(alias: &str) -> serde_json::Value {
    json!({ "name": alias })
}

/// `pinataOptions` form field
///
/// `customPinPolicy` is omitted when no regions are given, leaving the
/// account default in place.
fn pin_options(options: &UploadOptions) -> serde_json::Value {
    let mut value = json!({ "cidVersion": options.cid_version.as_u8() });
    if !options.regions.is_empty() {
        let regions: Vec<_> = options
            .regions
            .iter()
            .map(|r| json!({ "id": r.id, "desiredReplicationCount": r.replicas }))
            .collect();
        value["customPinPolicy"] = json!({ "regions": regions });
    }
    value
}

#[async_trait]
impl PinningService for PinataService {
    async fn authenticate(&self) -> Result<()> {
        self.send(self.client.get(self.url("/data/testAuthentication")))
            .await?;
        Ok(())
    }

    async fn list_pins(&self, filter: &PinFilter) -> Result<Vec<Pin>> {
        let mut pins = Vec::new();
        let mut offset = Some(0);

        while let Some(page_offset) = offset {
            let rows = self.fetch_pin_page(filter, page_offset).await?;
            offset = next_page_offset(page_offset, rows.len());

            for row in rows {
                pins.push(Pin {
                    cid: ContentId::new(row.ipfs_pin_hash)?,
                    alias: row.metadata.and_then(|m| m.name),
                });
            }
        }

        Ok(pins)
    }

    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<ContentId> {
        let (form, count) = self.build_form(path, options).await?;
        tracing::debug!(files = count, alias = %options.alias, "Uploading artifact tree to Pinata");

        let request = self
            .client
            .post(self.url("/pinning/pinFileToIPFS"))
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form);

        let response: PinFileResponse = self.send(request).await?.json().await.map_err(|e| {
            Error::provider(SERVICE_NAME, format!("Failed to parse upload response: {}", e))
        })?;

        ContentId::new(response.ipfs_hash)
    }

    async fn unpin(&self, cid: &ContentId) -> Result<()> {
        let url = self.url(&format!("/pinning/unpin/{}", cid));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        SERVICE_NAME
    }
}

/// Factory for creating Pinata clients
pub struct PinataFactory;

impl PinningServiceFactory for PinataFactory {
    fn create(&self, config: &PinningConfig) -> Result<Box<dyn PinningService>> {
        match config {
            PinningConfig::Pinata {
                api_key,
                api_secret,
            } => Ok(Box::new(PinataService::new(api_key.clone(), api_secret.clone())?)),
            _ => Err(Error::config("Invalid config for Pinata service")),
        }
    }
}

/// Register the Pinata service with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_pinning_service(SERVICE_NAME, Box::new(PinataFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnslink_core::traits::ReplicationRegion;

    #[test]
    fn test_factory_creation() {
        let config = PinningConfig::Pinata {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        };

        let service = PinataFactory.create(&config).unwrap();
        assert_eq!(service.service_name(), "pinata");
    }

    #[test]
    fn test_factory_missing_secret() {
        let config = PinningConfig::Pinata {
            api_key: "key".to_string(),
            api_secret: String::new(),
        };

        assert!(matches!(PinataFactory.create(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_credentials_not_exposed_in_debug() {
        let service = PinataService::new("pk_live_abc", "sk_live_xyz").unwrap();

        let debug_str = format!("{:?}", service);
        assert!(!debug_str.contains("pk_live_abc"));
        assert!(!debug_str.contains("sk_live_xyz"));
    }

    #[test]
    fn test_pin_options_with_regions() {
        let options = UploadOptions::new("app").with_regions(vec![
            ReplicationRegion::new("FRA1", 2),
            ReplicationRegion::new("NYC1", 2),
        ]);

        assert_eq!(
            pin_options(&options),
            json!({
                "cidVersion": 1,
                "customPinPolicy": {
                    "regions": [
                        { "id": "FRA1", "desiredReplicationCount": 2 },
                        { "id": "NYC1", "desiredReplicationCount": 2 },
                    ]
                }
            })
        );
        assert_eq!(pin_metadata("app"), json!({ "name": "app" }));
    }

    #[test]
    fn test_pin_options_without_regions() {
        let options = UploadOptions::new("app");
        assert_eq!(pin_options(&options), json!({ "cidVersion": 1 }));
    }

    #[test]
    fn test_pin_list_wire_format() {
        let json = r#"{
            "count": 2,
            "rows": [
                { "ipfs_pin_hash": "bafyA", "metadata": { "name": "app", "keyvalues": null } },
                { "ipfs_pin_hash": "bafyB", "metadata": {} }
            ]
        }"#;

        let response: PinListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.rows[0].ipfs_pin_hash, "bafyA");
        assert_eq!(
            response.rows[0].metadata.as_ref().and_then(|m| m.name.as_deref()),
            Some("app")
        );

        let upload: PinFileResponse =
            serde_json::from_str(r#"{"IpfsHash":"bafyC","PinSize":123,"Timestamp":"2024-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(upload.ipfs_hash, "bafyC");
    }

    #[test]
    fn test_pagination_stops_on_short_page() {
        assert_eq!(next_page_offset(0, PIN_LIST_PAGE_LIMIT), Some(1000));
        assert_eq!(next_page_offset(1000, PIN_LIST_PAGE_LIMIT), Some(2000));
        assert_eq!(next_page_offset(2000, 17), None);
        assert_eq!(next_page_offset(0, 0), None);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(401, String::new()), Error::Authentication(_)));
        match status_error(403, "{\"error\":\"Invalid API key\"}".to_string()) {
            Error::Authentication(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(status_error(503, String::new()).is_retryable());
        assert!(!status_error(400, "bad".to_string()).is_retryable());
    }

    #[tokio::test]
    async fn test_empty_tree_rejected_before_request() {
        let dir = tempfile::tempdir().unwrap();
        // Unroutable base: reaching the network would surface as Http instead
        let service = PinataService::with_base_url("key", "secret", "http://127.0.0.1:1").unwrap();

        let err = service
            .upload(dir.path(), &UploadOptions::new("app"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_form_streams_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("build");
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("index.html"), "<html/>").unwrap();
        std::fs::write(root.join("assets/app.js"), "0").unwrap();
        let service = PinataService::new("key", "secret").unwrap();

        let (form, count) = service
            .build_form(&root, &UploadOptions::new("app"))
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert!(!form.boundary().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let service = PinataService::with_base_url("key", "secret", "http://127.0.0.1:1").unwrap();

        let err = service.authenticate().await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
