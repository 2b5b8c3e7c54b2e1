// # HTTP Gateway
//
// This crate provides a path-style IPFS gateway probe for the dnslink
// deployment pipeline.
//
// ## Purpose
//
// Confirms that a freshly pinned CID is actually served to the public before
// DNS is pointed at it. One probe is one `GET <base>/ipfs/<cid>`; polling is
// owned by `PropagationVerifier`.
//
// Any 2xx counts as retrievable. The body is never read: a gateway that
// answers 200 has fetched the root block, which is all we need to know.

use dnslink_core::ProviderRegistry;
use dnslink_core::config::GatewayConfig;
use dnslink_core::traits::{Gateway, GatewayFactory};
use dnslink_core::{ContentId, Error, Result};

use std::time::Duration;

/// Per-probe timeout; gateways can stall while fetching from the network
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Path-style HTTP gateway
#[derive(Debug)]
pub struct HttpGateway {
    /// Base URL without trailing slash
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway probe for `base_url` (e.g. "https://cloudflare-ipfs.com")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// URL probed for `cid`
    pub fn content_url(&self, cid: &ContentId) -> String {
        format!("{}{}", self.base_url, cid.ipfs_path())
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn probe(&self, cid: &ContentId) -> Result<()> {
        let url = self.content_url(cid);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        tracing::debug!(url = %url, status = %response.status(), "Gateway served content");
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Factory for creating HTTP gateways
pub struct HttpGatewayFactory;

impl GatewayFactory for HttpGatewayFactory {
    fn create(&self, config: &GatewayConfig) -> Result<Box<dyn Gateway>> {
        match config {
            GatewayConfig::Http { base_url } => {
                config.validate()?;
                Ok(Box::new(HttpGateway::new(base_url.clone())))
            }
            _ => Err(Error::config("Invalid config for HTTP gateway")),
        }
    }
}

/// Register the HTTP gateway with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_gateway("http", Box::new(HttpGatewayFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let gateway = HttpGatewayFactory.create(&GatewayConfig::default()).unwrap();
        assert_eq!(gateway.base_url(), "https://cloudflare-ipfs.com");
    }

    #[test]
    fn test_factory_rejects_bad_scheme() {
        let config = GatewayConfig::Http {
            base_url: "ftp://gateway.example".to_string(),
        };
        assert!(matches!(HttpGatewayFactory.create(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_content_url_trims_trailing_slash() {
        let gateway = HttpGateway::new("https://ipfs.example/");
        let cid = ContentId::new("bafyX").unwrap();
        assert_eq!(gateway.content_url(&cid), "https://ipfs.example/ipfs/bafyX");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_retryable() {
        let gateway = HttpGateway::new("http://127.0.0.1:1");
        let cid = ContentId::new("bafyX").unwrap();

        let err = gateway.probe(&cid).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(err.is_retryable());
    }
}
