// # Gateway Trait
//
// Defines the public read path used to confirm that published content is
// actually being served.
//
// ## Implementations
//
// - Plain HTTP gateway: `dnslink-gateway-http` crate

use async_trait::async_trait;

use crate::cid::ContentId;
use crate::error::Result;

/// Trait for content gateways
///
/// A probe is a single request. Any non-success status or transport failure
/// must be reported as a retryable error; the response body is never
/// inspected. Polling is owned by [`crate::PropagationVerifier`].
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Issue one read of `<base>/ipfs/<cid>`
    async fn probe(&self, cid: &ContentId) -> Result<()>;

    /// Base URL of the gateway (for logging and errors)
    fn base_url(&self) -> &str;
}

/// Helper trait for constructing gateways from configuration
pub trait GatewayFactory: Send + Sync {
    /// Create a Gateway instance from configuration
    fn create(&self, config: &crate::config::GatewayConfig) -> Result<Box<dyn Gateway>>;
}
