//! Propagation verifier
//!
//! Polls a public [`Gateway`] until a CID is served. Pointing DNS at a CID
//! the gateway cannot serve breaks the published site, so the pipeline
//! never reconciles DNS unless this stage succeeded.

use tracing::info;

use crate::cid::ContentId;
use crate::error::{Disposition, Error, Result};
use crate::retry::{RetryPolicy, retry};
use crate::traits::Gateway;

/// Waits for content to become retrievable through a gateway
pub struct PropagationVerifier<'a> {
    gateway: &'a dyn Gateway,
}

impl<'a> PropagationVerifier<'a> {
    /// Create a verifier for `gateway`
    pub fn new(gateway: &'a dyn Gateway) -> Self {
        Self { gateway }
    }

    /// Probe `<gateway>/ipfs/<cid>` until one request succeeds
    ///
    /// Every probe failure counts against `policy.max_attempts`, whatever the
    /// status or transport error. The response body is not inspected.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`]: `cid` is empty (no request is made)
    /// - [`Error::PropagationTimeout`]: budget exhausted without a success
    pub async fn wait_until_retrievable(&self, cid: &str, policy: &RetryPolicy) -> Result<()> {
        let cid = ContentId::new(cid)?;
        self.verify(&cid, policy).await
    }

    /// Same as [`Self::wait_until_retrievable`] for an already-validated CID
    pub async fn verify(&self, cid: &ContentId, policy: &RetryPolicy) -> Result<()> {
        let gateway = self.gateway.base_url();
        info!(
            cid = %cid,
            gateway,
            max_attempts = policy.max_attempts,
            "Waiting for CID to resolve on gateway"
        );

        let policy = policy.with_classifier(probe_disposition);
        let resource = format!("{}{}", gateway.trim_end_matches('/'), cid.ipfs_path());

        match retry(&policy, &resource, |_| self.gateway.probe(cid)).await {
            Ok(()) => {
                info!(cid = %cid, gateway, "CID is retrievable");
                Ok(())
            }
            Err(Error::RetryExhausted { attempts, .. }) => Err(Error::PropagationTimeout {
                cid: cid.to_string(),
                gateway: gateway.to_string(),
                attempts,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Any gateway response short of success is worth waiting on
fn probe_disposition(error: &Error) -> Disposition {
    match error {
        Error::InvalidInput(_) | Error::Config(_) => Disposition::Fatal,
        _ => Disposition::Retryable,
    }
}
