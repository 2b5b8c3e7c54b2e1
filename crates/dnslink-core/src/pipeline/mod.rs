//! Deployment pipeline
//!
//! The DeployPipeline is responsible for:
//! - Publishing the artifact tree (optional, needs a pinning service)
//! - Verifying the CID is served by the gateway
//! - Reconciling the dnslink record to the CID
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │ContentPublisher│────▶│PropagationVerifier │────▶│ DnsReconciler │
//! └────────────────┘     └────────────────────┘     └───────────────┘
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//! ┌────────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │ PinningService │     │      Gateway       │     │  DnsProvider  │
//! └────────────────┘     └────────────────────┘     └───────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Publish → CID (skipped by [`DeployPipeline::update_dns`])
//! 2. Verify the CID on the gateway (skippable via config)
//! 3. Reconcile DNS
//!
//! Any error aborts the remaining stages. Cleanup failures are collected
//! into the [`DeployReport`] instead.

use std::path::Path;
use tracing::{info, warn};

use crate::cid::ContentId;
use crate::config::DeployConfig;
use crate::error::{Error, Result};
use crate::publisher::{ContentPublisher, PublishOutcome};
use crate::reconciler::{DnsReconciler, ReconcileOutcome};
use crate::traits::{DnsProvider, Gateway, PinningService};
use crate::verifier::PropagationVerifier;

/// Summary of a pipeline run
#[derive(Debug)]
pub struct DeployReport {
    /// The CID DNS now points at
    pub cid: ContentId,

    /// Publish stage outcome (absent when re-pointing an existing CID)
    pub publish: Option<PublishOutcome>,

    /// Whether the gateway check ran (false when skipped by config)
    pub verified: bool,

    /// Reconcile stage outcome
    pub reconcile: ReconcileOutcome,
}

impl DeployReport {
    /// All best-effort failures from every stage
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self
            .publish
            .as_ref()
            .map(PublishOutcome::warnings)
            .unwrap_or_default();
        warnings.extend(self.reconcile.warnings());
        warnings
    }
}

/// Publish → verify → reconcile, strictly in order
pub struct DeployPipeline {
    /// Pinning service for the publish stage
    pinning: Option<Box<dyn PinningService>>,

    /// Gateway for propagation checks
    gateway: Box<dyn Gateway>,

    /// DNS provider for reconciliation
    dns: Box<dyn DnsProvider>,

    /// Run configuration
    config: DeployConfig,
}

impl DeployPipeline {
    /// Create a pipeline without a publish stage
    ///
    /// # Parameters
    ///
    /// - `gateway`: Gateway implementation
    /// - `dns`: DNS provider implementation
    /// - `config`: Deployment configuration (validated here)
    pub fn new(
        gateway: Box<dyn Gateway>,
        dns: Box<dyn DnsProvider>,
        config: DeployConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pinning: None,
            gateway,
            dns,
            config,
        })
    }

    /// Attach the pinning service used by [`Self::deploy`] and [`Self::publish`]
    pub fn with_pinning(mut self, pinning: Box<dyn PinningService>) -> Self {
        self.pinning = Some(pinning);
        self
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Full run: publish `local_path`, verify, reconcile
    pub async fn deploy(&self, local_path: &Path) -> Result<DeployReport> {
        info!("Starting deployment");

        let published = self.publish(local_path).await?;
        let cid = published.cid.clone();

        let verified = self.verify(&cid).await?;
        let reconcile = self.reconcile(&cid).await?;

        self.finish(DeployReport {
            cid,
            publish: Some(published),
            verified,
            reconcile,
        })
    }

    /// Re-point DNS at an existing CID: verify, reconcile
    pub async fn update_dns(&self, cid: &str) -> Result<DeployReport> {
        let cid = ContentId::new(cid)?;
        info!(cid = %cid, "Re-pointing dnslink");

        let verified = self.verify(&cid).await?;
        let reconcile = self.reconcile(&cid).await?;

        self.finish(DeployReport {
            cid,
            publish: None,
            verified,
            reconcile,
        })
    }

    /// Publish stage only
    pub async fn publish(&self, local_path: &Path) -> Result<PublishOutcome> {
        let pinning = self
            .pinning
            .as_deref()
            .ok_or_else(|| Error::config("No pinning service configured"))?;
        self.config.publish.validate()?;

        ContentPublisher::new(pinning, self.config.publish.read_policy())
            .publish(
                local_path,
                &self.config.publish.alias,
                &self.config.publish.regions,
            )
            .await
    }

    /// Verification stage only; returns whether a check actually ran
    pub async fn verify(&self, cid: &ContentId) -> Result<bool> {
        if self.config.verify.skip {
            warn!(cid = %cid, "Skipping gateway propagation check");
            return Ok(false);
        }

        PropagationVerifier::new(self.gateway.as_ref())
            .verify(cid, &self.config.verify.policy())
            .await?;
        Ok(true)
    }

    /// Reconcile stage only
    pub async fn reconcile(&self, cid: &ContentId) -> Result<ReconcileOutcome> {
        let dns = &self.config.dns;
        DnsReconciler::new(self.dns.as_ref())
            .with_ttl(dns.ttl)
            .with_dry_run(self.config.dry_run)
            .reconcile(&dns.zone_id, &dns.hostname, cid)
            .await
    }

    fn finish(&self, report: DeployReport) -> Result<DeployReport> {
        for warning in report.warnings() {
            warn!("{}", warning);
        }
        info!(
            cid = %report.cid,
            state = %report.reconcile.state,
            warnings = report.warnings().len(),
            "Deployment finished"
        );
        Ok(report)
    }
}
