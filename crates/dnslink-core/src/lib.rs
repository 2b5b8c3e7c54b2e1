// # dnslink-core
//
// Core library for the dnslink deployment pipeline.
//
// ## Architecture Overview
//
// A deployment converges external state in three ordered stages:
// - **ContentPublisher**: uploads a site bundle to a pinning service and
//   garbage-collects stale pins under the same alias
// - **PropagationVerifier**: polls a public gateway until the new CID is served
// - **DnsReconciler**: converges a DNS zone to exactly one dnslink TXT record
//
// All three stages reach their backends through traits:
// - **PinningService**: content-addressed storage with pins
// - **Gateway**: public HTTP read path for content
// - **DnsProvider**: DNS zone record API
//
// Stages share one retry primitive ([`retry::retry`]), and [`DeployPipeline`]
// runs them strictly in order.
//
// ## Design Principles
//
// 1. **Stateless runs**: every run rebuilds its view from the backends
// 2. **Create before delete**: the zone never holds zero dnslink records
// 3. **Best-effort cleanup**: stale pins and records are reported, not fatal
// 4. **Library-First**: the binary is a thin wiring layer over this crate

pub mod cid;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod publisher;
pub mod reconciler;
pub mod registry;
pub mod retry;
pub mod traits;
pub mod verifier;

// Re-export core types for convenience
pub use cid::ContentId;
pub use config::{DeployConfig, DnsConfig, DnsProviderConfig, GatewayConfig, PinningConfig};
pub use error::{CleanupReport, Disposition, Error, Result};
pub use pipeline::{DeployPipeline, DeployReport};
pub use publisher::{ContentPublisher, PublishOutcome};
pub use reconciler::{DnsReconciler, ReconcileOutcome, ReconcileState};
pub use registry::ProviderRegistry;
pub use retry::RetryPolicy;
pub use traits::{DnsProvider, Gateway, PinningService};
pub use verifier::PropagationVerifier;
