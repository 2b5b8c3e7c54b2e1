//! Core traits for the dnslink pipeline
//!
//! This module defines the abstract interfaces every backend must follow.
//!
//! - [`PinningService`]: content-addressed storage with named pins
//! - [`Gateway`]: public HTTP read path used to verify propagation
//! - [`DnsProvider`]: DNS zone record API

pub mod dns_provider;
pub mod gateway;
pub mod pinning;

pub use dns_provider::{DnsProvider, DnsProviderFactory, DnsRecord, NewDnsRecord};
pub use gateway::{Gateway, GatewayFactory};
pub use pinning::{
    CidVersion, Pin, PinFilter, PinStatus, PinningService, PinningServiceFactory,
    ReplicationRegion, UploadOptions,
};
