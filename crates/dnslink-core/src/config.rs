//! Configuration types for the dnslink pipeline
//!
//! A [`DeployConfig`] is assembled once at process start and passed by
//! reference into each stage. Nothing in the core reads the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::traits::ReplicationRegion;

/// Default TTL for created dnslink records, in seconds
pub const DEFAULT_DNSLINK_TTL: u32 = 300;

/// Default public gateway used for propagation checks
pub const DEFAULT_GATEWAY_URL: &str = "https://cloudflare-ipfs.com";

/// Main deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Pinning service (required only when publishing)
    #[serde(default)]
    pub pinning: Option<PinningConfig>,

    /// Publish settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Gateway used for propagation checks
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Propagation verification settings
    #[serde(default)]
    pub verify: VerifyConfig,

    /// DNS zone and provider
    pub dns: DnsConfig,

    /// Log intended DNS mutations instead of performing them
    #[serde(default)]
    pub dry_run: bool,
}

impl DeployConfig {
    /// Create a configuration for re-pointing DNS only (no pinning service)
    pub fn new(dns: DnsConfig) -> Self {
        Self {
            pinning: None,
            publish: PublishConfig::default(),
            gateway: GatewayConfig::default(),
            verify: VerifyConfig::default(),
            dns,
            dry_run: false,
        }
    }

    /// Attach a pinning service configuration
    pub fn with_pinning(mut self, pinning: PinningConfig, publish: PublishConfig) -> Self {
        self.pinning = Some(pinning);
        self.publish = publish;
        self
    }

    /// Validate everything needed to verify and reconcile
    pub fn validate(&self) -> Result<()> {
        self.dns.validate()?;
        self.gateway.validate()?;
        self.verify.validate()?;
        if let Some(pinning) = &self.pinning {
            pinning.validate()?;
            self.publish.validate()?;
        }
        Ok(())
    }

    /// Validate everything needed for a full publish run
    pub fn validate_for_publish(&self) -> Result<()> {
        if self.pinning.is_none() {
            return Err(Error::config("No pinning service configured"));
        }
        self.validate()
    }
}

/// Pinning service configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PinningConfig {
    /// Pinata pinning service
    Pinata {
        /// API key
        api_key: String,
        /// API secret
        api_secret: String,
    },

    /// Custom pinning service
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl PinningConfig {
    /// Validate the pinning configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            PinningConfig::Pinata {
                api_key,
                api_secret,
            } => {
                if api_key.is_empty() {
                    return Err(Error::config("PINATA_API_KEY is required"));
                }
                if api_secret.is_empty() {
                    return Err(Error::config("PINATA_API_SECRET is required"));
                }
                Ok(())
            }
            PinningConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom pinning factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the service type name
    pub fn type_name(&self) -> &str {
        match self {
            PinningConfig::Pinata { .. } => "pinata",
            PinningConfig::Custom { factory, .. } => factory,
        }
    }
}

// Credentials stay out of Debug output
impl std::fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinningConfig::Pinata { .. } => f
                .debug_struct("Pinata")
                .field("api_key", &"<REDACTED>")
                .field("api_secret", &"<REDACTED>")
                .finish(),
            PinningConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

/// Publish settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Alias the site is pinned under
    #[serde(default)]
    pub alias: String,

    /// Replication policy
    #[serde(default = "default_regions")]
    pub regions: Vec<ReplicationRegion>,

    /// Attempts for pin listing
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,

    /// Delay between pin listing attempts (in seconds)
    #[serde(default = "default_read_interval_secs")]
    pub read_interval_secs: u64,
}

impl PublishConfig {
    /// Publish settings for `alias` with the default replication policy
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Self::default()
        }
    }

    /// Validate the publish settings
    pub fn validate(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(Error::config("PINATA_PIN_ALIAS is required"));
        }
        if self.read_attempts == 0 {
            return Err(Error::config("Pin listing attempts must be > 0"));
        }
        Ok(())
    }

    /// Retry policy for pin listing
    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.read_attempts,
            Duration::from_secs(self.read_interval_secs),
        )
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            alias: String::new(),
            regions: default_regions(),
            read_attempts: default_read_attempts(),
            read_interval_secs: default_read_interval_secs(),
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayConfig {
    /// Plain HTTP path gateway (`<base>/ipfs/<cid>`)
    Http {
        /// Gateway base URL
        base_url: String,
    },

    /// Custom gateway
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl GatewayConfig {
    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            GatewayConfig::Http { base_url } => {
                if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
                    return Err(Error::config(format!(
                        "Gateway URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                Ok(())
            }
            GatewayConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom gateway factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the gateway type name
    pub fn type_name(&self) -> &str {
        match self {
            GatewayConfig::Http { .. } => "http",
            GatewayConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig::Http {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

/// Propagation verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Maximum gateway probes
    #[serde(default = "default_verify_attempts")]
    pub max_attempts: u32,

    /// Delay between probes (in seconds)
    #[serde(default = "default_verify_interval_secs")]
    pub interval_secs: u64,

    /// Skip verification entirely (re-pointing to a CID known to be live)
    #[serde(default)]
    pub skip: bool,
}

impl VerifyConfig {
    /// Validate the verification settings
    pub fn validate(&self) -> Result<()> {
        if !self.skip && self.max_attempts == 0 {
            return Err(Error::config("Verification attempts must be > 0"));
        }
        Ok(())
    }

    /// Retry policy for gateway probes
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.interval_secs))
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_verify_attempts(),
            interval_secs: default_verify_interval_secs(),
            skip: false,
        }
    }
}

/// DNS zone and provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Provider
    pub provider: DnsProviderConfig,

    /// Zone holding the dnslink record
    pub zone_id: String,

    /// Hostname of the dnslink TXT record (e.g. `_dnslink.app.example.com`)
    pub hostname: String,

    /// TTL for created records
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl DnsConfig {
    /// DNS settings with the default TTL
    pub fn new(
        provider: DnsProviderConfig,
        zone_id: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            zone_id: zone_id.into(),
            hostname: hostname.into(),
            ttl: DEFAULT_DNSLINK_TTL,
        }
    }

    /// Validate the DNS settings
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        if self.zone_id.trim().is_empty() {
            return Err(Error::config("NETLIFY_DNS_ZONE_ID is required"));
        }
        validate_hostname(&self.hostname)?;
        if self.ttl == 0 {
            return Err(Error::config("DNS record TTL must be > 0"));
        }
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DnsProviderConfig {
    /// Netlify DNS
    Netlify {
        /// Personal access token
        api_token: String,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl DnsProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            DnsProviderConfig::Netlify { api_token } => {
                if api_token.is_empty() {
                    return Err(Error::config("NETLIFY_API_KEY is required"));
                }
                Ok(())
            }
            DnsProviderConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom provider factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            DnsProviderConfig::Netlify { .. } => "netlify",
            DnsProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl std::fmt::Debug for DnsProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsProviderConfig::Netlify { .. } => f
                .debug_struct("Netlify")
                .field("api_token", &"<REDACTED>")
                .finish(),
            DnsProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

/// Validate that a string is a usable DNS hostname
///
/// Basic RFC 1035 checks. Underscore is accepted because dnslink records
/// conventionally live under a `_dnslink` label.
pub fn validate_hostname(hostname: &str) -> Result<()> {
    let hostname = hostname.trim_end_matches('.');
    if hostname.is_empty() {
        return Err(Error::config("NETLIFY_DNS_LINK is required"));
    }

    if hostname.len() > 253 {
        return Err(Error::config(format!(
            "Hostname too long: {} chars (max 253). Got: {}",
            hostname.len(),
            hostname
        )));
    }

    for label in hostname.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!(
                "Hostname has empty label: '{}'",
                hostname
            )));
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "Hostname label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config(format!(
                "Hostname label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "Hostname label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_regions() -> Vec<ReplicationRegion> {
    vec![
        ReplicationRegion::new("FRA1", 2),
        ReplicationRegion::new("NYC1", 2),
    ]
}

fn default_read_attempts() -> u32 {
    3
}

fn default_read_interval_secs() -> u64 {
    2
}

fn default_verify_attempts() -> u32 {
    30
}

fn default_verify_interval_secs() -> u64 {
    5
}

fn default_ttl() -> u32 {
    DEFAULT_DNSLINK_TTL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns() -> DnsConfig {
        DnsConfig::new(
            DnsProviderConfig::Netlify {
                api_token: "nfp_secret".to_string(),
            },
            "zone",
            "_dnslink.app.example.com",
        )
    }

    #[test]
    fn dns_only_config_is_valid() {
        let config = DeployConfig::new(dns());
        assert!(config.validate().is_ok());
        assert!(config.validate_for_publish().is_err());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut config = DeployConfig::new(dns());
        config.dns.provider = DnsProviderConfig::Netlify {
            api_token: String::new(),
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = DeployConfig::new(dns()).with_pinning(
            PinningConfig::Pinata {
                api_key: "key".to_string(),
                api_secret: String::new(),
            },
            PublishConfig::new("app"),
        );
        assert!(matches!(config.validate_for_publish(), Err(Error::Config(_))));
    }

    #[test]
    fn publish_requires_alias() {
        let config = DeployConfig::new(dns()).with_pinning(
            PinningConfig::Pinata {
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            },
            PublishConfig::new(""),
        );
        assert!(config.validate_for_publish().is_err());
    }

    #[test]
    fn hostname_validation() {
        assert!(validate_hostname("_dnslink.app.example.com").is_ok());
        assert!(validate_hostname("app.example.com.").is_ok());
        assert!(validate_hostname("").is_err());
        assert!(validate_hostname("bad..example.com").is_err());
        assert!(validate_hostname("-bad.example.com").is_err());
        assert!(validate_hostname("sp ace.example.com").is_err());
    }

    #[test]
    fn defaults_follow_deploy_scripts() {
        let publish = PublishConfig::default();
        assert_eq!(publish.regions.len(), 2);
        assert_eq!(publish.regions[0], ReplicationRegion::new("FRA1", 2));

        let verify = VerifyConfig::default();
        assert_eq!(verify.max_attempts, 30);
        assert_eq!(verify.policy().interval, Duration::from_secs(5));
        assert_eq!(dns().ttl, 300);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let pinning = PinningConfig::Pinata {
            api_key: "pk_live_123".to_string(),
            api_secret: "sk_live_456".to_string(),
        };
        let rendered = format!("{:?} {:?}", pinning, dns().provider);
        assert!(!rendered.contains("pk_live_123"));
        assert!(!rendered.contains("sk_live_456"));
        assert!(!rendered.contains("nfp_secret"));
    }
}
