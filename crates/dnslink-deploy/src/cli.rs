//! Command-line surface
//!
//! Every option can also come from the environment, using the variable
//! names CI pipelines already export for Pinata and Netlify.

use clap::{Args, Parser, Subcommand};
use dnslink_core::config::{DEFAULT_DNSLINK_TTL, DEFAULT_GATEWAY_URL};
use std::path::PathBuf;

/// Publish a site to IPFS and point its dnslink record at it
#[derive(Parser, Debug)]
#[command(name = "dnslink-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DNSLINK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log intended DNS changes instead of applying them
    ///
    /// The environment form accepts `1`/`0`, `yes`/`no`, `on`/`off` and
    /// `true`/`false`.
    #[arg(
        long,
        global = true,
        env = "DNSLINK_DRY_RUN",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish the build, wait for the gateway, then update dnslink
    Deploy {
        #[command(flatten)]
        pinata: PinataArgs,

        #[command(flatten)]
        netlify: NetlifyArgs,

        #[command(flatten)]
        verify: VerifyArgs,

        /// File to append `hash=<cid>` to (GitHub Actions step output)
        #[arg(long, env = "GITHUB_OUTPUT")]
        github_output: Option<PathBuf>,
    },

    /// Publish the build and print its CID
    Publish {
        #[command(flatten)]
        pinata: PinataArgs,

        /// File to append `hash=<cid>` to (GitHub Actions step output)
        #[arg(long, env = "GITHUB_OUTPUT")]
        github_output: Option<PathBuf>,
    },

    /// Point dnslink at an already published CID
    UpdateDns {
        /// CID to point at
        #[arg(long, env = "IPFS_HASH")]
        cid: String,

        #[command(flatten)]
        netlify: NetlifyArgs,

        #[command(flatten)]
        verify: VerifyArgs,

        /// Update DNS without checking the gateway first
        #[arg(long)]
        skip_verify: bool,
    },

    /// Wait until a CID is served by the gateway
    Verify {
        /// CID to check
        #[arg(long, env = "IPFS_HASH")]
        cid: String,

        #[command(flatten)]
        verify: VerifyArgs,
    },
}

/// Pinata credentials and upload settings
#[derive(Args, Debug, Clone)]
pub struct PinataArgs {
    /// Pinata API key
    #[arg(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pub pinata_api_key: String,

    /// Pinata API secret
    #[arg(long, env = "PINATA_API_SECRET", hide_env_values = true)]
    pub pinata_api_secret: String,

    /// Name the pins are grouped under; previous pins with it are removed
    #[arg(long, env = "PINATA_PIN_ALIAS")]
    pub pin_alias: String,

    /// Replication policy as `REGION:COUNT` pairs
    #[arg(long, env = "PINATA_REGIONS", default_value = "FRA1:2,NYC1:2")]
    pub regions: String,

    /// Directory (or file) to publish
    #[arg(long, env = "BUILD_PATH")]
    pub build_path: PathBuf,
}

/// Netlify DNS settings
#[derive(Args, Debug, Clone)]
pub struct NetlifyArgs {
    /// Netlify personal access token
    #[arg(long, env = "NETLIFY_API_KEY", hide_env_values = true)]
    pub netlify_api_key: String,

    /// Netlify DNS zone id
    #[arg(long, env = "NETLIFY_DNS_ZONE_ID")]
    pub zone_id: String,

    /// Hostname of the dnslink TXT record (e.g. `_dnslink.app.example.com`)
    #[arg(long, env = "NETLIFY_DNS_LINK")]
    pub dnslink_host: String,

    /// TTL for the created record, in seconds
    #[arg(long, env = "DNSLINK_TTL", default_value_t = DEFAULT_DNSLINK_TTL)]
    pub ttl: u32,
}

/// Gateway propagation check settings
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Gateway base URL
    #[arg(long, env = "DNSLINK_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Maximum gateway probes
    #[arg(long, env = "DNSLINK_VERIFY_ATTEMPTS", default_value_t = 30)]
    pub verify_attempts: u32,

    /// Seconds between gateway probes
    #[arg(long, env = "DNSLINK_VERIFY_INTERVAL_SECS", default_value_t = 5)]
    pub verify_interval_secs: u64,
}
