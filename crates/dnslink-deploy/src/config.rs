//! Turns parsed arguments into validated pipeline configuration
//!
//! Everything here runs before tracing is initialized, so failures are
//! reported by the caller on stderr with the configuration exit code.

use dnslink_core::config::{PublishConfig, VerifyConfig};
use dnslink_core::traits::ReplicationRegion;
use dnslink_core::{DeployConfig, DnsConfig, DnsProviderConfig, GatewayConfig, PinningConfig, Result};
use std::path::PathBuf;

use crate::cli::{Command, NetlifyArgs, PinataArgs, VerifyArgs};

/// What to run, with configuration already validated
#[derive(Debug)]
pub enum Invocation {
    Deploy {
        config: DeployConfig,
        build_path: PathBuf,
        github_output: Option<PathBuf>,
    },
    Publish {
        pinning: PinningConfig,
        publish: PublishConfig,
        build_path: PathBuf,
        github_output: Option<PathBuf>,
    },
    UpdateDns {
        config: DeployConfig,
        cid: String,
    },
    Verify {
        gateway: GatewayConfig,
        verify: VerifyConfig,
        cid: String,
    },
}

impl Invocation {
    /// Build and validate the invocation for `command`
    pub fn from_command(command: Command, dry_run: bool) -> Result<Self> {
        match command {
            Command::Deploy {
                pinata,
                netlify,
                verify,
                github_output,
            } => {
                let (pinning, publish) = pinning_config(&pinata)?;
                let config =
                    deploy_config(&netlify, &verify, dry_run).with_pinning(pinning, publish);
                config.validate_for_publish()?;

                Ok(Invocation::Deploy {
                    config,
                    build_path: pinata.build_path,
                    github_output,
                })
            }
            Command::Publish {
                pinata,
                github_output,
            } => {
                let (pinning, publish) = pinning_config(&pinata)?;
                pinning.validate()?;
                publish.validate()?;

                Ok(Invocation::Publish {
                    pinning,
                    publish,
                    build_path: pinata.build_path,
                    github_output,
                })
            }
            Command::UpdateDns {
                cid,
                netlify,
                verify,
                skip_verify,
            } => {
                let mut config = deploy_config(&netlify, &verify, dry_run);
                config.verify.skip = skip_verify;
                config.validate()?;

                Ok(Invocation::UpdateDns { config, cid })
            }
            Command::Verify { cid, verify } => {
                let (gateway, verify) = verify_config(&verify);
                gateway.validate()?;
                verify.validate()?;

                Ok(Invocation::Verify {
                    gateway,
                    verify,
                    cid,
                })
            }
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Invocation::Deploy { .. } => "deploy",
            Invocation::Publish { .. } => "publish",
            Invocation::UpdateDns { .. } => "update-dns",
            Invocation::Verify { .. } => "verify",
        }
    }
}

fn pinning_config(args: &PinataArgs) -> Result<(PinningConfig, PublishConfig)> {
    let pinning = PinningConfig::Pinata {
        api_key: args.pinata_api_key.clone(),
        api_secret: args.pinata_api_secret.clone(),
    };

    let mut publish = PublishConfig::new(args.pin_alias.clone());
    publish.regions = ReplicationRegion::parse_list(&args.regions)?;

    Ok((pinning, publish))
}

fn verify_config(args: &VerifyArgs) -> (GatewayConfig, VerifyConfig) {
    let gateway = GatewayConfig::Http {
        base_url: args.gateway_url.clone(),
    };
    let verify = VerifyConfig {
        max_attempts: args.verify_attempts,
        interval_secs: args.verify_interval_secs,
        skip: false,
    };
    (gateway, verify)
}

fn deploy_config(netlify: &NetlifyArgs, verify: &VerifyArgs, dry_run: bool) -> DeployConfig {
    let mut dns = DnsConfig::new(
        DnsProviderConfig::Netlify {
            api_token: netlify.netlify_api_key.clone(),
        },
        netlify.zone_id.clone(),
        netlify.dnslink_host.clone(),
    );
    dns.ttl = netlify.ttl;

    let (gateway, verify) = verify_config(verify);

    let mut config = DeployConfig::new(dns);
    config.gateway = gateway;
    config.verify = verify;
    config.dry_run = dry_run;
    config
}
