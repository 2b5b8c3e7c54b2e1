// # dnslink-deploy
//
// Thin integration layer over dnslink-core:
// 1. Parse arguments (flags or environment variables)
// 2. Validate configuration
// 3. Initialize tracing and the runtime
// 4. Register backends and run one pipeline command
//
// All publish, verification and DNS logic lives in dnslink-core.
//
// ## Example
//
// ```bash
// export PINATA_API_KEY=... PINATA_API_SECRET=... PINATA_PIN_ALIAS=app
// export BUILD_PATH=./build
// export NETLIFY_API_KEY=... NETLIFY_DNS_ZONE_ID=... NETLIFY_DNS_LINK=_dnslink.app.example.com
//
// dnslink-deploy deploy
// IPFS_HASH=bafy... dnslink-deploy update-dns --skip-verify
// ```

mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use dnslink_core::{
    ContentPublisher, DeployPipeline, DeployReport, ProviderRegistry, PropagationVerifier,
};
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::config::Invocation;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error (bad flags, missing credentials, bad input)
/// - 2: Runtime error (backend failure, exhausted retries, propagation timeout)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeployExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DeployExitCode> for ExitCode {
    fn from(code: DeployExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DeployExitCode {
    /// Classify a failed run
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<dnslink_core::Error>() {
            Some(dnslink_core::Error::Config(_) | dnslink_core::Error::InvalidInput(_)) => {
                DeployExitCode::ConfigError
            }
            _ => DeployExitCode::RuntimeError,
        }
    }
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => DeployExitCode::Success,
                _ => DeployExitCode::ConfigError,
            }
            .into();
        }
    };

    let Some(log_level) = parse_log_level(&cli.log_level) else {
        eprintln!(
            "DNSLINK_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return DeployExitCode::ConfigError.into();
    };

    let invocation = match Invocation::from_command(cli.command, cli.dry_run) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DeployExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DeployExitCode::ConfigError.into();
    }

    info!(command = invocation.name(), "Starting dnslink-deploy");
    if cli.dry_run {
        warn!("DRY-RUN mode: DNS changes will be logged, not applied");
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DeployExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(invocation).await {
            Ok(()) => DeployExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                DeployExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

/// Register every backend compiled into this binary
fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "pinata")]
    dnslink_pinning_pinata::register(&registry);

    #[cfg(feature = "netlify")]
    dnslink_provider_netlify::register(&registry);

    #[cfg(feature = "gateway-http")]
    dnslink_gateway_http::register(&registry);

    registry
}

/// Run one command
async fn run(invocation: Invocation) -> Result<()> {
    let registry = build_registry();

    match invocation {
        Invocation::Deploy {
            config,
            build_path,
            github_output,
        } => {
            let pinning = config
                .pinning
                .as_ref()
                .map(|pinning| registry.create_pinning_service(pinning))
                .transpose()?;
            let gateway = registry.create_gateway(&config.gateway)?;
            let dns = registry.create_dns_provider(&config.dns.provider)?;

            let mut pipeline = DeployPipeline::new(gateway, dns, config)?;
            if let Some(pinning) = pinning {
                pipeline = pipeline.with_pinning(pinning);
            }

            let report = pipeline.deploy(&build_path).await?;
            emit_cid(report.cid.as_str(), github_output.as_deref())?;
            summarize(&report);
        }

        Invocation::Publish {
            pinning,
            publish,
            build_path,
            github_output,
        } => {
            let service = registry.create_pinning_service(&pinning)?;
            let outcome = ContentPublisher::new(service.as_ref(), publish.read_policy())
                .publish(&build_path, &publish.alias, &publish.regions)
                .await?;

            for warning in outcome.warnings() {
                warn!("{}", warning);
            }
            emit_cid(outcome.cid.as_str(), github_output.as_deref())?;
        }

        Invocation::UpdateDns { config, cid } => {
            let gateway = registry.create_gateway(&config.gateway)?;
            let dns = registry.create_dns_provider(&config.dns.provider)?;

            let report = DeployPipeline::new(gateway, dns, config)?
                .update_dns(&cid)
                .await?;
            summarize(&report);
        }

        Invocation::Verify {
            gateway,
            verify,
            cid,
        } => {
            let gateway = registry.create_gateway(&gateway)?;
            PropagationVerifier::new(gateway.as_ref())
                .wait_until_retrievable(&cid, &verify.policy())
                .await?;
        }
    }

    Ok(())
}

/// Print the CID and hand it to the CI runner when asked to
fn emit_cid(cid: &str, github_output: Option<&std::path::Path>) -> Result<()> {
    println!("{}", cid);

    if let Some(path) = github_output {
        output::append_github_output(path, "hash", cid)
            .with_context(|| format!("Failed to write step output to {}", path.display()))?;
        info!(path = %path.display(), "Wrote hash to step output");
    }
    Ok(())
}

fn summarize(report: &DeployReport) {
    let record = report
        .reconcile
        .created
        .as_ref()
        .map(|record| record.id.as_str())
        .unwrap_or("-");

    info!(
        cid = %report.cid,
        verified = report.verified,
        state = %report.reconcile.state,
        record,
        dry_run = report.reconcile.dry_run,
        "dnslink points at CID"
    );
}
