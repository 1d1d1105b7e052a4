// # dyncheck - DNS zone TTL scanner
//
// This binary is a THIN integration layer:
// - All scan logic lives in dyncheck-core
// - Provider and chat integrations live in their plugin crates
//
// The binary is responsible for:
// 1. Parsing arguments
// 2. Loading and validating the YAML configuration
// 3. Initializing logging and the runtime
// 4. Wiring provider, checkpoint store and reporters into one run
//
// ## Usage
//
// ```bash
// export DYN_PASSWORD=...
// export OPSBOT_SLACK_TOKEN=...
// dyncheck /etc/dyncheck/config.yaml /var/lib/dyncheck/status.json
// ```
//
// ## Exit Codes
//
// - 0: run completed (with or without offending records)
// - 1: configuration error
// - 2: usage error (reported by clap)
// - 3: fatal runtime error (authentication, zone catalog, checkpoint)

use anyhow::{Context, Result};
use clap::Parser;
use dyncheck_core::traits::Reporter;
use dyncheck_core::{CheckConfig, ConsoleReporter, FileCheckpointStore, ProviderRegistry, ScanRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the different ways a run can end
#[derive(Debug, Clone, Copy)]
enum DyncheckExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Fatal error during the run; checkpoint not written
    RuntimeError = 3,
}

impl From<DyncheckExitCode> for ExitCode {
    fn from(code: DyncheckExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "dyncheck")]
#[command(about = "Report DNS records whose TTL is below policy", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    config: PathBuf,

    /// Checkpoint (status) file, created on first run
    status_file: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "DYNCHECK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_level(level: &str) -> Option<Level> {
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
    // Wrong arity exits with clap's usage code (2)
    let cli = Cli::parse();

    let config = match CheckConfig::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DyncheckExitCode::ConfigError.into();
        }
    };

    let Some(mut log_level) = parse_level(&cli.log_level) else {
        eprintln!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return DyncheckExitCode::ConfigError.into();
    };
    if config.verbose && log_level < Level::DEBUG {
        log_level = Level::DEBUG;
    }

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyncheckExitCode::ConfigError.into();
    }

    info!("Starting dyncheck");
    info!(
        "Configuration loaded: provider {}, minimum TTL {}s",
        config.provider.type_name(),
        config.policy.min_ttl
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyncheckExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config, cli.status_file)).into()
}

/// Build the collaborators and run one scan
async fn run(config: CheckConfig, status_file: PathBuf) -> DyncheckExitCode {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "dyn")]
    dyncheck_provider_dyn::register(&registry);

    let provider = match registry.create_provider(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to create provider: {}", e);
            return DyncheckExitCode::ConfigError;
        }
    };

    let reporters = match build_reporters(&config) {
        Ok(reporters) => reporters,
        Err(e) => {
            error!("Failed to set up reporting: {:#}", e);
            return DyncheckExitCode::ConfigError;
        }
    };

    let store = FileCheckpointStore::new(&status_file);
    let runner = match ScanRunner::new(provider, Box::new(store), &config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return DyncheckExitCode::ConfigError;
        }
    };

    let result = match runner.run().await {
        Ok(result) => result,
        Err(e) => {
            error!("Scan aborted: {}", e);
            return DyncheckExitCode::RuntimeError;
        }
    };

    let text = dyncheck_core::format_report(
        &result,
        runner.min_ttl(),
        config.report.include_reverse_index,
    );
    let delivered = dyncheck_core::deliver_all(&reporters, &text).await;
    if !text.is_empty() && delivered < reporters.len() {
        warn!(
            "Report delivered through {} of {} channel(s)",
            delivered,
            reporters.len()
        );
    }

    DyncheckExitCode::Completed
}

/// Reporters enabled by the `report` section
fn build_reporters(config: &CheckConfig) -> Result<Vec<Box<dyn Reporter>>> {
    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();

    if config.report.print {
        reporters.push(Box::new(ConsoleReporter));
    }

    if config.report.slack.enabled {
        #[cfg(feature = "slack")]
        {
            let slack = dyncheck_notify_slack::SlackReporter::from_config(&config.report.slack)
                .context("Slack reporter")?;
            reporters.push(Box::new(slack));
        }

        #[cfg(not(feature = "slack"))]
        anyhow::bail!("report.slack.enabled is set but dyncheck was built without the slack feature");
    }

    Ok(reporters)
}
