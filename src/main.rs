//! R0N Provision binary entry point.
//!
//! Runs one unit per invocation. The result record goes to stdout as JSON;
//! logs go to stderr.

use clap::{Parser, Subcommand};
use r0n_provision::config::{
    BasicValidator, ConfigLoader, LogFormat, LoggingConfig, ProvisionConfig, DEFAULT_CONFIG_PATH,
};
use r0n_provision::module::{ModuleError, ModuleParams, ModuleResult};
use r0n_provision::modules::{build_manager, unit, units};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Runtime settings file
    #[arg(short, long, env = "R0N_PROVISION_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the settings file
    #[arg(short, long, env = "R0N_PROVISION_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate or remove the ACME account key
    AccountKey {
        /// Parameter record (JSON, or TOML with a .toml extension)
        params: PathBuf,
    },
    /// Generate or remove a private key
    PrivateKey {
        /// Parameter record (JSON, or TOML with a .toml extension)
        params: PathBuf,
    },
    /// Issue or remove a certificate
    Certificate {
        /// Parameter record (JSON, or TOML with a .toml extension)
        params: PathBuf,
    },
    /// List unit manifests
    Modules,
}

impl Command {
    fn unit(&self) -> Option<(&'static str, &Path)> {
        match self {
            Self::AccountKey { params } => Some(("account-key", params.as_path())),
            Self::PrivateKey { params } => Some(("private-key", params.as_path())),
            Self::Certificate { params } => Some(("certificate", params.as_path())),
            Self::Modules => None,
        }
    }
}

fn init_logging(config: &LoggingConfig, level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(config.level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

async fn run(config: &ProvisionConfig, command: &Command) -> ModuleResult<serde_json::Value> {
    let manager = Arc::new(build_manager(&config.pki)?);

    let Some((name, params_path)) = command.unit() else {
        let manifests: Vec<_> = units(manager).iter().map(|u| u.manifest()).collect();
        return serde_json::to_value(manifests).map_err(|e| ModuleError::Internal(e.to_string()));
    };

    let unit = unit(name, manager).ok_or_else(|| ModuleError::UnknownModule(name.to_string()))?;
    let params = ModuleParams::load(params_path)?;

    info!(unit = name, params = %params_path.display(), "Running unit");
    let outcome = unit.reconcile(params).await?;
    info!(unit = name, changed = outcome.changed(), "Unit finished");

    Ok(outcome.to_json())
}

fn report_failure(err: &ModuleError) -> ExitCode {
    let code = err.exit_code();
    let class = err.class().map(|c| c.to_string());
    error!(error = %err, class = ?class, "Unit failed");
    println!("{}", json!({ "failed": true, "msg": err.to_string() }));
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = ConfigLoader::new()
        .with_validator(BasicValidator::new())
        .load_or_default(&cli.config);
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            init_logging(&LoggingConfig::default(), cli.log_level.as_deref());
            return report_failure(&ModuleError::from(err));
        },
    };
    init_logging(&config.logging, cli.log_level.as_deref());

    match run(&config, &cli.command).await {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        },
        Err(err) => report_failure(&err),
    }
}
