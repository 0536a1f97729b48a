//! Configuration type definitions.

use crate::modules::pki::{DEFAULT_HELPER, DEFAULT_INTERMEDIATE_URL, DEFAULT_KEY_FILE_MODE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for R0N Provision.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Key and certificate settings.
    pub pki: PkiConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: LogLevel,

    /// Log format (json, pretty, compact).
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose).
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level (least verbose).
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (machine-readable).
    Json,
    /// Pretty format with colors (default).
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
}

/// Key and certificate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PkiConfig {
    /// Where the CA intermediate is downloaded from.
    pub intermediate_url: String,

    /// Domain-validation helper program.
    pub helper_program: String,

    /// Extra arguments appended after the standard helper arguments.
    pub helper_args: Vec<String>,

    /// Intermediate download timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Helper run timeout in seconds.
    pub signing_timeout_secs: u64,

    /// Permissions applied to generated private keys.
    pub key_file_mode: u32,
}

impl Default for PkiConfig {
    fn default() -> Self {
        Self {
            intermediate_url: DEFAULT_INTERMEDIATE_URL.to_string(),
            helper_program: DEFAULT_HELPER.to_string(),
            helper_args: Vec::new(),
            fetch_timeout_secs: 30,
            signing_timeout_secs: 120,
            key_file_mode: DEFAULT_KEY_FILE_MODE,
        }
    }
}

impl PkiConfig {
    /// Intermediate download timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Helper run timeout.
    #[must_use]
    pub fn signing_timeout(&self) -> Duration {
        Duration::from_secs(self.signing_timeout_secs)
    }
}
