//! # Configuration System
//!
//! This module provides TOML-based runtime settings for R0N Provision.
//! Unit parameters are not part of this file; they arrive per invocation.
//!
//! ## Example Configuration
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [pki]
//! intermediate_url = "https://letsencrypt.org/certs/lets-encrypt-x3-cross-signed.pem"
//! helper_program = "acme-tiny"
//! helper_args = []
//! fetch_timeout_secs = 30
//! signing_timeout_secs = 120
//! key_file_mode = 0o600
//! ```

mod error;
mod loader;
mod types;
mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use types::{LogFormat, LogLevel, LoggingConfig, PkiConfig, ProvisionConfig};
pub use validation::{
    BasicValidator, ValidationError, ValidationResult, ValidationSeverity, Validator,
};
