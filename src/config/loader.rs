//! Configuration file loader.

use super::error::{ConfigError, ConfigResult};
use super::types::ProvisionConfig;
use super::validation::Validator;
use std::path::Path;
use tracing::warn;

/// Default location of the runtime settings file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/r0n-provision/provision.toml";

/// Configuration loader with validation support.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Validators to run on loaded configuration.
    validators: Vec<Box<dyn Validator>>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator to the loader.
    #[must_use]
    pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ProvisionConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.load_str(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML is malformed
    /// - Validation fails
    pub fn load_str(&self, content: &str) -> ConfigResult<ProvisionConfig> {
        let config: ProvisionConfig = toml::from_str(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Load configuration or fall back to defaults if the file doesn't exist.
    ///
    /// Defaults go through the same validators as a loaded file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ProvisionConfig> {
        let path = path.as_ref();
        if path.exists() {
            self.load(path)
        } else {
            let config = ProvisionConfig::default();
            self.validate(&config)?;
            Ok(config)
        }
    }

    /// Validate a configuration against all registered validators.
    fn validate(&self, config: &ProvisionConfig) -> ConfigResult<()> {
        for validator in &self.validators {
            let result = validator.validate(config);
            for warning in result.warnings() {
                warn!(field = %warning.field, "{}", warning.message);
            }
            if !result.is_valid() {
                let errors: Vec<String> = result
                    .errors_only()
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                return Err(ConfigError::ValidationError(errors.join("; ")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicValidator;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_string() {
        let loader = ConfigLoader::new();
        let config = loader
            .load_str(
                r#"
            [pki]
            helper_program = "acme-tiny-wrapper"
        "#,
            )
            .unwrap();
        assert_eq!(config.pki.helper_program, "acme-tiny-wrapper");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("provision.toml");

        std::fs::write(
            &config_path,
            r#"
            [logging]
            format = "compact"
        "#,
        )
        .unwrap();

        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        let config = loader.load(&config_path).unwrap();
        assert_eq!(config.logging.format, crate::config::LogFormat::Compact);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let loader = ConfigLoader::new();
        let result = loader.load("/nonexistent/path/provision.toml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        let config = loader.load_or_default("/nonexistent/path").unwrap();
        assert_eq!(config.pki.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_validation_failure() {
        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        let result = loader.load_str("[pki]\nsigning_timeout_secs = 0\n");
        match result {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("pki.signing_timeout_secs"));
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_log_level() {
        let loader = ConfigLoader::new();
        let result = loader.load_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
