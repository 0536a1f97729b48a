//! Configuration validation system.

use super::types::ProvisionConfig;
use crate::modules::pki::intermediate_file_name;

/// A single validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// Error message.
    pub message: String,
    /// Severity level.
    pub severity: ValidationSeverity,
}

impl ValidationError {
    /// Create a new error.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    /// Create a new warning.
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

/// Severity of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Error - configuration is invalid.
    Error,
    /// Warning - configuration may have issues.
    Warning,
}

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if the validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity == ValidationSeverity::Error)
    }

    /// Get all validation issues.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get only errors (not warnings).
    #[must_use]
    pub fn errors_only(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Error)
            .collect()
    }

    /// Get only warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Warning)
            .collect()
    }

    /// Merge another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

/// Trait for configuration validators.
pub trait Validator: std::fmt::Debug + Send + Sync {
    /// Validate a configuration and return any errors.
    fn validate(&self, config: &ProvisionConfig) -> ValidationResult;
}

/// Built-in validator for basic configuration checks.
#[derive(Debug, Default)]
pub struct BasicValidator;

impl BasicValidator {
    /// Create a new basic validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for BasicValidator {
    fn validate(&self, config: &ProvisionConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        let pki = &config.pki;

        if pki.fetch_timeout_secs == 0 {
            result.add_error(ValidationError::error(
                "pki.fetch_timeout_secs",
                "Fetch timeout cannot be 0",
            ));
        }
        if pki.signing_timeout_secs == 0 {
            result.add_error(ValidationError::error(
                "pki.signing_timeout_secs",
                "Signing timeout cannot be 0",
            ));
        }

        if pki.helper_program.trim().is_empty() {
            result.add_error(ValidationError::error(
                "pki.helper_program",
                "Helper program cannot be empty",
            ));
        }

        if pki.key_file_mode > 0o777 {
            result.add_error(ValidationError::error(
                "pki.key_file_mode",
                format!("Key file mode {:o} is not a permission mask", pki.key_file_mode),
            ));
        } else if pki.key_file_mode & 0o077 != 0 {
            result.add_error(ValidationError::warning(
                "pki.key_file_mode",
                format!("Key file mode {:o} exposes private keys", pki.key_file_mode),
            ));
        }

        let url = pki.intermediate_url.as_str();
        if url.starts_with("http://") {
            result.add_error(ValidationError::warning(
                "pki.intermediate_url",
                "Intermediate certificate is fetched without TLS",
            ));
        } else if !url.starts_with("https://") {
            result.add_error(ValidationError::error(
                "pki.intermediate_url",
                format!("Unsupported intermediate URL: {url}"),
            ));
        }
        if intermediate_file_name(url).is_err() {
            result.add_error(ValidationError::error(
                "pki.intermediate_url",
                "Intermediate URL must end with a file name",
            ));
        }

        result
    }
}
