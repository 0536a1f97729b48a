//! Module error types and result aliases.

use crate::config::ConfigError;
use crate::modules::pki::{ErrorClass, PkiError};
use thiserror::Error;

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur while running a unit.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Parameter record could not be read or decoded.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// No unit with this name is registered.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// Runtime settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reconciliation failed.
    #[error(transparent)]
    Pki(#[from] PkiError),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModuleError {
    /// Error class, if the failure maps onto one.
    #[must_use]
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::InvalidParams(_) | Self::UnknownModule(_) | Self::Config(_) => {
                Some(ErrorClass::Configuration)
            },
            Self::Pki(err) => Some(err.class()),
            Self::Internal(_) => None,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.class().map_or(1, ErrorClass::exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ModuleError::InvalidParams("x".into()).exit_code(), 2);
        assert_eq!(ModuleError::Internal("x".into()).exit_code(), 1);
        assert_eq!(
            ModuleError::from(PkiError::DirectoryNotFound(PathBuf::from("/x"))).exit_code(),
            2
        );
        assert_eq!(
            ModuleError::from(PkiError::Network {
                url: "https://ca.example/x.pem".into(),
                message: "refused".into(),
            })
            .exit_code(),
            5
        );
    }

    #[test]
    fn test_pki_message_is_transparent() {
        let err = ModuleError::from(PkiError::DirectoryNotFound(PathBuf::from("/srv/keys")));
        assert_eq!(
            err.to_string(),
            "The specified directory (/srv/keys) does not exist"
        );
    }
}
