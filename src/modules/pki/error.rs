//! PKI error types

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reconciling key and certificate artifacts
#[derive(Debug, Error)]
pub enum PkiError {
    /// Target directory does not exist
    #[error("The specified directory ({}) does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Invalid parameter value or combination
    #[error("invalid parameter '{field}': {message}")]
    InvalidParameter {
        /// Parameter name
        field: String,
        /// Error message
        message: String,
    },

    /// Algorithm and key size cannot be combined
    #[error("unsupported {algorithm} key size: {bits} bits")]
    UnsupportedKeySize {
        /// Requested algorithm
        algorithm: String,
        /// Requested size
        bits: u32,
    },

    /// Digest name not known to the crypto backend
    #[error("unsupported signature digest: {0}")]
    UnsupportedDigest(String),

    /// Key pair generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// CSR construction or signing failed
    #[error("certificate signing request error: {0}")]
    SigningRequest(String),

    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path involved in the operation
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// External validation helper failed
    #[error("signing helper '{program}' failed: {message}")]
    Signing {
        /// Helper program
        program: String,
        /// Failure description, including helper diagnostics
        message: String,
    },

    /// Intermediate certificate fetch failed
    #[error("failed to fetch intermediate certificate from {url}: {message}")]
    Network {
        /// Source URL
        url: String,
        /// Error message
        message: String,
    },
}

/// Result type for PKI operations
pub type PkiResult<T> = Result<T, PkiError>;

/// Error classes exposed to the calling shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad parameters or missing directories; raised before any write
    Configuration,
    /// Read, write or delete failure
    Io,
    /// Validation helper failure
    ExternalProcess,
    /// Intermediate certificate fetch failure
    Network,
    /// Crypto backend failure
    KeyGeneration,
}

impl ErrorClass {
    /// Process exit code used by the CLI wrapper
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => 2,
            Self::Io => 3,
            Self::ExternalProcess => 4,
            Self::Network => 5,
            Self::KeyGeneration => 6,
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Io => write!(f, "io"),
            Self::ExternalProcess => write!(f, "external-process"),
            Self::Network => write!(f, "network"),
            Self::KeyGeneration => write!(f, "key-generation"),
        }
    }
}

impl PkiError {
    /// Attach a path to an I/O error
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Shorthand for an invalid parameter
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DirectoryNotFound(_)
            | Self::InvalidParameter { .. }
            | Self::UnsupportedKeySize { .. }
            | Self::UnsupportedDigest(_) => ErrorClass::Configuration,
            Self::KeyGeneration(_) | Self::SigningRequest(_) => ErrorClass::KeyGeneration,
            Self::Io { .. } => ErrorClass::Io,
            Self::Signing { .. } => ErrorClass::ExternalProcess,
            Self::Network { .. } => ErrorClass::Network,
        }
    }

    /// Check if this error was raised before touching the filesystem
    pub fn is_configuration(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }
}
