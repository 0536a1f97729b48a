//! Directory layout of a certificate root

use super::error::{PkiError, PkiResult};
use super::storage::require_directory;
use std::path::{Path, PathBuf};

/// Subdirectory holding private keys
pub const PRIVATE_DIR: &str = "private";
/// Subdirectory holding signing requests
pub const CSR_DIR: &str = "csr";
/// Subdirectory holding the intermediate certificate and chains
pub const PEM_DIR: &str = "pem";
/// Subdirectory holding per-name challenge directories
pub const CHALLENGES_DIR: &str = "challenges";
/// Subdirectory holding signed leaf certificates
pub const CERTS_DIR: &str = "certs";

/// Check that `value` can be used as a single file name.
///
/// Names end up in paths and on the helper's command line, so separators,
/// parent references and control characters are rejected.
pub fn validate_file_name(field: &str, value: &str) -> PkiResult<()> {
    if value.is_empty() {
        return Err(PkiError::invalid(field, "must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(PkiError::invalid(field, format!("'{value}' is not a file name")));
    }
    if value.contains(['/', '\\']) {
        return Err(PkiError::invalid(
            field,
            format!("'{value}' must not contain path separators"),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(PkiError::invalid(
            field,
            "must not contain control characters",
        ));
    }
    if value.starts_with('-') {
        return Err(PkiError::invalid(
            field,
            format!("'{value}' must not start with '-'"),
        ));
    }
    Ok(())
}

/// Paths of every artifact kept under a certificate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateLayout {
    root: PathBuf,
}

impl CertificateLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root and its fixed subdirectories exist
    pub fn verify(&self) -> PkiResult<()> {
        require_directory(&self.root)?;
        for sub in [PRIVATE_DIR, CSR_DIR, PEM_DIR, CHALLENGES_DIR, CERTS_DIR] {
            require_directory(&self.root.join(sub))?;
        }
        Ok(())
    }

    /// `private/<file>`
    pub fn private_key(&self, file: &str) -> PathBuf {
        self.root.join(PRIVATE_DIR).join(file)
    }

    /// `private/<name>.pem`
    pub fn leaf_key(&self, name: &str) -> PathBuf {
        self.private_key(&format!("{name}.pem"))
    }

    /// `csr/<name>.csr`
    pub fn csr(&self, name: &str) -> PathBuf {
        self.root.join(CSR_DIR).join(format!("{name}.csr"))
    }

    /// `pem/<file>`
    pub fn pem(&self, file: &str) -> PathBuf {
        self.root.join(PEM_DIR).join(file)
    }

    /// `pem/<name>.pem`
    pub fn chain(&self, name: &str) -> PathBuf {
        self.pem(&format!("{name}.pem"))
    }

    /// `challenges/<name>`
    pub fn challenge_dir(&self, name: &str) -> PathBuf {
        self.root.join(CHALLENGES_DIR).join(name)
    }

    /// `certs/<name>.crt`
    pub fn certificate(&self, name: &str) -> PathBuf {
        self.root.join(CERTS_DIR).join(format!("{name}.crt"))
    }
}
