//! Key and certificate lifecycle
//!
//! This module reconciles private keys, signing requests and signed
//! certificates on disk against a desired state.
//!
//! # Layout
//!
//! Certificates live under a root directory with fixed subdirectories:
//!
//! ```text
//! <root>/private/<name>.pem     leaf (or account) private key
//! <root>/csr/<name>.csr         signing request
//! <root>/certs/<name>.crt       signed leaf certificate
//! <root>/pem/<intermediate>     cached CA intermediate
//! <root>/pem/<name>.pem         leaf followed by intermediate
//! <root>/challenges/<name>/     challenge responses written by the helper
//! ```
//!
//! # Example
//!
//! ```ignore
//! use r0n_provision::modules::pki::*;
//!
//! let manager = PkiManager::new(
//!     Arc::new(HttpIntermediateSource::new(Duration::from_secs(30))?),
//!     Arc::new(ProcessSigningHelper::new("acme-tiny", Duration::from_secs(120))),
//! );
//! let request = CertificateRequest::new("example.com", "/etc/pki", "account.key");
//! let result = manager.issue_certificate(&request).await?;
//! ```

mod csr;
mod error;
mod intermediate;
mod key;
mod layout;
mod manager;
mod signer;
mod storage;

pub use csr::{build_signing_request, digest_by_name, Subject, CSR_VERSION, DEFAULT_DIGEST};
pub use error::{ErrorClass, PkiError, PkiResult};
pub use intermediate::{
    ensure_intermediate_cached, intermediate_file_name, CachedIntermediate,
    HttpIntermediateSource, IntermediateSource, DEFAULT_INTERMEDIATE_URL,
};
pub use key::{
    ensure_key_present, generate_private_key, private_key_pem, remove_key, KeyAlgorithm,
    KeyRequest, KeyResult, DSA_BITS, RSA_MAX_BITS, RSA_MIN_BITS,
};
pub use layout::{validate_file_name, CertificateLayout};
pub use manager::{CertResult, CertificateRequest, PkiManager, DEFAULT_KEY_FILE_MODE};
pub use signer::{
    validate_signed_certificate, ProcessSigningHelper, SigningHelper, SigningInputs,
    DEFAULT_HELPER,
};
pub use storage::require_directory;
