//! Key and certificate lifecycle manager

use super::csr::{build_signing_request, digest_by_name, Subject, DEFAULT_DIGEST};
use super::error::{PkiError, PkiResult};
use super::intermediate::{
    ensure_intermediate_cached, CachedIntermediate, IntermediateSource, DEFAULT_INTERMEDIATE_URL,
};
use super::key::{
    ensure_key_present, generate_private_key, private_key_pem, remove_key, KeyAlgorithm,
    KeyRequest, KeyResult,
};
use super::layout::{validate_file_name, CertificateLayout};
use super::signer::{validate_signed_certificate, SigningHelper, SigningInputs};
use super::storage::{ensure_directory, read_artifact, remove_artifact, write_artifact};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default permissions for private key files
pub const DEFAULT_KEY_FILE_MODE: u32 = 0o600;

/// Desired leaf certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Certificate name; also the default common name
    pub name: String,
    /// Certificate root holding the fixed subdirectories
    pub directory: PathBuf,
    /// Account key: a file under `private/` or an absolute path
    pub account_key: String,
    /// Leaf key algorithm
    pub algorithm: KeyAlgorithm,
    /// Leaf key size in bits
    pub bits: u32,
    /// Signature digest name
    pub digest: String,
    /// Subject fields
    pub subject: Subject,
    /// DNS subject alternative names
    pub alt_names: Vec<String>,
}

impl CertificateRequest {
    /// Create a request with RSA 4096 / sha256 defaults
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        account_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            account_key: account_key.into(),
            algorithm: KeyAlgorithm::Rsa,
            bits: 4096,
            digest: DEFAULT_DIGEST.to_string(),
            subject: Subject::default(),
            alt_names: Vec::new(),
        }
    }

    /// Set leaf key algorithm and size
    pub fn with_algorithm(mut self, algorithm: KeyAlgorithm, bits: u32) -> Self {
        self.algorithm = algorithm;
        self.bits = bits;
        self
    }

    /// Set the subject
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = subject;
        self
    }

    /// Certificate layout under `directory`
    pub fn layout(&self) -> CertificateLayout {
        CertificateLayout::new(&self.directory)
    }

    /// Resolved account key path
    pub fn account_key_path(&self) -> PathBuf {
        let key = Path::new(&self.account_key);
        if key.is_absolute() {
            key.to_path_buf()
        } else {
            self.layout().private_key(&self.account_key)
        }
    }

    /// Subject with the common name defaulted to `name`
    pub fn effective_subject(&self) -> Subject {
        self.subject.clone().with_default_common_name(&self.name)
    }

    /// Validate every parameter that does not need the filesystem
    pub fn validate(&self) -> PkiResult<()> {
        validate_file_name("name", &self.name)?;
        if !Path::new(&self.account_key).is_absolute() {
            validate_file_name("account_key", &self.account_key)?;
        }
        self.algorithm.validate_bits(self.bits)?;
        digest_by_name(&self.digest)?;
        self.effective_subject().validate()?;
        // Only DNS entries are supported; `IP:`, `email:` and the like keep
        // their prefix and are rejected here
        for alt in &self.alt_names {
            if alt.is_empty() || alt.contains(|c: char| c.is_whitespace() || c == ':') {
                return Err(PkiError::invalid(
                    "subjectAltName",
                    format!("'{alt}' is not a DNS name"),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of a certificate reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertResult {
    /// Whether anything on disk changed
    pub changed: bool,
    /// Leaf private key
    pub private_key: PathBuf,
    /// Signing request
    pub csr: PathBuf,
    /// Signed leaf certificate
    pub certificate: PathBuf,
    /// Leaf followed by the intermediate
    pub chain: PathBuf,
    /// Whether the intermediate was downloaded during this run
    pub intermediate_fetched: bool,
}

/// Reconciles keys and certificates on disk.
///
/// Collaborators for the network fetch and the signing exchange are
/// injected, so the whole flow can run against stubs.
#[derive(Debug, Clone)]
pub struct PkiManager {
    source: Arc<dyn IntermediateSource>,
    signer: Arc<dyn SigningHelper>,
    intermediate_url: String,
    key_file_mode: Option<u32>,
}

impl PkiManager {
    /// Create a manager with default URL and key permissions
    pub fn new(source: Arc<dyn IntermediateSource>, signer: Arc<dyn SigningHelper>) -> Self {
        Self {
            source,
            signer,
            intermediate_url: DEFAULT_INTERMEDIATE_URL.to_string(),
            key_file_mode: Some(DEFAULT_KEY_FILE_MODE),
        }
    }

    /// Override the intermediate certificate URL
    pub fn with_intermediate_url(mut self, url: impl Into<String>) -> Self {
        self.intermediate_url = url.into();
        self
    }

    /// Override key file permissions; `None` keeps the process umask
    pub fn with_key_file_mode(mut self, mode: Option<u32>) -> Self {
        self.key_file_mode = mode;
        self
    }

    /// Intermediate certificate URL
    pub fn intermediate_url(&self) -> &str {
        &self.intermediate_url
    }

    /// Make sure a private key exists
    pub fn ensure_key_present(&self, request: &KeyRequest) -> PkiResult<KeyResult> {
        ensure_key_present(request, self.key_file_mode)
    }

    /// Delete a private key if present
    pub fn remove_key(&self, request: &KeyRequest) -> PkiResult<KeyResult> {
        remove_key(request)
    }

    /// Download the intermediate into `<directory>/pem/` unless cached
    pub async fn ensure_intermediate_cached(&self, directory: &Path) -> PkiResult<CachedIntermediate> {
        ensure_intermediate_cached(
            self.source.as_ref(),
            &self.intermediate_url,
            &CertificateLayout::new(directory),
        )
        .await
    }

    /// Issue a leaf certificate.
    ///
    /// The leaf key and CSR are always regenerated and the result always
    /// reports a change. If signing fails the previous key, certificate and
    /// chain are left as they were.
    pub async fn issue_certificate(&self, request: &CertificateRequest) -> PkiResult<CertResult> {
        request.validate()?;
        let layout = request.layout();
        layout.verify()?;

        let account_key = request.account_key_path();
        if !account_key.is_file() {
            return Err(PkiError::invalid(
                "account_key",
                format!("{} does not exist", account_key.display()),
            ));
        }
        let digest = digest_by_name(&request.digest)?;
        let name = request.name.as_str();

        let intermediate = self.ensure_intermediate_cached(layout.root()).await?;

        // The new key stays in memory until the helper has signed its CSR
        let key = generate_private_key(request.algorithm, request.bits)?;
        let key_pem = private_key_pem(&key)?;

        let csr = build_signing_request(
            &key,
            &request.effective_subject(),
            &request.alt_names,
            digest,
        )?;
        let csr_pem = csr
            .to_pem()
            .map_err(|e| PkiError::SigningRequest(e.to_string()))?;
        let csr_path = layout.csr(name);
        write_artifact(&csr_path, &csr_pem, None)?;
        debug!(path = %csr_path.display(), "Wrote signing request");

        let challenge_dir = layout.challenge_dir(name);
        if ensure_directory(&challenge_dir)? {
            debug!(path = %challenge_dir.display(), "Created challenge directory");
        }

        let signed = self
            .signer
            .sign(SigningInputs {
                account_key: &account_key,
                csr: &csr_path,
                challenge_dir: &challenge_dir,
            })
            .await?;
        let certificates = validate_signed_certificate(&self.signer.name(), &signed)?;
        debug!(certificates, "Helper output validated");

        let key_path = layout.leaf_key(name);
        write_artifact(&key_path, &key_pem, self.key_file_mode)?;
        debug!(path = %key_path.display(), "Wrote leaf private key");

        let cert_path = layout.certificate(name);
        write_artifact(&cert_path, &signed, None)?;

        let mut chain = signed;
        chain.extend_from_slice(&read_artifact(&intermediate.path)?);
        let chain_path = layout.chain(name);
        write_artifact(&chain_path, &chain, None)?;

        info!(
            name,
            certificate = %cert_path.display(),
            chain = %chain_path.display(),
            "Issued certificate"
        );

        Ok(CertResult {
            changed: true,
            private_key: key_path,
            csr: csr_path,
            certificate: cert_path,
            chain: chain_path,
            intermediate_fetched: intermediate.fetched,
        })
    }

    /// Remove the per-name artifacts of a certificate.
    ///
    /// The intermediate cache and the challenge directory stay in place.
    pub fn remove_certificate(&self, request: &CertificateRequest) -> PkiResult<CertResult> {
        validate_file_name("name", &request.name)?;
        let layout = request.layout();
        let name = request.name.as_str();

        let result = CertResult {
            changed: false,
            private_key: layout.leaf_key(name),
            csr: layout.csr(name),
            certificate: layout.certificate(name),
            chain: layout.chain(name),
            intermediate_fetched: false,
        };

        let mut changed = false;
        for path in [
            &result.chain,
            &result.certificate,
            &result.csr,
            &result.private_key,
        ] {
            changed |= remove_artifact(path)?;
        }
        if changed {
            info!(name, "Removed certificate artifacts");
        }

        Ok(CertResult { changed, ..result })
    }
}
