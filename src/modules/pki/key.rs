//! Private key generation and reconciliation

use super::error::{PkiError, PkiResult};
use super::layout::validate_file_name;
use super::storage::{remove_artifact, require_directory, write_artifact};
use openssl::dsa::Dsa;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Smallest RSA modulus accepted
pub const RSA_MIN_BITS: u32 = 1024;
/// Largest RSA modulus accepted
pub const RSA_MAX_BITS: u32 = 16384;
/// DSA prime lengths supported by the crypto backend
pub const DSA_BITS: [u32; 3] = [1024, 2048, 3072];

/// Asymmetric key algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlgorithm {
    /// RSA
    #[default]
    #[serde(alias = "rsa")]
    Rsa,
    /// DSA
    #[serde(alias = "dsa")]
    Dsa,
}

impl KeyAlgorithm {
    /// Check that `bits` is a usable size for this algorithm
    pub fn validate_bits(self, bits: u32) -> PkiResult<()> {
        let supported = match self {
            Self::Rsa => (RSA_MIN_BITS..=RSA_MAX_BITS).contains(&bits),
            Self::Dsa => DSA_BITS.contains(&bits),
        };
        if supported {
            Ok(())
        } else {
            Err(PkiError::UnsupportedKeySize {
                algorithm: self.to_string(),
                bits,
            })
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Dsa => write!(f, "DSA"),
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = PkiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RSA" => Ok(Self::Rsa),
            "DSA" => Ok(Self::Dsa),
            _ => Err(PkiError::invalid("type", format!("unknown key type '{s}'"))),
        }
    }
}

/// Generate a fresh key pair.
///
/// The size is validated first, so an unsupported pairing is reported as a
/// configuration error rather than a backend failure.
pub fn generate_private_key(algorithm: KeyAlgorithm, bits: u32) -> PkiResult<PKey<Private>> {
    algorithm.validate_bits(bits)?;
    debug!(%algorithm, bits, "Generating key pair");

    let key = match algorithm {
        KeyAlgorithm::Rsa => Rsa::generate(bits).and_then(PKey::from_rsa),
        KeyAlgorithm::Dsa => Dsa::generate(bits).and_then(PKey::from_dsa),
    };
    key.map_err(|e| PkiError::KeyGeneration(e.to_string()))
}

/// Serialize a private key as PKCS#8 PEM
pub fn private_key_pem(key: &PKey<Private>) -> PkiResult<Vec<u8>> {
    key.private_key_to_pem_pkcs8()
        .map_err(|e| PkiError::KeyGeneration(e.to_string()))
}

/// Desired private key on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    /// File name under `directory`
    pub name: String,
    /// Existing directory holding the key
    pub directory: PathBuf,
    /// Key algorithm
    pub algorithm: KeyAlgorithm,
    /// Key size in bits
    pub bits: u32,
    /// Regenerate even if the file exists
    pub force_regenerate: bool,
}

impl KeyRequest {
    /// Create a request with RSA 4096 defaults
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            algorithm: KeyAlgorithm::Rsa,
            bits: 4096,
            force_regenerate: false,
        }
    }

    /// Set algorithm and size
    pub fn with_algorithm(mut self, algorithm: KeyAlgorithm, bits: u32) -> Self {
        self.algorithm = algorithm;
        self.bits = bits;
        self
    }

    /// Set the force flag
    pub fn force(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }

    /// Full path of the key file
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}

/// Outcome of a key reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyResult {
    /// Whether anything on disk changed
    pub changed: bool,
    /// Key file path
    pub path: PathBuf,
    /// Key algorithm
    pub algorithm: KeyAlgorithm,
    /// Key size in bits
    pub bits: u32,
}

impl KeyResult {
    fn from_request(request: &KeyRequest, changed: bool) -> Self {
        Self {
            changed,
            path: request.path(),
            algorithm: request.algorithm,
            bits: request.bits,
        }
    }
}

/// Make sure a key exists at `request.path()`.
///
/// Without `force_regenerate` an existing file is left untouched and the
/// result reports no change, whatever size was requested.
pub fn ensure_key_present(request: &KeyRequest, file_mode: Option<u32>) -> PkiResult<KeyResult> {
    validate_file_name("name", &request.name)?;
    require_directory(&request.directory)?;

    let path = request.path();
    if !request.force_regenerate && path.exists() {
        debug!(path = %path.display(), "Private key already present");
        return Ok(KeyResult::from_request(request, false));
    }
    request.algorithm.validate_bits(request.bits)?;

    let key = generate_private_key(request.algorithm, request.bits)?;
    let pem = private_key_pem(&key)?;
    write_artifact(&path, &pem, file_mode)?;

    info!(
        path = %path.display(),
        algorithm = %request.algorithm,
        bits = request.bits,
        forced = request.force_regenerate,
        "Generated private key"
    );
    Ok(KeyResult::from_request(request, true))
}

/// Delete the key at `request.path()`; a missing file is not an error
pub fn remove_key(request: &KeyRequest) -> PkiResult<KeyResult> {
    validate_file_name("name", &request.name)?;

    let path = request.path();
    let removed = remove_artifact(&path)?;
    if removed {
        info!(path = %path.display(), "Removed private key");
    }
    Ok(KeyResult::from_request(request, removed))
}
