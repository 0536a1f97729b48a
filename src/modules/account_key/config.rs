//! Account key parameters

use crate::module::DesiredState;
use crate::modules::pki::{KeyAlgorithm, KeyRequest, KeyResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameter names accepted by the account key unit
pub const PARAMETERS: [&str; 6] = ["state", "name", "directory", "size", "type", "replace"];

fn default_size() -> u32 {
    4096
}

/// Account key parameter record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountKeyParams {
    /// Whether the key should exist
    #[serde(default)]
    pub state: DesiredState,

    /// Key file name inside `directory`
    pub name: String,

    /// Existing directory holding the key
    pub directory: PathBuf,

    /// Key size in bits
    #[serde(default = "default_size")]
    pub size: u32,

    /// Key algorithm
    #[serde(default, rename = "type")]
    pub key_type: KeyAlgorithm,

    /// Regenerate an existing key
    #[serde(default)]
    pub replace: bool,
}

impl AccountKeyParams {
    /// Create parameters for a present RSA 4096 key
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            state: DesiredState::Present,
            name: name.into(),
            directory: directory.into(),
            size: default_size(),
            key_type: KeyAlgorithm::Rsa,
            replace: false,
        }
    }

    /// Equivalent key request
    pub fn key_request(&self) -> KeyRequest {
        KeyRequest::new(&self.name, &self.directory)
            .with_algorithm(self.key_type, self.size)
            .force(self.replace)
    }
}

/// Result record shared by the key units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    /// Whether the key file changed
    pub changed: bool,
    /// Key size in bits
    pub size: u32,
    /// Key algorithm
    #[serde(rename = "type")]
    pub key_type: KeyAlgorithm,
    /// Key file path
    pub privatekey: PathBuf,
}

impl From<KeyResult> for KeyRecord {
    fn from(result: KeyResult) -> Self {
        Self {
            changed: result.changed,
            size: result.bits,
            key_type: result.algorithm,
            privatekey: result.path,
        }
    }
}
