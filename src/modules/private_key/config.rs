//! Private key parameters

use crate::module::DesiredState;
use crate::modules::account_key::KeyRecord;
use crate::modules::pki::{KeyAlgorithm, KeyRequest};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameter names accepted by the private key unit
pub const PARAMETERS: [&str; 6] = ["state", "name", "path", "size", "type", "force"];

fn default_size() -> u32 {
    4096
}

/// Private key parameter record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivateKeyParams {
    /// Whether the key should exist
    #[serde(default)]
    pub state: DesiredState,

    /// Key file name inside `path`
    pub name: String,

    /// Existing directory holding the key
    pub path: PathBuf,

    /// Key size in bits
    #[serde(default = "default_size")]
    pub size: u32,

    /// Key algorithm
    #[serde(default, rename = "type")]
    pub key_type: KeyAlgorithm,

    /// Regenerate an existing key
    #[serde(default)]
    pub force: bool,
}

impl PrivateKeyParams {
    /// Create parameters for a present RSA 4096 key
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            state: DesiredState::Present,
            name: name.into(),
            path: path.into(),
            size: default_size(),
            key_type: KeyAlgorithm::Rsa,
            force: false,
        }
    }

    /// Equivalent key request
    pub fn key_request(&self) -> KeyRequest {
        KeyRequest::new(&self.name, &self.path)
            .with_algorithm(self.key_type, self.size)
            .force(self.force)
    }
}

/// Result record of the private key unit
pub type PrivateKeyRecord = KeyRecord;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleParams;

    #[test]
    fn test_parse_toml_record() {
        let params: PrivateKeyParams = ModuleParams::from_toml_str(
            r#"
            name = "web.pem"
            path = "/etc/ssl/private"
            type = "dsa"
            size = 2048
            force = true
        "#,
        )
        .unwrap()
        .parse()
        .unwrap();

        assert_eq!(params.state, DesiredState::Present);
        assert_eq!(params.key_type, KeyAlgorithm::Dsa);

        let request = params.key_request();
        assert_eq!(request.path(), PathBuf::from("/etc/ssl/private/web.pem"));
        assert!(request.force_regenerate);
    }

    #[test]
    fn test_replace_is_not_a_private_key_parameter() {
        let params = ModuleParams::new()
            .with("name", "web.pem")
            .with("path", "/tmp")
            .with("replace", true);
        assert!(params.parse::<PrivateKeyParams>().is_err());
    }
}
