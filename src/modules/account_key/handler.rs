//! Account key handler implementing ModuleContract

use super::config::{AccountKeyParams, KeyRecord, PARAMETERS};
use crate::module::{
    Capability, DesiredState, ModuleContract, ModuleManifest, ModuleOutcome, ModuleParams,
    ModuleResult,
};
use crate::modules::pki::{PkiManager, PkiResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Generates or removes the ACME account key
#[derive(Debug, Clone)]
pub struct AccountKeyHandler {
    manager: Arc<PkiManager>,
}

impl AccountKeyHandler {
    /// Unit name
    pub const NAME: &'static str = "account-key";

    /// Create a handler backed by `manager`
    pub fn new(manager: Arc<PkiManager>) -> Self {
        Self { manager }
    }

    /// Apply typed parameters
    pub fn apply(&self, params: &AccountKeyParams) -> PkiResult<KeyRecord> {
        let request = params.key_request();
        debug!(name = %params.name, state = ?params.state, "Reconciling account key");

        let result = match params.state {
            DesiredState::Present => self.manager.ensure_key_present(&request)?,
            DesiredState::Absent => self.manager.remove_key(&request)?,
        };
        Ok(result.into())
    }
}

#[async_trait]
impl ModuleContract for AccountKeyHandler {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder(Self::NAME)
            .description("Generate or remove the RSA/DSA key used to register with the CA")
            .version(1, 0, 0)
            .capabilities([Capability::KeyGeneration, Capability::Removal])
            .parameters(PARAMETERS)
            .build()
    }

    async fn reconcile(&self, params: ModuleParams) -> ModuleResult<ModuleOutcome> {
        let params: AccountKeyParams = params.parse()?;
        let record = self.apply(&params)?;
        ModuleOutcome::from_record(record.changed, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleError;
    use crate::modules::pki::{KeyAlgorithm, PkiError};
    use crate::modules::test_manager;
    use tempfile::tempdir;

    fn params(dir: &std::path::Path) -> AccountKeyParams {
        AccountKeyParams {
            size: 1024,
            ..AccountKeyParams::new("account.key", dir)
        }
    }

    #[test]
    fn test_manifest() {
        let handler = AccountKeyHandler::new(test_manager());
        let manifest = handler.manifest();
        assert_eq!(manifest.name, "account-key");
        assert!(manifest.has_capability(&Capability::Removal));
        assert!(manifest.parameters.contains(&"replace".to_string()));
    }

    #[test]
    fn test_present_then_absent() {
        let dir = tempdir().unwrap();
        let handler = AccountKeyHandler::new(test_manager());

        let created = handler.apply(&params(dir.path())).unwrap();
        assert!(created.changed);
        assert_eq!(created.key_type, KeyAlgorithm::Rsa);
        assert_eq!(created.privatekey, dir.path().join("account.key"));

        assert!(!handler.apply(&params(dir.path())).unwrap().changed);

        let removed = handler
            .apply(&AccountKeyParams {
                state: DesiredState::Absent,
                ..params(dir.path())
            })
            .unwrap();
        assert!(removed.changed);
        assert!(!dir.path().join("account.key").exists());
    }

    #[tokio::test]
    async fn test_reconcile_missing_directory() {
        let handler = AccountKeyHandler::new(test_manager());
        let params = ModuleParams::new()
            .with("name", "account.key")
            .with("directory", "/nonexistent/r0n/keys")
            .with("size", 1024);

        let err = handler.reconcile(params).await.unwrap_err();
        assert!(matches!(
            err,
            ModuleError::Pki(PkiError::DirectoryNotFound(_))
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_outcome() {
        let dir = tempdir().unwrap();
        let handler = AccountKeyHandler::new(test_manager());
        let params = ModuleParams::new()
            .with("name", "account.key")
            .with("directory", dir.path().to_string_lossy().into_owned())
            .with("size", 1024)
            .with("type", "RSA");

        let outcome = handler.reconcile(params).await.unwrap();
        assert!(outcome.changed());
        assert_eq!(outcome.get("size"), Some(&serde_json::json!(1024)));
        assert_eq!(outcome.get("type"), Some(&serde_json::json!("RSA")));
    }
}
