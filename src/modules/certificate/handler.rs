//! Certificate handler implementing ModuleContract

use super::config::{CertificateParams, CertificateRecord, PARAMETERS};
use crate::module::{
    Capability, Dependency, DesiredState, ModuleContract, ModuleManifest, ModuleOutcome,
    ModuleParams, ModuleResult,
};
use crate::modules::account_key::AccountKeyHandler;
use crate::modules::pki::{PkiManager, PkiResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Issues (or removes) a leaf certificate and its chain
#[derive(Debug, Clone)]
pub struct CertificateHandler {
    manager: Arc<PkiManager>,
}

impl CertificateHandler {
    /// Unit name
    pub const NAME: &'static str = "certificate";

    /// Create a handler backed by `manager`
    pub fn new(manager: Arc<PkiManager>) -> Self {
        Self { manager }
    }

    /// Apply typed parameters
    pub async fn apply(&self, params: &CertificateParams) -> PkiResult<CertificateRecord> {
        let request = params.certificate_request();
        debug!(name = %params.name, state = ?params.state, "Reconciling certificate");

        let result = match params.state {
            DesiredState::Present => match self.manager.issue_certificate(&request).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(name = %params.name, class = %err.class(), error = %err, "Certificate issuance failed");
                    return Err(err);
                },
            },
            DesiredState::Absent => self.manager.remove_certificate(&request)?,
        };
        Ok(result.into())
    }
}

#[async_trait]
impl ModuleContract for CertificateHandler {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder(Self::NAME)
            .description("Issue a leaf certificate through the validation helper and build its chain")
            .version(1, 0, 0)
            .capabilities([
                Capability::KeyGeneration,
                Capability::SigningRequest,
                Capability::CertificateIssuance,
                Capability::NetworkFetch,
                Capability::Removal,
            ])
            .dependency(Dependency::required(AccountKeyHandler::NAME))
            .parameters(PARAMETERS)
            .build()
    }

    async fn reconcile(&self, params: ModuleParams) -> ModuleResult<ModuleOutcome> {
        let params: CertificateParams = params.parse()?;
        let record = self.apply(&params).await?;
        ModuleOutcome::from_record(record.changed, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleError;
    use crate::modules::test_manager;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_depends_on_account_key() {
        let manifest = CertificateHandler::new(test_manager()).manifest();
        assert_eq!(manifest.name, "certificate");
        assert_eq!(manifest.required_dependencies()[0].name, "account-key");
        assert!(manifest.has_capability(&Capability::CertificateIssuance));
        assert_eq!(manifest.parameters.len(), 15);
    }

    #[tokio::test]
    async fn test_issue_and_remove() {
        let dir = tempdir().unwrap();
        for sub in ["private", "csr", "pem", "challenges", "certs"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
        }
        fs::write(dir.path().join("private/account.key"), b"ACCOUNT").unwrap();

        let handler = CertificateHandler::new(test_manager());
        let params = CertificateParams {
            size: 1024,
            ..CertificateParams::new("example.com", "account.key", dir.path())
        };

        let record = handler.apply(&params).await.unwrap();
        assert!(record.changed);
        assert_eq!(record.chain, dir.path().join("pem/example.com.pem"));
        assert!(record.certificate.exists());

        let removed = handler
            .apply(&CertificateParams {
                state: DesiredState::Absent,
                ..params
            })
            .await
            .unwrap();
        assert!(removed.changed);
        assert!(!record.certificate.exists());
    }

    #[tokio::test]
    async fn test_reconcile_missing_layout() {
        let dir = tempdir().unwrap();
        let handler = CertificateHandler::new(test_manager());
        let params = ModuleParams::new()
            .with("name", "example.com")
            .with("account_key", "account.key")
            .with("directory", dir.path().to_string_lossy().into_owned());

        let err = handler.reconcile(params).await.unwrap_err();
        assert!(matches!(err, ModuleError::Pki(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
