//! Private key handler implementing ModuleContract

use super::config::{PrivateKeyParams, PrivateKeyRecord, PARAMETERS};
use crate::module::{
    Capability, DesiredState, ModuleContract, ModuleManifest, ModuleOutcome, ModuleParams,
    ModuleResult,
};
use crate::modules::pki::{PkiManager, PkiResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Generates or removes a general-purpose private key
#[derive(Debug, Clone)]
pub struct PrivateKeyHandler {
    manager: Arc<PkiManager>,
}

impl PrivateKeyHandler {
    /// Unit name
    pub const NAME: &'static str = "private-key";

    /// Create a handler backed by `manager`
    pub fn new(manager: Arc<PkiManager>) -> Self {
        Self { manager }
    }

    /// Apply typed parameters.
    ///
    /// Generation needs an existing directory; removal from a missing
    /// directory is a no-op.
    pub fn apply(&self, params: &PrivateKeyParams) -> PkiResult<PrivateKeyRecord> {
        let request = params.key_request();
        debug!(name = %params.name, state = ?params.state, "Reconciling private key");

        let result = match params.state {
            DesiredState::Present => self.manager.ensure_key_present(&request)?,
            DesiredState::Absent => self.manager.remove_key(&request)?,
        };
        Ok(result.into())
    }
}

#[async_trait]
impl ModuleContract for PrivateKeyHandler {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder(Self::NAME)
            .description("Generate or remove a general-purpose RSA/DSA private key")
            .version(1, 0, 0)
            .capabilities([Capability::KeyGeneration, Capability::Removal])
            .parameters(PARAMETERS)
            .build()
    }

    async fn reconcile(&self, params: ModuleParams) -> ModuleResult<ModuleOutcome> {
        let params: PrivateKeyParams = params.parse()?;
        let record = self.apply(&params)?;
        ModuleOutcome::from_record(record.changed, &record)
    }
}
