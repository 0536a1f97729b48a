//! The core Module Contract trait.
//!
//! Every provisioning unit implements this trait so the CLI can run it
//! without knowing its parameters.

use super::{ModuleManifest, ModuleParams, ModuleResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Flat result record of a reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutcome {
    changed: bool,
    fields: Map<String, Value>,
}

impl ModuleOutcome {
    /// Builds an outcome from a serializable record.
    ///
    /// Object records are flattened into the outcome; a `changed` field in
    /// the record is overridden by the explicit flag.
    pub fn from_record<T: Serialize>(changed: bool, record: &T) -> ModuleResult<Self> {
        let fields = match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                let mut fields = Map::new();
                fields.insert("result".to_string(), other);
                fields
            },
            Err(e) => return Err(super::ModuleError::Internal(e.to_string())),
        };
        let mut outcome = Self { changed, fields };
        outcome.fields.remove("changed");
        Ok(outcome)
    }

    /// Whether anything on disk changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Gets a field of the record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Renders the outcome as a JSON object with `changed` first.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("changed".to_string(), Value::Bool(self.changed));
        object.extend(self.fields.clone());
        Value::Object(object)
    }
}

/// The contract every provisioning unit implements.
///
/// A unit is a pure reconciliation: it decodes its parameter record,
/// brings the filesystem to the desired state and reports what changed.
/// Translating failures into exit codes is left to the caller.
///
/// # Example
///
/// ```ignore
/// use r0n_provision::module::*;
///
/// struct Noop;
///
/// #[async_trait::async_trait]
/// impl ModuleContract for Noop {
///     fn manifest(&self) -> ModuleManifest {
///         ModuleManifest::builder("noop").build()
///     }
///
///     async fn reconcile(&self, _params: ModuleParams) -> ModuleResult<ModuleOutcome> {
///         ModuleOutcome::from_record(false, &serde_json::json!({}))
///     }
/// }
/// ```
#[async_trait]
pub trait ModuleContract: Send + Sync {
    /// Returns the unit's manifest describing its identity and capabilities.
    fn manifest(&self) -> ModuleManifest;

    /// Brings on-disk state in line with `params`.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidParams` for undecodable parameters and
    /// `ModuleError::Pki` for reconciliation failures. A failed call never
    /// reports a change.
    async fn reconcile(&self, params: ModuleParams) -> ModuleResult<ModuleOutcome>;
}
