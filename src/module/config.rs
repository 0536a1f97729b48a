//! Unit parameter records.

use super::{ModuleError, ModuleResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Desired state of an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Artifact should exist.
    #[default]
    Present,
    /// Artifact should not exist.
    Absent,
}

/// Flat parameter record handed to a unit.
///
/// Records are read from JSON or TOML and decoded into the unit's own
/// typed parameters with [`ModuleParams::parse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleParams {
    values: Map<String, Value>,
}

impl ModuleParams {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Gets a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the record is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parses a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidParams` if the text is not a JSON object.
    pub fn from_json_str(content: &str) -> ModuleResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ModuleError::InvalidParams(format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidParams` if the text is not valid TOML.
    pub fn from_toml_str(content: &str) -> ModuleResult<Self> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| ModuleError::InvalidParams(format!("malformed TOML: {e}")))?;
        let value = serde_json::to_value(table)
            .map_err(|e| ModuleError::InvalidParams(e.to_string()))?;
        Self::from_value(value)
    }

    /// Reads a record from a file; `.toml` files are TOML, anything else JSON.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidParams` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> ModuleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModuleError::InvalidParams(format!("failed to read '{}': {e}", path.display()))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    fn from_value(value: Value) -> ModuleResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(ModuleError::InvalidParams(format!(
                "expected an object, found {other}"
            ))),
        }
    }

    /// Decodes the record into typed parameters.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidParams` for missing, mistyped or
    /// unknown fields.
    pub fn parse<T: DeserializeOwned>(&self) -> ModuleResult<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| ModuleError::InvalidParams(e.to_string()))
    }
}

impl From<Map<String, Value>> for ModuleParams {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
