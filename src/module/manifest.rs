//! Module manifest and capability declarations.

use serde::Serialize;
use std::collections::BTreeSet;

/// Semantic version representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemVer {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl SemVer {
    /// Creates a new semantic version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for SemVer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Capabilities that a unit can provide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Generates private keys.
    KeyGeneration,

    /// Builds certificate signing requests.
    SigningRequest,

    /// Obtains signed certificates through an external helper.
    CertificateIssuance,

    /// Downloads artifacts over the network.
    NetworkFetch,

    /// Supports `state: absent`.
    Removal,

    /// Custom capability.
    Custom(String),
}

/// A dependency on another unit.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    /// Name of the required unit.
    pub name: String,

    /// Whether this dependency is optional.
    pub optional: bool,
}

impl Dependency {
    /// Creates a new required dependency.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    /// Creates a new optional dependency.
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// Manifest describing a unit's identity and capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleManifest {
    /// Unique name of the unit, also its CLI subcommand.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Unit version.
    pub version: SemVer,

    /// Capabilities provided by this unit.
    pub capabilities: BTreeSet<Capability>,

    /// Units whose artifacts this one consumes.
    pub dependencies: Vec<Dependency>,

    /// Accepted parameter names.
    pub parameters: Vec<String>,
}

impl ModuleManifest {
    /// Creates a new module manifest builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleManifestBuilder {
        ModuleManifestBuilder::new(name)
    }

    /// Checks if the unit has a specific capability.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns the list of required (non-optional) dependencies.
    #[must_use]
    pub fn required_dependencies(&self) -> Vec<&Dependency> {
        self.dependencies.iter().filter(|d| !d.optional).collect()
    }
}

/// Builder for creating module manifests.
#[derive(Debug)]
pub struct ModuleManifestBuilder {
    name: String,
    description: String,
    version: SemVer,
    capabilities: BTreeSet<Capability>,
    dependencies: Vec<Dependency>,
    parameters: Vec<String>,
}

impl ModuleManifestBuilder {
    /// Creates a new builder with the given unit name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: SemVer::new(0, 1, 0),
            capabilities: BTreeSet::new(),
            dependencies: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.version = SemVer::new(major, minor, patch);
        self
    }

    /// Adds multiple capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Adds a dependency.
    #[must_use]
    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Declares accepted parameter names.
    #[must_use]
    pub fn parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.extend(parameters.into_iter().map(Into::into));
        self
    }

    /// Builds the manifest.
    #[must_use]
    pub fn build(self) -> ModuleManifest {
        ModuleManifest {
            name: self.name,
            description: self.description,
            version: self.version,
            capabilities: self.capabilities,
            dependencies: self.dependencies,
            parameters: self.parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let manifest = ModuleManifest::builder("certificate")
            .description("Issue a certificate")
            .version(1, 2, 3)
            .capabilities([Capability::CertificateIssuance, Capability::NetworkFetch])
            .dependency(Dependency::required("account-key"))
            .dependency(Dependency::optional("private-key"))
            .parameters(["name", "directory"])
            .build();

        assert_eq!(manifest.version.to_string(), "1.2.3");
        assert!(manifest.has_capability(&Capability::NetworkFetch));
        assert!(!manifest.has_capability(&Capability::Removal));
        assert_eq!(manifest.required_dependencies().len(), 1);
        assert_eq!(manifest.parameters, vec!["name", "directory"]);
    }

    #[test]
    fn test_serialize() {
        let manifest = ModuleManifest::builder("private-key")
            .capabilities([Capability::Removal, Capability::KeyGeneration])
            .build();
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["version"], "0.1.0");
        assert_eq!(
            json["capabilities"],
            serde_json::json!(["key-generation", "removal"])
        );
    }
}
