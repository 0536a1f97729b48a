//! # Module Contract
//!
//! This module defines the contract every R0N Provision unit implements.
//! The contract provides a standardized interface for discovery
//! (manifests), parameter decoding and reconciliation.

mod config;
mod contract;
mod error;
mod manifest;

pub use config::{DesiredState, ModuleParams};
pub use contract::{ModuleContract, ModuleOutcome};
pub use error::{ModuleError, ModuleResult};
pub use manifest::{Capability, Dependency, ModuleManifest, ModuleManifestBuilder, SemVer};
