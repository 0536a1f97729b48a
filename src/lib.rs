//! # R0N Provision
//!
//! Idempotent provisioning of private keys and CA-signed certificates for
//! configuration-management runs.
//!
//! ## Features
//!
//! - RSA and DSA private key generation with `present`/`absent` semantics
//! - Certificate signing requests with optional subjectAltName
//! - Intermediate certificate download, cached on disk
//! - Domain validation delegated to an external helper (acme-tiny)
//! - Leaf-plus-intermediate chain files
//!
//! ## Architecture
//!
//! Each provisioning unit implements the [`module::ModuleContract`] trait:
//! it decodes a flat parameter record, reconciles the filesystem and
//! reports what changed. The units share a [`modules::pki::PkiManager`]
//! built from the runtime [`config`].

pub mod config;
pub mod module;
pub mod modules;
