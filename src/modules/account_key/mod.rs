//! Account key unit
//!
//! Keeps the private key used to register with the certificate authority
//! present (or absent) in an existing directory. An existing key is only
//! regenerated when `replace` is set.

mod config;
mod handler;

pub use config::{AccountKeyParams, KeyRecord, PARAMETERS};
pub use handler::AccountKeyHandler;
