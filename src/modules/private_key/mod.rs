//! Private key unit
//!
//! General-purpose counterpart of the account key unit: same key handling,
//! with `path`/`force` parameters and a directory check for both states.

mod config;
mod handler;

pub use config::{PrivateKeyParams, PrivateKeyRecord, PARAMETERS};
pub use handler::PrivateKeyHandler;
