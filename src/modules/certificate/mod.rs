//! Certificate unit
//!
//! Generates a fresh leaf key and CSR, has the validation helper obtain a
//! signed certificate, and writes the leaf-plus-intermediate chain. Every
//! successful run reports a change.

mod config;
mod handler;

pub use config::{CertificateParams, CertificateRecord, PARAMETERS};
pub use handler::CertificateHandler;
