//! # Provisioning Units
//!
//! This module contains the built-in units of R0N Provision. Each unit
//! implements the [`ModuleContract`] trait so the CLI can run it from a
//! flat parameter record.
//!
//! ## Available Units
//!
//! - [`account_key`] - ACME account key generation and removal
//! - [`private_key`] - General-purpose private key generation and removal
//! - [`certificate`] - Leaf certificate issuance through an external helper
//!
//! The units share the [`pki`] manager, which owns key generation, CSR
//! construction, the intermediate cache and the helper invocation.
//!
//! [`ModuleContract`]: crate::module::ModuleContract

pub mod account_key;
pub mod certificate;
pub mod pki;
pub mod private_key;

use crate::config::PkiConfig;
use crate::module::ModuleContract;
use account_key::AccountKeyHandler;
use certificate::CertificateHandler;
use pki::{HttpIntermediateSource, PkiManager, PkiResult, ProcessSigningHelper};
use private_key::PrivateKeyHandler;
use std::sync::Arc;

/// Build a manager from runtime settings
pub fn build_manager(config: &PkiConfig) -> PkiResult<PkiManager> {
    let source = HttpIntermediateSource::new(config.fetch_timeout())?;
    let signer = ProcessSigningHelper::new(&config.helper_program, config.signing_timeout())
        .with_extra_args(config.helper_args.clone());

    Ok(PkiManager::new(Arc::new(source), Arc::new(signer))
        .with_intermediate_url(&config.intermediate_url)
        .with_key_file_mode(Some(config.key_file_mode)))
}

/// Every unit, in dependency order
pub fn units(manager: Arc<PkiManager>) -> Vec<Box<dyn ModuleContract>> {
    vec![
        Box::new(AccountKeyHandler::new(manager.clone())),
        Box::new(PrivateKeyHandler::new(manager.clone())),
        Box::new(CertificateHandler::new(manager)),
    ]
}

/// Look up a unit by manifest name
pub fn unit(name: &str, manager: Arc<PkiManager>) -> Option<Box<dyn ModuleContract>> {
    units(manager)
        .into_iter()
        .find(|unit| unit.manifest().name == name)
}

#[cfg(test)]
pub(crate) fn test_manager() -> Arc<PkiManager> {
    use async_trait::async_trait;
    use pki::{IntermediateSource, SigningHelper, SigningInputs};

    #[derive(Debug)]
    struct StaticIntermediate;

    #[async_trait]
    impl IntermediateSource for StaticIntermediate {
        async fn fetch(&self, _url: &str) -> PkiResult<Vec<u8>> {
            Ok(b"INTERMEDIATE".to_vec())
        }
    }

    #[derive(Debug)]
    struct FixedSigner;

    #[async_trait]
    impl SigningHelper for FixedSigner {
        fn name(&self) -> String {
            "fixed".to_string()
        }

        async fn sign(&self, _inputs: SigningInputs<'_>) -> PkiResult<Vec<u8>> {
            Ok(self_signed_pem("fixed.example"))
        }
    }

    Arc::new(PkiManager::new(
        Arc::new(StaticIntermediate),
        Arc::new(FixedSigner),
    ))
}

/// Self-signed certificate PEM for `common_name`
#[cfg(test)]
pub(crate) fn self_signed_pem(common_name: &str) -> Vec<u8> {
    use openssl::asn1::Asn1Time;
    use openssl::bn::{BigNum, MsbOption};
    use openssl::hash::MessageDigest;
    use openssl::x509::{X509Builder, X509NameBuilder};

    let key = pki::generate_private_key(pki::KeyAlgorithm::Rsa, 1024).unwrap();
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(30).unwrap())
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    builder.build().to_pem().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_names() {
        let names: Vec<String> = units(test_manager())
            .iter()
            .map(|unit| unit.manifest().name)
            .collect();
        assert_eq!(names, vec!["account-key", "private-key", "certificate"]);
    }

    #[test]
    fn test_unit_lookup() {
        assert!(unit("certificate", test_manager()).is_some());
        assert!(unit("le_cert", test_manager()).is_none());
    }

    #[test]
    fn test_build_manager_from_defaults() {
        let manager = build_manager(&PkiConfig::default()).unwrap();
        assert_eq!(manager.intermediate_url(), pki::DEFAULT_INTERMEDIATE_URL);
    }
}
