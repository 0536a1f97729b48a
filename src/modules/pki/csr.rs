//! Certificate signing request construction

use super::error::{PkiError, PkiResult};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKeyRef, Private};
use openssl::stack::Stack;
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509Name, X509NameBuilder, X509Req, X509ReqBuilder};

/// Version written into every request.
///
/// PKCS#10 defines a single version (v1, encoded as 0); current OpenSSL
/// releases reject anything else.
pub const CSR_VERSION: i32 = 0;

/// Default signature digest
pub const DEFAULT_DIGEST: &str = "sha256";

/// Distinguished name fields of a request.
///
/// Only the fields that are set end up in the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    /// C
    pub country: Option<String>,
    /// ST
    pub state: Option<String>,
    /// L
    pub locality: Option<String>,
    /// O
    pub organization: Option<String>,
    /// OU
    pub organizational_unit: Option<String>,
    /// CN
    pub common_name: Option<String>,
    /// emailAddress
    pub email: Option<String>,
}

impl Subject {
    /// Subject with only a common name
    pub fn common_name(cn: impl Into<String>) -> Self {
        Self {
            common_name: Some(cn.into()),
            ..Default::default()
        }
    }

    /// Fill in the common name when none was given
    pub fn with_default_common_name(mut self, fallback: &str) -> Self {
        if self.common_name.is_none() {
            self.common_name = Some(fallback.to_string());
        }
        self
    }

    fn entries(&self) -> [(Nid, &'static str, Option<&str>); 7] {
        [
            (Nid::COUNTRYNAME, "countryName", self.country.as_deref()),
            (
                Nid::STATEORPROVINCENAME,
                "stateOrProvinceName",
                self.state.as_deref(),
            ),
            (Nid::LOCALITYNAME, "localityName", self.locality.as_deref()),
            (
                Nid::ORGANIZATIONNAME,
                "organizationName",
                self.organization.as_deref(),
            ),
            (
                Nid::ORGANIZATIONALUNITNAME,
                "organizationalUnitName",
                self.organizational_unit.as_deref(),
            ),
            (Nid::COMMONNAME, "commonName", self.common_name.as_deref()),
            (
                Nid::PKCS9_EMAILADDRESS,
                "emailAddress",
                self.email.as_deref(),
            ),
        ]
    }

    /// Check field values before building anything
    pub fn validate(&self) -> PkiResult<()> {
        if let Some(country) = &self.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(PkiError::invalid(
                    "countryName",
                    format!("'{country}' is not a two-letter country code"),
                ));
            }
        }
        for (_, field, value) in self.entries() {
            if value.is_some_and(str::is_empty) {
                return Err(PkiError::invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Build the X.509 name
    pub fn to_x509_name(&self) -> PkiResult<X509Name> {
        self.validate()?;
        let mut builder = X509NameBuilder::new().map_err(csr_error)?;
        for (nid, field, value) in self.entries() {
            if let Some(value) = value {
                builder
                    .append_entry_by_nid(nid, value)
                    .map_err(|e| PkiError::invalid(field, e.to_string()))?;
            }
        }
        Ok(builder.build())
    }
}

/// Look up a digest by its OpenSSL name (`sha256`, `sha384`, ...)
pub fn digest_by_name(name: &str) -> PkiResult<MessageDigest> {
    MessageDigest::from_name(name).ok_or_else(|| PkiError::UnsupportedDigest(name.to_string()))
}

/// Build and sign a request for `key`.
///
/// `alt_names` become a subjectAltName extension of DNS entries when not
/// empty.
pub fn build_signing_request(
    key: &PKeyRef<Private>,
    subject: &Subject,
    alt_names: &[String],
    digest: MessageDigest,
) -> PkiResult<X509Req> {
    let name = subject.to_x509_name()?;

    let mut builder = X509ReqBuilder::new().map_err(csr_error)?;
    builder.set_version(CSR_VERSION).map_err(csr_error)?;
    builder.set_subject_name(&name).map_err(csr_error)?;
    builder.set_pubkey(key).map_err(csr_error)?;

    if !alt_names.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for dns in alt_names {
            san.dns(dns);
        }
        let ctx = builder.x509v3_context(None);
        let san = san
            .build(&ctx)
            .map_err(|e| PkiError::invalid("subjectAltName", e.to_string()))?;
        let mut extensions = Stack::new().map_err(csr_error)?;
        extensions.push(san).map_err(csr_error)?;
        builder.add_extensions(&extensions).map_err(csr_error)?;
    }

    builder.sign(key, digest).map_err(csr_error)?;
    Ok(builder.build())
}

fn csr_error(err: openssl::error::ErrorStack) -> PkiError {
    PkiError::SigningRequest(err.to_string())
}
