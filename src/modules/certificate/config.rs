//! Certificate parameters

use crate::module::DesiredState;
use crate::modules::pki::{
    CertResult, CertificateRequest, KeyAlgorithm, Subject, DEFAULT_DIGEST,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Parameter names accepted by the certificate unit
pub const PARAMETERS: [&str; 15] = [
    "state",
    "name",
    "account_key",
    "directory",
    "size",
    "type",
    "algo",
    "subjectAltName",
    "countryName",
    "stateOrProvinceName",
    "localityName",
    "organizationName",
    "organizationalUnitName",
    "commonName",
    "emailAddress",
];

fn default_size() -> u32 {
    4096
}

fn default_algo() -> String {
    DEFAULT_DIGEST.to_string()
}

/// Certificate parameter record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateParams {
    /// Whether the certificate should exist
    #[serde(default)]
    pub state: DesiredState,

    /// Certificate name, used for every per-name artifact
    pub name: String,

    /// Account key file under `private/`, or an absolute path
    pub account_key: String,

    /// Root holding `private/`, `csr/`, `pem/`, `challenges/` and `certs/`
    pub directory: PathBuf,

    /// Leaf key size in bits
    #[serde(default = "default_size")]
    pub size: u32,

    /// Leaf key algorithm
    #[serde(default, rename = "type")]
    pub key_type: KeyAlgorithm,

    /// Signature digest
    #[serde(default = "default_algo")]
    pub algo: String,

    /// DNS names for the subjectAltName extension
    #[serde(
        default,
        rename = "subjectAltName",
        deserialize_with = "alt_names",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub subject_alt_name: Vec<String>,

    /// C
    #[serde(default, rename = "countryName", alias = "C")]
    pub country_name: Option<String>,

    /// ST
    #[serde(default, rename = "stateOrProvinceName", alias = "ST")]
    pub state_or_province_name: Option<String>,

    /// L
    #[serde(default, rename = "localityName", alias = "L")]
    pub locality_name: Option<String>,

    /// O
    #[serde(default, rename = "organizationName", alias = "O")]
    pub organization_name: Option<String>,

    /// OU
    #[serde(default, rename = "organizationalUnitName", alias = "OU")]
    pub organizational_unit_name: Option<String>,

    /// CN; defaults to `name`
    #[serde(default, rename = "commonName", alias = "CN")]
    pub common_name: Option<String>,

    /// emailAddress
    #[serde(default, rename = "emailAddress")]
    pub email_address: Option<String>,
}

impl CertificateParams {
    /// Create parameters with defaults for everything optional
    pub fn new(
        name: impl Into<String>,
        account_key: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: DesiredState::Present,
            name: name.into(),
            account_key: account_key.into(),
            directory: directory.into(),
            size: default_size(),
            key_type: KeyAlgorithm::Rsa,
            algo: default_algo(),
            subject_alt_name: Vec::new(),
            country_name: None,
            state_or_province_name: None,
            locality_name: None,
            organization_name: None,
            organizational_unit_name: None,
            common_name: None,
            email_address: None,
        }
    }

    /// Subject fields as given
    pub fn subject(&self) -> Subject {
        Subject {
            country: self.country_name.clone(),
            state: self.state_or_province_name.clone(),
            locality: self.locality_name.clone(),
            organization: self.organization_name.clone(),
            organizational_unit: self.organizational_unit_name.clone(),
            common_name: self.common_name.clone(),
            email: self.email_address.clone(),
        }
    }

    /// Equivalent certificate request
    pub fn certificate_request(&self) -> CertificateRequest {
        let mut request =
            CertificateRequest::new(&self.name, &self.directory, &self.account_key)
                .with_algorithm(self.key_type, self.size)
                .with_subject(self.subject());
        request.digest = self.algo.clone();
        request.alt_names = self.subject_alt_name.clone();
        request
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AltNames {
    Joined(String),
    List(Vec<String>),
}

/// Accepts `"DNS:a.example,DNS:b.example"` or a list of names.
fn alt_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let names = match Option::<AltNames>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(AltNames::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        Some(AltNames::List(list)) => list,
    };
    Ok(names
        .iter()
        .map(|name| name.trim())
        .map(|name| name.strip_prefix("DNS:").unwrap_or(name).trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Result record of the certificate unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRecord {
    /// Whether anything on disk changed
    pub changed: bool,
    /// Leaf private key
    pub privatekey: PathBuf,
    /// Signing request
    pub csr: PathBuf,
    /// Signed leaf certificate
    pub certificate: PathBuf,
    /// Leaf followed by the intermediate
    pub chain: PathBuf,
}

impl From<CertResult> for CertificateRecord {
    fn from(result: CertResult) -> Self {
        Self {
            changed: result.changed,
            privatekey: result.private_key,
            csr: result.csr,
            certificate: result.certificate,
            chain: result.chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleParams;

    fn base() -> ModuleParams {
        ModuleParams::new()
            .with("name", "example.com")
            .with("account_key", "account.key")
            .with("directory", "/etc/pki")
    }

    #[test]
    fn test_defaults() {
        let params: CertificateParams = base().parse().unwrap();
        assert_eq!(
            params,
            CertificateParams::new("example.com", "account.key", "/etc/pki")
        );

        let request = params.certificate_request();
        assert_eq!(request.digest, "sha256");
        assert_eq!(request.bits, 4096);
        assert_eq!(
            request.effective_subject(),
            Subject::common_name("example.com")
        );
    }

    #[test]
    fn test_subject_aliases() {
        let params: CertificateParams = base()
            .with("C", "FR")
            .with("ST", "Ile-de-France")
            .with("L", "Paris")
            .with("O", "R0N")
            .with("OU", "Ops")
            .with("CN", "www.example.com")
            .with("emailAddress", "ops@example.com")
            .parse()
            .unwrap();

        let subject = params.subject();
        assert_eq!(subject.country.as_deref(), Some("FR"));
        assert_eq!(subject.state.as_deref(), Some("Ile-de-France"));
        assert_eq!(subject.locality.as_deref(), Some("Paris"));
        assert_eq!(subject.organizational_unit.as_deref(), Some("Ops"));
        assert_eq!(subject.common_name.as_deref(), Some("www.example.com"));
        assert_eq!(subject.email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_long_subject_names() {
        let params: CertificateParams = base()
            .with("countryName", "DE")
            .with("organizationName", "Example")
            .parse()
            .unwrap();
        assert_eq!(params.country_name.as_deref(), Some("DE"));
        assert_eq!(params.organization_name.as_deref(), Some("Example"));
    }

    #[test]
    fn test_alt_names_string_and_list() {
        let joined: CertificateParams = base()
            .with("subjectAltName", "DNS:example.com, DNS:www.example.com")
            .parse()
            .unwrap();
        assert_eq!(
            joined.subject_alt_name,
            vec!["example.com", "www.example.com"]
        );

        let list: CertificateParams = base()
            .with(
                "subjectAltName",
                serde_json::json!(["example.com", "api.example.com"]),
            )
            .parse()
            .unwrap();
        assert_eq!(list.subject_alt_name, vec!["example.com", "api.example.com"]);

        let null: CertificateParams = base()
            .with("subjectAltName", serde_json::Value::Null)
            .parse()
            .unwrap();
        assert!(null.subject_alt_name.is_empty());
    }

    #[test]
    fn test_non_dns_alt_name_is_rejected() {
        let params: CertificateParams = base()
            .with("subjectAltName", "DNS:example.com,IP:10.0.0.1")
            .parse()
            .unwrap();
        assert_eq!(params.subject_alt_name, vec!["example.com", "IP:10.0.0.1"]);

        let err = params.certificate_request().validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("IP:10.0.0.1"));
    }

    #[test]
    fn test_unknown_parameter() {
        assert!(base().with("SAN", "x").parse::<CertificateParams>().is_err());
    }

    #[test]
    fn test_record_from_result() {
        let record = CertificateRecord::from(CertResult {
            changed: true,
            private_key: PathBuf::from("/pki/private/a.pem"),
            csr: PathBuf::from("/pki/csr/a.csr"),
            certificate: PathBuf::from("/pki/certs/a.crt"),
            chain: PathBuf::from("/pki/pem/a.pem"),
            intermediate_fetched: false,
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["privatekey"], "/pki/private/a.pem");
        assert_eq!(json["chain"], "/pki/pem/a.pem");
    }
}
