//! Intermediate certificate cache
//!
//! The CA intermediate is downloaded once into `pem/<file>`, where `<file>`
//! is the last path segment of the source URL. An existing file is always
//! reused; there is no expiry or revalidation.

use super::error::{PkiError, PkiResult};
use super::layout::{validate_file_name, CertificateLayout};
use super::storage::write_artifact;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Default intermediate certificate location
pub const DEFAULT_INTERMEDIATE_URL: &str =
    "https://letsencrypt.org/certs/lets-encrypt-x3-cross-signed.pem";

/// Where intermediate certificates come from
#[async_trait]
pub trait IntermediateSource: Send + Sync + std::fmt::Debug {
    /// Retrieve the document at `url`
    async fn fetch(&self, url: &str) -> PkiResult<Vec<u8>>;
}

/// Plain HTTPS GET source
#[derive(Debug, Clone)]
pub struct HttpIntermediateSource {
    client: Client,
    timeout: Duration,
}

impl HttpIntermediateSource {
    /// Create a source whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> PkiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("r0n-provision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PkiError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl IntermediateSource for HttpIntermediateSource {
    async fn fetch(&self, url: &str) -> PkiResult<Vec<u8>> {
        let network = |e: reqwest::Error| PkiError::Network {
            url: url.to_string(),
            message: if e.is_timeout() {
                format!("timed out after {:?}", self.timeout)
            } else {
                e.to_string()
            },
        };

        debug!(url, "Fetching intermediate certificate");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;
        let body = response.bytes().await.map_err(network)?;

        if body.is_empty() {
            return Err(PkiError::Network {
                url: url.to_string(),
                message: "empty response body".to_string(),
            });
        }
        Ok(body.to_vec())
    }
}

/// File name the intermediate is cached under
pub fn intermediate_file_name(url: &str) -> PkiResult<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    validate_file_name("intermediate_url", file)
        .map_err(|_| PkiError::invalid("intermediate_url", format!("'{url}' has no file name")))?;
    Ok(file.to_string())
}

/// State of the cache after [`ensure_intermediate_cached`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIntermediate {
    /// Location of the cached certificate
    pub path: PathBuf,
    /// Whether it was downloaded during this call
    pub fetched: bool,
}

/// Download the intermediate into `pem/` unless it is already there
pub async fn ensure_intermediate_cached(
    source: &dyn IntermediateSource,
    url: &str,
    layout: &CertificateLayout,
) -> PkiResult<CachedIntermediate> {
    let path = layout.pem(&intermediate_file_name(url)?);
    if path.exists() {
        debug!(path = %path.display(), "Intermediate certificate already cached");
        return Ok(CachedIntermediate {
            path,
            fetched: false,
        });
    }

    let body = source.fetch(url).await?;
    write_artifact(&path, &body, None)?;
    info!(url, path = %path.display(), bytes = body.len(), "Cached intermediate certificate");

    Ok(CachedIntermediate {
        path,
        fetched: true,
    })
}
