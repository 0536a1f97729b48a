//! External domain-validation helper
//!
//! The ACME exchange itself is delegated to a helper program (acme-tiny by
//! default). It receives the account key, the CSR and the challenge
//! directory, and prints the signed certificate on stdout.

use super::error::{PkiError, PkiResult};
use async_trait::async_trait;
use openssl::x509::X509;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Default helper program
pub const DEFAULT_HELPER: &str = "acme-tiny";

/// Inputs handed to the helper
#[derive(Debug, Clone, Copy)]
pub struct SigningInputs<'a> {
    /// Account key used to authenticate with the CA
    pub account_key: &'a Path,
    /// Request to be signed
    pub csr: &'a Path,
    /// Directory the helper publishes challenge responses into
    pub challenge_dir: &'a Path,
}

/// Something that turns a CSR into a signed certificate
#[async_trait]
pub trait SigningHelper: Send + Sync + std::fmt::Debug {
    /// Name used in logs and errors
    fn name(&self) -> String;

    /// Run the signing exchange and return the certificate PEM
    async fn sign(&self, inputs: SigningInputs<'_>) -> PkiResult<Vec<u8>>;
}

/// Helper run as a child process, without a shell
#[derive(Debug, Clone)]
pub struct ProcessSigningHelper {
    program: PathBuf,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl ProcessSigningHelper {
    /// Create a helper running `program`
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout,
        }
    }

    /// Append arguments after the standard ones
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Argument vector passed to the program
    pub fn arguments(&self, inputs: SigningInputs<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--account-key".into(),
            inputs.account_key.into(),
            "--csr".into(),
            inputs.csr.into(),
            "--acme-dir".into(),
            inputs.challenge_dir.into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn failure(&self, message: impl Into<String>) -> PkiError {
        PkiError::Signing {
            program: self.name(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl SigningHelper for ProcessSigningHelper {
    fn name(&self) -> String {
        self.program.display().to_string()
    }

    async fn sign(&self, inputs: SigningInputs<'_>) -> PkiResult<Vec<u8>> {
        let args = self.arguments(inputs);
        debug!(program = %self.program.display(), ?args, "Starting signing helper");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.failure(format!("failed to start: {e}")))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| self.failure(format!("failed to collect output: {e}")))?,
            Err(_) => {
                warn!(program = %self.program.display(), timeout = ?self.timeout, "Signing helper timed out");
                return Err(self.failure(format!("timed out after {:?}", self.timeout)));
            },
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(self.failure(format!("{}: {}", output.status, stderr.trim())));
        }
        if !stderr.trim().is_empty() {
            debug!(program = %self.program.display(), stderr = %stderr.trim(), "Signing helper diagnostics");
        }

        info!(program = %self.program.display(), bytes = output.stdout.len(), "Signing helper finished");
        Ok(output.stdout)
    }
}

/// Reject helper output that does not parse as PEM certificates.
///
/// Returns the number of certificates found.
pub fn validate_signed_certificate(helper: &str, output: &[u8]) -> PkiResult<usize> {
    let failure = |message: String| PkiError::Signing {
        program: helper.to_string(),
        message,
    };

    if output.iter().all(u8::is_ascii_whitespace) {
        return Err(failure("helper produced no output".to_string()));
    }
    let certs = X509::stack_from_pem(output)
        .map_err(|e| failure(format!("output is not a valid PEM certificate: {e}")))?;
    if certs.is_empty() {
        return Err(failure("output does not contain a PEM certificate".to_string()));
    }
    Ok(certs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::modules::self_signed_pem;

    #[test]
    fn test_arguments() {
        let helper = ProcessSigningHelper::new("acme-tiny", Duration::from_secs(1))
            .with_extra_args(vec!["--disable-check".to_string()]);
        let args = helper.arguments(SigningInputs {
            account_key: Path::new("/pki/private/account.key"),
            csr: Path::new("/pki/csr/example.com.csr"),
            challenge_dir: Path::new("/pki/challenges/example.com"),
        });
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--account-key",
                "/pki/private/account.key",
                "--csr",
                "/pki/csr/example.com.csr",
                "--acme-dir",
                "/pki/challenges/example.com",
                "--disable-check",
            ]
        );
    }

    #[test]
    fn test_validate_output() {
        let cert = self_signed_pem("example.com");
        assert_eq!(validate_signed_certificate("h", &cert).unwrap(), 1);

        let mut chain = cert.clone();
        chain.extend_from_slice(&self_signed_pem("intermediate.example"));
        assert_eq!(validate_signed_certificate("h", &chain).unwrap(), 2);

        assert!(validate_signed_certificate("h", b"").is_err());
        assert!(validate_signed_certificate("h", b" \n").is_err());
        assert!(validate_signed_certificate("h", b"error: challenge failed").is_err());
        assert!(validate_signed_certificate("h", &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage_between_markers() {
        let output = b"-----BEGIN CERTIFICATE-----\nnot base64 !!!\n-----END CERTIFICATE-----\n";
        let err = validate_signed_certificate("h", output).unwrap_err();
        assert!(matches!(err, PkiError::Signing { .. }));
        assert!(err.to_string().contains("not a valid PEM certificate"));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let helper = ProcessSigningHelper::new(
            "/nonexistent/r0n/acme-helper",
            Duration::from_secs(5),
        );
        let err = helper
            .sign(SigningInputs {
                account_key: Path::new("a"),
                csr: Path::new("b"),
                challenge_dir: Path::new("c"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PkiError::Signing { .. }));
        assert!(err.to_string().contains("failed to start"));
    }
}
