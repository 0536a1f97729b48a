//! Artifact storage on the local filesystem

use super::error::{PkiError, PkiResult};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Write `contents` to `path`, replacing any previous file.
///
/// Data goes to a sibling temporary file first and is renamed into place,
/// so a failed write leaves the previous artifact intact. When `mode` is
/// set the staging file is created with it (Unix only).
pub fn write_artifact(path: &Path, contents: &[u8], mode: Option<u32>) -> PkiResult<()> {
    let staged = stage_artifact(path, contents, mode)?;
    staged
        .persist(path)
        .map_err(|e| PkiError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}

fn stage_artifact(path: &Path, contents: &[u8], mode: Option<u32>) -> PkiResult<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");

    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(mode.unwrap_or(0o666)));
    }

    let mut staged = builder.tempfile_in(dir).map_err(|e| PkiError::io(path, e))?;
    staged
        .write_all(contents)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| PkiError::io(path, e))?;

    // The creation mode was masked by the umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(mode))
                .map_err(|e| PkiError::io(path, e))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(staged)
}

/// Remove the file at `path`.
///
/// Returns `true` if a file was deleted and `false` if nothing was there.
/// Every other failure is propagated.
pub fn remove_artifact(path: &Path) -> PkiResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed artifact");
            Ok(true)
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PkiError::io(path, e)),
    }
}

/// Create the directory at `path` if it is missing.
///
/// Returns `true` when the directory was created. The parent must exist.
pub fn ensure_directory(path: &Path) -> PkiResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(false),
        Err(e) => Err(PkiError::io(path, e)),
    }
}

/// Read a whole artifact into memory
pub fn read_artifact(path: &Path) -> PkiResult<Vec<u8>> {
    fs::read(path).map_err(|e| PkiError::io(path, e))
}

/// Fail with [`PkiError::DirectoryNotFound`] unless `path` is a directory
pub fn require_directory(path: &Path) -> PkiResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PkiError::DirectoryNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.pem");

        write_artifact(&path, b"first", None).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write_artifact(&path, b"second", None).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        // No staging files left behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("key.pem");
        write_artifact(&path, b"secret", Some(0o600)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_staging_file_is_private_before_rename() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("key.pem");
        let staged = stage_artifact(&path, b"secret", Some(0o600)).unwrap();

        let mode = staged.as_file().metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(staged.path().starts_with(dir.path()));
        assert!(!path.exists());
    }

    #[test]
    fn test_dropped_staging_file_is_removed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cert.crt");
        drop(stage_artifact(&path, b"pem", None).unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("key.pem");
        let err = write_artifact(&path, b"x", None).unwrap_err();
        assert!(matches!(err, PkiError::Io { .. }));
    }

    #[test]
    fn test_remove_missing_is_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nothing");
        assert!(!remove_artifact(&path).unwrap());

        fs::write(&path, b"x").unwrap();
        assert!(remove_artifact(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_directory_propagates() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        assert!(remove_artifact(&sub).is_err());
    }

    #[test]
    fn test_ensure_directory() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("challenges");
        assert!(ensure_directory(&sub).unwrap());
        assert!(!ensure_directory(&sub).unwrap());
        assert!(sub.is_dir());
    }

    #[test]
    fn test_require_directory() {
        let dir = tempdir().unwrap();
        assert!(require_directory(dir.path()).is_ok());
        let err = require_directory(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PkiError::DirectoryNotFound(_)));
    }
}
