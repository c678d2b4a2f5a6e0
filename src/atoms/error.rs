// ── Paw Atoms: Error Types ─────────────────────────────────────────────────
// Single canonical error enum for the installer, built with `thiserror`.
//
// Design rules:
//   • One variant per failure kind a caller may want to tell apart
//     (manifest write, spawn, npm exit, bad input, configuration).
//   • `Install` displays the captured npm stderr verbatim so callers can show
//     it to the user unchanged.
//   • `InstallerError` → `String` conversion is provided via `Display` for
//     boundary code that still speaks `Result<T, String>`.

use std::path::PathBuf;
use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InstallerError {
    /// The manifest could not be written (bad path, permissions, disk full).
    #[error("Failed to write manifest {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The package manager could not be started, or waiting on it failed.
    #[error("Failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The package manager ran and exited unsuccessfully.
    /// `code` is `None` when the process was terminated by a signal.
    #[error("{stderr}")]
    Install { code: Option<i32>, stderr: String },

    /// A package identifier that must not be handed to npm.
    #[error("Invalid package spec: {0}")]
    InvalidPackage(String),

    /// Installer configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or OS-level I/O failure outside the manifest write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl InstallerError {
    /// Create a manifest write error for `path`.
    pub fn manifest_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ManifestWrite { path: path.into(), source }
    }

    /// Create a spawn error with program name and reason.
    pub fn spawn(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Spawn { program: program.into(), reason: reason.into() }
    }

    /// Captured stderr of a failed install, if this is one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Install { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// Every install operation returns this type.
pub type InstallResult<T> = Result<T, InstallerError>;

// ── Conversion: InstallerError → String ───────────────────────────────────

impl From<InstallerError> for String {
    fn from(e: InstallerError) -> Self {
        e.to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_error_displays_stderr_verbatim() {
        let err = InstallerError::Install { code: Some(1), stderr: "disk full".into() };
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.stderr(), Some("disk full"));
    }

    #[test]
    fn manifest_write_names_the_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err = InstallerError::manifest_write("/missing/package.json", io);
        let msg = err.to_string();
        assert!(msg.contains("/missing/package.json"));
        assert!(msg.contains("no such directory"));
        assert!(err.stderr().is_none());
    }

    #[test]
    fn converts_into_string() {
        let s: String = InstallerError::spawn("npm", "not found").into();
        assert_eq!(s, "Failed to run npm: not found");
    }
}
