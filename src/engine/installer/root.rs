// Paw Extension Installer — installation root
//
// The directory npm runs in. Set once by whoever wires the installer up, read
// on every install. Reading it before it was set is a wiring bug.

use crate::atoms::error::{InstallResult, InstallerError};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Initialize-once holder for the absolute installation root directory.
#[derive(Debug, Default)]
pub struct InstallationRoot {
    dir: OnceLock<PathBuf>,
}

impl InstallationRoot {
    /// An uninitialized root.
    pub const fn new() -> Self {
        Self { dir: OnceLock::new() }
    }

    /// A root that is already set to `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> InstallResult<Self> {
        let root = Self::new();
        root.init(dir)?;
        Ok(root)
    }

    /// Set the root. Fails on a relative path or a second call.
    pub fn init(&self, dir: impl Into<PathBuf>) -> InstallResult<()> {
        let dir = dir.into();
        if !dir.is_absolute() {
            return Err(InstallerError::Config(format!(
                "Installation root must be absolute, got {}",
                dir.display()
            )));
        }
        self.dir.set(dir).map_err(|rejected| {
            InstallerError::Config(format!(
                "Installation root already initialized; refusing {}",
                rejected.display()
            ))
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.dir.get().is_some()
    }

    pub fn try_get(&self) -> Option<&Path> {
        self.dir.get().map(PathBuf::as_path)
    }

    /// The root directory.
    ///
    /// # Panics
    ///
    /// If [`init`](Self::init) was never called.
    pub fn get(&self) -> &Path {
        match self.try_get() {
            Some(dir) => dir,
            None => panic!("installation root read before it was initialized"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_get() {
        let dir = std::env::temp_dir().join("paw-ext-root");
        let root = InstallationRoot::new();
        assert!(!root.is_initialized());
        root.init(&dir).unwrap();
        assert_eq!(root.get(), dir.as_path());
    }

    #[test]
    fn second_init_is_rejected() {
        let root = InstallationRoot::with_dir(std::env::temp_dir()).unwrap();
        let err = root.init(std::env::temp_dir().join("other")).unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
        assert_eq!(root.get(), std::env::temp_dir().as_path());
    }

    #[test]
    fn relative_path_is_rejected() {
        let root = InstallationRoot::new();
        assert!(root.init("relative/extensions").is_err());
        assert!(!root.is_initialized());
    }

    #[test]
    #[should_panic(expected = "before it was initialized")]
    fn get_before_init_panics() {
        InstallationRoot::new().get();
    }
}
