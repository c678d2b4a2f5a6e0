// Paw Extension Installer — install coordinator
//
// Every install goes through `ExtensionInstaller`, which holds the one
// `InstallLock`. The lock is taken before the manifest is touched and kept
// until npm has exited, so two installs never overlap and npm always reads
// the manifest of the call it was started for.
//
// The locked part of an install runs on its own task that owns the guard.
// A caller that stops waiting (timeout, dropped future) detaches from that
// task; the lock stays held until npm has exited.

use super::lock::{InstallGuard, InstallLock};
use super::manifest::write_manifest;
use super::process::{NpmRunner, PackageRunner};
use super::root::InstallationRoot;
use crate::atoms::constants::{MANIFEST_FILE_NAME, NPM_INSTALL_ARGS};
use crate::atoms::error::{InstallResult, InstallerError};
use crate::atoms::types::PackageDescriptor;
use crate::engine::config::InstallerConfig;
use log::{info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The npm argument vector for an install, optionally for a single package.
pub fn install_args(package: Option<&str>) -> Vec<String> {
    NPM_INSTALL_ARGS
        .iter()
        .map(|s| s.to_string())
        .chain(package.map(str::to_string))
        .collect()
}

/// Reject identifiers npm would misread. Anything else is npm's to judge.
fn validate_package_spec(spec: &str) -> InstallResult<()> {
    if spec.trim().is_empty() {
        return Err(InstallerError::InvalidPackage("empty package spec".into()));
    }
    if spec.starts_with('-') {
        return Err(InstallerError::InvalidPackage(format!(
            "'{}' would be read as an npm flag",
            spec
        )));
    }
    Ok(())
}

/// Installs extension dependencies, one npm run at a time.
///
/// Share it behind an `Arc`; all methods take `&self`. Installs are not
/// cancellable and npm runs without a timeout, so a hung npm blocks every
/// queued install behind it. Dropping an install future after it was granted
/// the lock leaves the install running to completion in the background.
///
/// Must be used from within a tokio runtime.
pub struct ExtensionInstaller {
    root: Arc<InstallationRoot>,
    runner: Arc<dyn PackageRunner>,
    lock: InstallLock,
}

impl ExtensionInstaller {
    pub fn new(root: Arc<InstallationRoot>, runner: impl PackageRunner + 'static) -> Self {
        Self { root, runner: Arc::new(runner), lock: InstallLock::new() }
    }

    /// Installer backed by the npm resolved from `config`.
    pub fn from_config(root: Arc<InstallationRoot>, config: &InstallerConfig) -> InstallResult<Self> {
        let runner = NpmRunner::new(config.npm.resolve_command()?).with_env(config.npm.env.clone());
        Ok(Self::new(root, runner))
    }

    /// `<root>/package.json`.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.get().join(MANIFEST_FILE_NAME)
    }

    /// `true` while an install is running.
    pub fn is_busy(&self) -> bool {
        self.lock.is_held()
    }

    /// Installs waiting for the one that is running.
    pub fn queued(&self) -> usize {
        self.lock.queued()
    }

    /// Write `descriptor` to `manifest_path` and run `npm install` in the root.
    pub async fn install_packages(
        &self,
        manifest_path: &Path,
        descriptor: &PackageDescriptor,
    ) -> InstallResult<()> {
        let guard = self.lock.acquire().await;
        let root = self.root.get().to_path_buf();
        let runner = Arc::clone(&self.runner);
        let manifest_path = manifest_path.to_path_buf();
        let descriptor = descriptor.clone();

        self.run_locked(guard, async move {
            write_manifest(&manifest_path, &descriptor).await?;

            info!("[extension-installer] Installing dependencies at {}", root.display());
            npm(runner.as_ref(), &install_args(None), &root).await?;
            info!("[extension-installer] Dependencies installed at {}", root.display());
            Ok(())
        })
        .await
    }

    /// [`install_packages`](Self::install_packages) into `<root>/package.json`.
    pub async fn install_manifest(&self, descriptor: &PackageDescriptor) -> InstallResult<()> {
        let path = self.manifest_path();
        self.install_packages(&path, descriptor).await
    }

    /// Run `npm install <spec>` in the root without touching the manifest.
    pub async fn install_package(&self, spec: &str) -> InstallResult<()> {
        validate_package_spec(spec)?;

        let guard = self.lock.acquire().await;
        let root = self.root.get().to_path_buf();
        let runner = Arc::clone(&self.runner);
        let spec = spec.to_string();

        self.run_locked(guard, async move {
            info!("[extension-installer] Installing package {} to {}", spec, root.display());
            npm(runner.as_ref(), &install_args(Some(&spec)), &root).await?;
            info!("[extension-installer] Package {} installed to {}", spec, root.display());
            Ok(())
        })
        .await
    }

    /// Drive `work` on its own task, releasing `guard` only once it is done.
    /// A panic inside `work` is re-raised in the caller.
    async fn run_locked<F>(&self, guard: InstallGuard, work: F) -> InstallResult<()>
    where
        F: Future<Output = InstallResult<()>> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let _guard = guard;
            work.await
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(InstallerError::spawn(
                self.runner.program(),
                format!("install task stopped: {}", e),
            )),
        }
    }
}

async fn npm(runner: &dyn PackageRunner, args: &[String], cwd: &Path) -> InstallResult<()> {
    let program = runner.program();
    let result = runner.run(args, cwd).await.into_result(&program);
    if let Err(ref e) = result {
        warn!("[extension-installer] npm {} failed: {}", args.join(" "), e);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────
