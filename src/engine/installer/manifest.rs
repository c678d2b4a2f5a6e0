// Paw Extension Installer — package.json writer
//
// Writes the descriptor npm will read, owner-only, and only returns once the
// bytes are on disk.

#[cfg(unix)]
use crate::atoms::constants::MANIFEST_MODE;
use crate::atoms::error::{InstallResult, InstallerError};
use crate::atoms::types::PackageDescriptor;
use log::debug;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Serialize `descriptor` as two-space-indented JSON and write it to `path`,
/// creating or truncating the file with mode `0o600`.
pub async fn write_manifest(path: &Path, descriptor: &PackageDescriptor) -> InstallResult<()> {
    let body = serde_json::to_string_pretty(descriptor)?;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(MANIFEST_MODE);

    let mut file = options
        .open(path)
        .await
        .map_err(|e| InstallerError::manifest_write(path, e))?;
    file.write_all(body.as_bytes())
        .await
        .map_err(|e| InstallerError::manifest_write(path, e))?;
    file.flush()
        .await
        .map_err(|e| InstallerError::manifest_write(path, e))?;

    // `mode` only applies on creation; tighten a pre-existing file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(MANIFEST_MODE))
            .await
            .map_err(|e| InstallerError::manifest_write(path, e))?;
    }

    debug!("[extension-installer] Wrote manifest {} ({} bytes)", path.display(), body.len());
    Ok(())
}

/// Parse a manifest back into a descriptor.
pub async fn read_manifest(path: &Path) -> InstallResult<PackageDescriptor> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

// ── Tests ──────────────────────────────────────────────────────────────────
