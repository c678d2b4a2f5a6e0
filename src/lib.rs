// Paw Extension Installer
//
// Installs third-party extension dependencies with npm, strictly one install
// at a time per process.
//
//   atoms/  — constants, data types, errors (no I/O)
//   engine/ — config loading and the installer itself

pub mod atoms;
pub mod engine;

pub use atoms::error::{InstallResult, InstallerError};
pub use atoms::types::PackageDescriptor;
pub use engine::config::{InstallerConfig, NpmConfig};
pub use engine::installer::{
    ExtensionInstaller, InstallationRoot, NpmCommand, NpmRunner, PackageRunner, RunOutcome,
};
