// Paw Extension Installer — serialized npm installs
//
// Installs extension dependencies by writing package.json and running npm,
// never more than one npm at a time.
//
// Architecture:
//   lock.rs        — FIFO async lock + scope guard
//   manifest.rs    — owner-only package.json writer
//   process.rs     — npm child process, stderr capture, RunOutcome
//   root.rs        — initialize-once installation root
//   coordinator.rs — ExtensionInstaller: lock → manifest → npm → release

pub mod coordinator;
pub mod lock;
pub mod manifest;
pub mod process;
pub mod root;

// Re-export the main public types
pub use coordinator::{install_args, ExtensionInstaller};
pub use lock::{InstallGuard, InstallLock};
pub use manifest::{read_manifest, write_manifest};
pub use process::{NpmCommand, NpmRunner, PackageRunner, RunOutcome};
pub use root::InstallationRoot;
