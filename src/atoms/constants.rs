// ── Paw Atoms: Constants ───────────────────────────────────────────────────
// All named constants for the crate live here.

// ── npm invocation ─────────────────────────────────────────────────────────
// Every install runs with exactly this flag set, in this order. A single
// package spec, when given, is appended after the last flag.
pub const NPM_INSTALL_ARGS: [&str; 5] = [
    "install",
    "--audit=false",
    "--fund=false",
    "--only=prod",
    "--prefer-offline",
];

/// Executable names probed on `PATH` when no npm path is configured.
#[cfg(windows)]
pub(crate) const NPM_EXECUTABLE_NAMES: &[&str] = &["npm.cmd", "npm.exe", "npm"];
#[cfg(not(windows))]
pub(crate) const NPM_EXECUTABLE_NAMES: &[&str] = &["npm"];

// ── Manifest ───────────────────────────────────────────────────────────────
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Owner read/write only (`rw-------`). npm reads the manifest as the same user.
pub const MANIFEST_MODE: u32 = 0o600;

// ── Filesystem layout ──────────────────────────────────────────────────────
// ~/.paw/extensions.toml    — installer config
// ~/.paw/extensions/        — default installation root
pub(crate) const PAW_DIR_NAME: &str = ".paw";
pub(crate) const CONFIG_FILE_NAME: &str = "extensions.toml";
pub(crate) const DEFAULT_ROOT_DIR_NAME: &str = "extensions";

/// Bundled Node.js runtime lives under `<data_dir>/paw/node/`.
pub(crate) const BUNDLED_RUNTIME_DIR: &str = "paw";
