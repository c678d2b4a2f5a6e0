// Paw Extension Installer — Configuration
//
// Loads `~/.paw/extensions.toml` and resolves which npm to launch.
// A missing config file is not an error; every field has a default.

use crate::atoms::constants::{
    BUNDLED_RUNTIME_DIR, CONFIG_FILE_NAME, DEFAULT_ROOT_DIR_NAME, NPM_EXECUTABLE_NAMES,
    PAW_DIR_NAME,
};
use crate::atoms::error::{InstallResult, InstallerError};
use crate::engine::installer::process::NpmCommand;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ── Types ──────────────────────────────────────────────────────────────

/// Top-level installer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Installation root (default: `~/.paw/extensions`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// How to launch npm
    pub npm: NpmConfig,
}

/// npm launch settings. Resolution order: `program`, then `node` +
/// `cli_script`, then the bundled runtime, then `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpmConfig {
    /// Explicit npm executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
    /// Node.js binary used to run `cli_script` (default: `node` on `PATH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<PathBuf>,
    /// npm's CLI entry point, e.g. `.../node_modules/npm/bin/npm-cli.js`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_script: Option<PathBuf>,
    /// The child's entire environment. Nothing else is inherited.
    pub env: BTreeMap<String, String>,
}

// ── Paths ──────────────────────────────────────────────────────────────

/// `~/.paw/`
fn paw_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(PAW_DIR_NAME))
}

/// Default config location: `~/.paw/extensions.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    paw_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Default installation root: `~/.paw/extensions/`.
pub fn default_root_dir() -> Option<PathBuf> {
    paw_dir().map(|d| d.join(DEFAULT_ROOT_DIR_NAME))
}

/// npm shipped with the app's bundled Node.js runtime, if present.
fn bundled_npm() -> Option<PathBuf> {
    let node_dir = dirs::data_dir()?.join(BUNDLED_RUNTIME_DIR).join("node");
    let npm = if cfg!(target_os = "windows") {
        node_dir.join("npm.cmd")
    } else {
        node_dir.join("bin").join("npm")
    };
    npm.is_file().then_some(npm)
}

/// First `names` entry found as a file in one of `dirs`, in directory order.
pub fn find_in_dirs<I>(names: &[&str], dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Look `names` up on this process's `PATH`.
pub fn find_in_path(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in_dirs(names, std::env::split_paths(&path))
}

// ── Loading ────────────────────────────────────────────────────────────

impl InstallerConfig {
    /// Parse TOML config text.
    pub fn parse(text: &str) -> InstallResult<Self> {
        toml::from_str(text).map_err(|e| InstallerError::Config(format!("Invalid config: {}", e)))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> InstallResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!("[config] Loaded {}", path.display());
                Self::parse(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[config] {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(InstallerError::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Load from the default location.
    pub fn load() -> InstallResult<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("[config] Could not determine home directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Configured root, or `~/.paw/extensions`.
    pub fn root_dir(&self) -> InstallResult<PathBuf> {
        self.root
            .clone()
            .or_else(default_root_dir)
            .ok_or_else(|| InstallerError::Config("Could not determine installation root".into()))
    }

    pub fn to_toml(&self) -> InstallResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| InstallerError::Config(format!("Failed to render config: {}", e)))
    }
}

impl NpmConfig {
    /// Decide how npm will be launched.
    pub fn resolve_command(&self) -> InstallResult<NpmCommand> {
        if let Some(program) = &self.program {
            return Ok(NpmCommand::executable(program));
        }

        if let Some(script) = &self.cli_script {
            let node = match &self.node {
                Some(node) => node.clone(),
                None => find_in_path(&["node", "node.exe"]).ok_or_else(|| {
                    InstallerError::Config("npm.cli_script is set but node was not found on PATH".into())
                })?,
            };
            return Ok(NpmCommand::node_script(node, script));
        }

        if let Some(npm) = bundled_npm() {
            debug!("[config] Using bundled npm at {}", npm.display());
            return Ok(NpmCommand::executable(npm));
        }

        find_in_path(NPM_EXECUTABLE_NAMES)
            .map(NpmCommand::executable)
            .ok_or_else(|| {
                InstallerError::Config(
                    "npm not found: set npm.program or npm.cli_script in the config".into(),
                )
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
root = "/srv/paw/extensions"

[npm]
node = "/usr/bin/node"
cli_script = "/usr/lib/node_modules/npm/bin/npm-cli.js"

[npm.env]
PATH = "/usr/bin"
npm_config_cache = "/srv/paw/npm-cache"
"#;

    #[test]
    fn parse_full_config() {
        let config = InstallerConfig::parse(FULL_CONFIG).unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/srv/paw/extensions")));
        assert_eq!(config.npm.env.len(), 2);
        assert_eq!(config.npm.env["PATH"], "/usr/bin");

        let cmd = config.npm.resolve_command().unwrap();
        assert_eq!(cmd.program, PathBuf::from("/usr/bin/node"));
        assert_eq!(cmd.leading_args, vec!["/usr/lib/node_modules/npm/bin/npm-cli.js".to_string()]);
    }

    #[test]
    fn empty_config_is_default() {
        let config = InstallerConfig::parse("").unwrap();
        assert_eq!(config, InstallerConfig::default());
        assert!(config.npm.env.is_empty());
    }

    #[test]
    fn explicit_program_wins() {
        let config = InstallerConfig::parse(
            "[npm]\nprogram = \"/opt/npm\"\ncli_script = \"/ignored.js\"\n",
        )
        .unwrap();
        let cmd = config.npm.resolve_command().unwrap();
        assert_eq!(cmd, NpmCommand::executable("/opt/npm"));
    }

    #[test]
    fn unknown_types_are_config_errors() {
        let err = InstallerConfig::parse("root = 42").unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn configured_root_wins() {
        let config = InstallerConfig { root: Some("/x/y".into()), ..Default::default() };
        assert_eq!(config.root_dir().unwrap(), PathBuf::from("/x/y"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig::load_from(&dir.path().join("extensions.toml")).unwrap();
        assert_eq!(config, InstallerConfig::default());
    }

    #[test]
    fn find_in_dirs_respects_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("npm"), "").unwrap();
        std::fs::write(first.path().join("npm.cmd"), "").unwrap();

        let found = find_in_dirs(
            &["npm", "npm.cmd"],
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );
        assert_eq!(found, Some(first.path().join("npm.cmd")));

        assert_eq!(find_in_dirs(&["yarn"], vec![first.path().to_path_buf()]), None);
    }

    #[test]
    fn renders_back_to_toml() {
        let config = InstallerConfig::parse(FULL_CONFIG).unwrap();
        let again = InstallerConfig::parse(&config.to_toml().unwrap()).unwrap();
        assert_eq!(again, config);
    }
}
