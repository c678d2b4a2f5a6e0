// paw-ext — command-line front end for the extension installer.

use clap::{ArgAction, Parser, Subcommand};
use futures::future::join_all;
use log::{debug, info};
use paw_extension_installer::engine::config::default_config_path;
use paw_extension_installer::engine::installer::read_manifest;
use paw_extension_installer::{
    ExtensionInstaller, InstallResult, InstallationRoot, InstallerConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "paw-ext", version, about = "Install Paw extension dependencies with npm")]
struct Cli {
    /// Config file (default: ~/.paw/extensions.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Installation root; overrides the config file
    #[arg(long, global = true, env = "PAW_EXTENSIONS_ROOT")]
    root: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install one or more packages into the root, one at a time
    Install {
        /// npm package specs, e.g. `left-pad` or `lodash@4.17.21`
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Write a descriptor as <root>/package.json and install it
    Sync {
        /// JSON package descriptor
        descriptor: PathBuf,
    },
    /// Print the resolved configuration
    Config,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> InstallResult<InstallerConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => InstallerConfig::load_from(path)?,
        None => InstallerConfig::load()?,
    };
    if let Some(root) = &cli.root {
        let root = if root.is_absolute() {
            root.clone()
        } else {
            std::env::current_dir()?.join(root)
        };
        config.root = Some(root);
    }
    Ok(config)
}

/// Create the root directory if needed and build the installer over it.
fn build_installer(config: &InstallerConfig) -> InstallResult<Arc<ExtensionInstaller>> {
    let dir = config.root_dir()?;
    std::fs::create_dir_all(&dir)?;
    let root = Arc::new(InstallationRoot::with_dir(dir)?);
    Ok(Arc::new(ExtensionInstaller::from_config(root, config)?))
}

async fn run(cli: Cli) -> InstallResult<ExitCode> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Config => {
            if let Some(path) = cli.config.clone().or_else(default_config_path) {
                debug!("[config] Config file: {}", path.display());
            }
            let resolved = InstallerConfig { root: Some(config.root_dir()?), ..config };
            print!("{}", resolved.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Install { packages } => {
            let installer = build_installer(&config)?;
            // Issued together; the installer runs them in order.
            let results = join_all(packages.iter().map(|p| installer.install_package(p))).await;

            let mut failed = 0;
            for (package, result) in packages.iter().zip(results) {
                if let Err(e) = result {
                    failed += 1;
                    eprintln!("{}: {}", package, e);
                }
            }
            info!("[paw-ext] {} of {} package(s) installed", packages.len() - failed, packages.len());
            Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Sync { descriptor } => {
            let descriptor = read_manifest(descriptor).await?;
            let installer = build_installer(&config)?;
            installer.install_manifest(&descriptor).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
