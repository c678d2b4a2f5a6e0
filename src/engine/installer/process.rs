// Paw Extension Installer — npm process runner
//
// Spawns the package manager with a cleared environment, drains stderr while
// the child runs, and collapses exit / error into a single `RunOutcome`.
// stdout is never read; it is attached to the null device.

use crate::atoms::error::{InstallResult, InstallerError};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

// ── Outcome ────────────────────────────────────────────────────────────────

/// Terminal result of one package-manager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code 0. Anything written to stderr is discarded.
    Success,
    /// Non-zero exit, or killed by a signal (`code == None`).
    Exited { code: Option<i32>, stderr: String },
    /// The process could not be started, or waiting on it failed.
    Errored { reason: String },
}

impl RunOutcome {
    /// Map onto the installer error taxonomy. `program` names the executable
    /// in spawn errors.
    pub fn into_result(self, program: &str) -> InstallResult<()> {
        match self {
            RunOutcome::Success => Ok(()),
            RunOutcome::Exited { code, stderr } => Err(InstallerError::Install { code, stderr }),
            RunOutcome::Errored { reason } => Err(InstallerError::spawn(program, reason)),
        }
    }
}

// ── Runner seam ────────────────────────────────────────────────────────────

/// Something that can run the package manager to completion.
#[async_trait]
pub trait PackageRunner: Send + Sync {
    /// Run with `args` in `cwd` and resolve exactly once.
    async fn run(&self, args: &[String], cwd: &Path) -> RunOutcome;

    /// Display name used in logs and spawn errors.
    fn program(&self) -> String;
}

// ── npm command line ───────────────────────────────────────────────────────

/// How to launch npm: an executable plus any arguments that precede the
/// install flags (e.g. `node /path/to/npm-cli.js`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmCommand {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl NpmCommand {
    /// Run `program` directly.
    pub fn executable(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), leading_args: Vec::new() }
    }

    /// Run npm's CLI script through a Node.js binary.
    pub fn node_script(node: impl Into<PathBuf>, script: impl AsRef<Path>) -> Self {
        Self {
            program: node.into(),
            leading_args: vec![script.as_ref().to_string_lossy().into_owned()],
        }
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.leading_args.push(arg.into());
        self
    }
}

// ── Production runner ──────────────────────────────────────────────────────

/// Runs npm as a child process.
///
/// The child starts with an empty environment; only the entries in `env` are
/// passed through. There is no timeout: a hung npm holds the install lock
/// until it exits.
#[derive(Debug, Clone)]
pub struct NpmRunner {
    command: NpmCommand,
    env: BTreeMap<String, String>,
}

impl NpmRunner {
    pub fn new(command: NpmCommand) -> Self {
        Self { command, env: BTreeMap::new() }
    }

    /// Explicit environment for the child. Nothing is inherited.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

#[async_trait]
impl PackageRunner for NpmRunner {
    async fn run(&self, args: &[String], cwd: &Path) -> RunOutcome {
        debug!(
            "[npm] {} {} {} (cwd {})",
            self.command.program.display(),
            self.command.leading_args.join(" "),
            args.join(" "),
            cwd.display()
        );

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.leading_args)
            .args(args)
            .current_dir(cwd)
            .env_clear()
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("[npm] Failed to spawn {}: {}", self.command.program.display(), e);
                return RunOutcome::Errored { reason: e.to_string() };
            }
        };

        // Drain stderr concurrently with the wait so a chatty npm can't fill
        // the pipe and stall.
        let mut stderr_pipe = child.stderr.take();
        let capture = async {
            let mut buf = Vec::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                pipe.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(buf)
        };
        let (status, captured) = tokio::join!(child.wait(), capture);

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                warn!("[npm] Failed waiting on {}: {}", self.command.program.display(), e);
                return RunOutcome::Errored { reason: e.to_string() };
            }
        };
        exit_outcome(status, captured)
    }

    fn program(&self) -> String {
        self.command.program.display().to_string()
    }
}

/// Combine the exit status with the stderr capture. A failed exit whose
/// stderr could not be read still reports the read error as its stderr.
fn exit_outcome(status: ExitStatus, captured: std::io::Result<Vec<u8>>) -> RunOutcome {
    let stderr = match captured {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("[npm] stderr read error: {}", e);
            format!("npm exited with {} and its stderr could not be read: {}", status, e)
        }
    };
    for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
        debug!("[npm:stderr] {}", line);
    }

    if status.success() {
        RunOutcome::Success
    } else {
        RunOutcome::Exited { code: status.code(), stderr }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn unreadable_stderr_is_reported_in_the_failure() {
        use std::os::unix::process::ExitStatusExt;

        let broken = || Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));

        match exit_outcome(ExitStatus::from_raw(1 << 8), broken()) {
            RunOutcome::Exited { code, stderr } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("pipe closed"), "{stderr}");
            }
            other => panic!("expected Exited, got {other:?}"),
        }
        assert_eq!(exit_outcome(ExitStatus::from_raw(0), broken()), RunOutcome::Success);
        assert_eq!(
            exit_outcome(ExitStatus::from_raw(2 << 8), Ok(b"E404\n".to_vec())),
            RunOutcome::Exited { code: Some(2), stderr: "E404\n".into() }
        );
    }

    #[test]
    fn outcome_mapping() {
        assert!(RunOutcome::Success.into_result("npm").is_ok());

        let err = RunOutcome::Exited { code: Some(1), stderr: "disk full".into() }
            .into_result("npm")
            .unwrap_err();
        match err {
            InstallerError::Install { code, stderr } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "disk full");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = RunOutcome::Errored { reason: "No such file or directory".into() }
            .into_result("npm")
            .unwrap_err();
        assert!(matches!(err, InstallerError::Spawn { ref program, .. } if program == "npm"));
    }

    #[test]
    fn node_script_puts_script_first() {
        let cmd = NpmCommand::node_script("/usr/bin/node", "/opt/npm/bin/npm-cli.js");
        assert_eq!(cmd.program, PathBuf::from("/usr/bin/node"));
        assert_eq!(cmd.leading_args, vec!["/opt/npm/bin/npm-cli.js".to_string()]);
    }

    #[cfg(unix)]
    fn sh(script: &str) -> NpmRunner {
        NpmRunner::new(NpmCommand::executable("/bin/sh").arg("-c").arg(script))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success_even_with_stderr() {
        let dir = std::env::temp_dir();
        let outcome = sh("printf 'npm WARN deprecated' >&2; exit 0").run(&[], &dir).await;
        assert_eq!(outcome, RunOutcome::Success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_stderr_verbatim() {
        let dir = std::env::temp_dir();
        let outcome = sh("printf 'disk full' >&2; exit 1").run(&[], &dir).await;
        assert_eq!(
            outcome,
            RunOutcome::Exited { code: Some(1), stderr: "disk full".into() }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_stderr_does_not_stall() {
        let dir = std::env::temp_dir();
        let script = "i=0; while [ $i -lt 4000 ]; do echo 'npm ERR! padding line for pipe' >&2; i=$((i+1)); done; exit 3";
        match sh(script).run(&[], &dir).await {
            RunOutcome::Exited { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.lines().count(), 4000);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_executable_is_an_error_event() {
        let runner = NpmRunner::new(NpmCommand::executable("/definitely/not/here/npm"));
        let outcome = runner.run(&["install".into()], &std::env::temp_dir()).await;
        assert!(matches!(outcome, RunOutcome::Errored { .. }));
    }
}
