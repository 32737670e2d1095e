//! External command execution.
//!
//! Every OS command the platform providers issue (PnP cmdlets, `reg`, `net`,
//! `modprobe`, `amixer`, `ifconfig`, `macchanger`) goes through the
//! [`CommandRunner`] trait.  Production code uses [`SystemCommandRunner`];
//! tests script the responses with [`mock::ScriptedCommandRunner`] and then
//! assert on the exact command sequence.
//!
//! # Exit status vs. errors (for beginners)
//!
//! `run` only fails when the program could not be started at all (not
//! installed, not executable).  A program that starts and exits non-zero is
//! still an `Ok(CommandOutput)`; callers that treat non-zero as failure use
//! [`run_checked`], which turns the exit status into a [`GhostError`].

pub mod mock;

use std::io::ErrorKind;
use std::process::Command;

use ghost_core::GhostError;
use tracing::debug;

/// Captured result of one finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A zero exit with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A non-zero exit with the given stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// [`GhostError::ExecutionFailure`] if the program could not be spawned,
    /// [`GhostError::AccessDenied`] if the OS refused to execute it.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, GhostError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, GhostError> {
        let line = command_line(program, args);
        debug!("running `{line}`");

        let output = Command::new(program).args(args).output().map_err(|e| {
            match e.kind() {
                ErrorKind::PermissionDenied => GhostError::AccessDenied(format!("`{line}`: {e}")),
                ErrorKind::NotFound => {
                    GhostError::ExecutionFailure(format!("`{program}` not found"))
                }
                _ => GhostError::ExecutionFailure(format!("`{line}` could not start: {e}")),
            }
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs a command and treats a non-zero exit as an error.
///
/// # Errors
///
/// Whatever [`CommandRunner::run`] returns, plus
/// [`GhostError::AccessDenied`] when the output reports a privilege problem
/// and [`GhostError::ExecutionFailure`] for any other non-zero exit.
pub fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, GhostError> {
    let output = runner.run(program, args)?;
    if output.succeeded() {
        return Ok(output);
    }

    let line = command_line(program, args);
    let message = first_line(&output.stderr)
        .or_else(|| first_line(&output.stdout))
        .unwrap_or("no output");
    let detail = match output.code {
        Some(code) => format!("`{line}` exited with code {code}: {message}"),
        None => format!("`{line}` was terminated by a signal: {message}"),
    };

    if is_access_denied(&output) {
        Err(GhostError::AccessDenied(detail))
    } else {
        Err(GhostError::ExecutionFailure(detail))
    }
}

/// Renders a command the way it would be typed in a shell.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

const DENIAL_MARKERS: [&str; 4] = [
    "access is denied",
    "permission denied",
    "operation not permitted",
    "requires elevation",
];

fn is_access_denied(output: &CommandOutput) -> bool {
    let text = format!("{}\n{}", output.stderr, output.stdout).to_lowercase();
    DENIAL_MARKERS.iter().any(|m| text.contains(m))
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}
