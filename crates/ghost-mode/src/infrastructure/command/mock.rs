//! Scripted command runner for unit testing the platform providers.
//!
//! Responses are matched by prefix against the rendered command line
//! (`"net stop usbvideo"`).  The first matching rule wins; commands that
//! match no rule succeed with empty output.  Every call is recorded so tests
//! can assert the exact sequence a provider issued.
//!
//! ```ignore
//! let runner = Arc::new(
//!     ScriptedCommandRunner::new()
//!         .with_output("powershell", CommandOutput::failure(1, "no camera")),
//! );
//! let hw = RestrictedHardware::new(runner.clone());
//! hw.disable_camera();
//! assert_eq!(runner.calls()[1], "reg add HKLM\\...\\usbvideo /v Start /t REG_DWORD /d 4 /f");
//! ```

use std::sync::Mutex;

use ghost_core::GhostError;

use super::{command_line, CommandOutput, CommandRunner};

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    SpawnError,
}

/// A [`CommandRunner`] that never touches the OS.
#[derive(Debug, Default)]
pub struct ScriptedCommandRunner {
    rules: Vec<(String, Response)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCommandRunner {
    /// A runner where every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` return `output`.
    pub fn with_output(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.rules.push((prefix.to_string(), Response::Output(output)));
        self
    }

    /// Commands starting with `prefix` exit with code 1.
    pub fn with_failure(self, prefix: &str) -> Self {
        self.with_output(prefix, CommandOutput::failure(1, "scripted failure"))
    }

    /// Commands starting with `prefix` cannot be spawned.
    pub fn with_spawn_error(mut self, prefix: &str) -> Self {
        self.rules.push((prefix.to_string(), Response::SpawnError));
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CommandRunner for ScriptedCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, GhostError> {
        let line = command_line(program, args);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.clone());

        match self.rules.iter().find(|(prefix, _)| line.starts_with(prefix.as_str())) {
            Some((_, Response::Output(output))) => Ok(output.clone()),
            Some((_, Response::SpawnError)) => {
                Err(GhostError::ExecutionFailure(format!("`{program}` not found")))
            }
            None => Ok(CommandOutput::success("")),
        }
    }
}
