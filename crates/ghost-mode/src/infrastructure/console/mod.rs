//! Line-oriented control console.
//!
//! The console is the caller-facing shell surface: it reads one command per
//! line, runs it against the shared [`GhostModeOrchestrator`] and prints the
//! result.
//!
//! ```text
//! stdin line ──► ConsoleCommand::parse ──► execute() ──► ConsoleReply ──► render()
//!                                             │
//!                                             └─ spawn_blocking(orchestrator.activate())
//! ```
//!
//! # Why `spawn_blocking`? (for beginners)
//!
//! A transition runs external commands (PowerShell, `reg`, `modprobe`, ...)
//! and can take seconds.  Calling it directly from an async task would stall
//! the Tokio worker thread.  `spawn_blocking` moves the call onto a thread
//! meant for blocking work; the async side only receives the finished
//! report.
//!
//! # `CommandResult<T>`
//!
//! With `--json` every reply is printed as a unified envelope:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use ghost_core::{OutcomeKind, SubsystemOutcome, TargetProcessSet, TransitionReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::application::orchestrator::GhostModeOrchestrator;

// ── Commands ──────────────────────────────────────────────────────────────────

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Activate,
    Deactivate,
    Toggle,
    Status,
    /// Reload the target list, from the given file or the configured one.
    Reload(Option<PathBuf>),
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(String),
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        if word.is_empty() {
            return Err(ParseCommandError::Empty);
        }

        let word = word.to_lowercase();
        let command = match word.as_str() {
            "activate" | "on" => ConsoleCommand::Activate,
            "deactivate" | "off" => ConsoleCommand::Deactivate,
            "toggle" => ConsoleCommand::Toggle,
            "status" => ConsoleCommand::Status,
            "reload" => {
                let path = (!rest.is_empty()).then(|| PathBuf::from(rest));
                return Ok(ConsoleCommand::Reload(path));
            }
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            _ => return Err(ParseCommandError::Unknown(word)),
        };
        if rest.is_empty() {
            Ok(command)
        } else {
            Err(ParseCommandError::UnexpectedArgument(word))
        }
    }
}

pub const HELP_TEXT: &str = "\
commands:
  activate        enable every protection
  deactivate      restore what can be restored
  toggle          activate when inactive, deactivate otherwise
  status          show state, targets and last termination record
  reload [path]   reload the target process list
  help            show this text
  quit            leave the console";

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Unified response wrapper for console commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    /// `true` if the command completed; `false` on error.
    pub success: bool,
    /// The command's return value, present only when `success` is `true`.
    pub data: Option<T>,
    /// A human-readable error message, present only when `success` is `false`.
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDto {
    pub name: String,
    pub kind: OutcomeKind,
    pub succeeded: bool,
    pub detail: String,
}

impl From<&SubsystemOutcome> for OutcomeDto {
    fn from(outcome: &SubsystemOutcome) -> Self {
        Self {
            name: outcome.name().to_string(),
            kind: outcome.kind(),
            succeeded: outcome.succeeded(),
            detail: outcome.detail().to_string(),
        }
    }
}

/// Result of one activation or deactivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDto {
    pub direction: String,
    pub state: String,
    pub all_succeeded: bool,
    pub outcomes: Vec<OutcomeDto>,
    pub status_lines: Vec<String>,
}

impl From<&TransitionReport> for TransitionDto {
    fn from(report: &TransitionReport) -> Self {
        Self {
            direction: report.direction().to_string(),
            state: report.state().to_string(),
            all_succeeded: report.all_succeeded(),
            outcomes: report.outcomes().iter().map(OutcomeDto::from).collect(),
            status_lines: report.status_lines(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDto {
    pub state: String,
    pub platform: String,
    pub targets: Vec<String>,
    /// Latest activation's termination record, in termination order.
    pub killed: Vec<(String, bool)>,
    pub location_state: String,
    /// `None` when the platform reports no location value.
    pub location_enabled: Option<bool>,
    pub hardware: OutcomeDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadDto {
    pub path: PathBuf,
    pub targets: Vec<String>,
}

/// What a command produced, before rendering.
#[derive(Debug)]
pub enum ConsoleReply {
    Transition(CommandResult<TransitionDto>),
    Status(CommandResult<StatusDto>),
    Reload(CommandResult<ReloadDto>),
    Invalid(CommandResult<()>),
    Help,
    Quit,
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// State shared by every console command.
pub struct ConsoleState {
    pub orchestrator: Arc<GhostModeOrchestrator>,
    /// Target list used by a bare `reload`.
    pub targets_path: PathBuf,
}

impl ConsoleState {
    pub fn new(orchestrator: Arc<GhostModeOrchestrator>, targets_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            targets_path,
        })
    }
}

// ── Command handlers ──────────────────────────────────────────────────────────

/// Runs `f` against the orchestrator on the blocking thread pool.
async fn blocking<T, F>(state: &Arc<ConsoleState>, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&GhostModeOrchestrator) -> T + Send + 'static,
{
    let orchestrator = Arc::clone(&state.orchestrator);
    tokio::task::spawn_blocking(move || f(orchestrator.as_ref()))
        .await
        .map_err(|e| {
            error!("console task failed: {e}");
            format!("command did not complete: {e}")
        })
}

fn transition_result(result: Result<TransitionReport, String>) -> CommandResult<TransitionDto> {
    match result {
        Ok(report) => CommandResult::ok(TransitionDto::from(&report)),
        Err(e) => CommandResult::err(e),
    }
}

pub async fn activate(state: Arc<ConsoleState>) -> CommandResult<TransitionDto> {
    transition_result(blocking(&state, GhostModeOrchestrator::activate).await)
}

pub async fn deactivate(state: Arc<ConsoleState>) -> CommandResult<TransitionDto> {
    transition_result(blocking(&state, GhostModeOrchestrator::deactivate).await)
}

pub async fn toggle(state: Arc<ConsoleState>) -> CommandResult<TransitionDto> {
    transition_result(blocking(&state, GhostModeOrchestrator::toggle_report).await)
}

pub async fn status(state: Arc<ConsoleState>) -> CommandResult<StatusDto> {
    let result = blocking(&state, |orch| {
        let location = orch.location_state();
        StatusDto {
            state: orch.current_state().to_string(),
            platform: orch.platform().to_string(),
            targets: orch.target_processes().names().to_vec(),
            killed: orch.killed_processes().entries().to_vec(),
            location_state: location.to_string(),
            location_enabled: location.location_enabled(),
            hardware: OutcomeDto::from(&orch.hardware_status()),
        }
    })
    .await;
    match result {
        Ok(dto) => CommandResult::ok(dto),
        Err(e) => CommandResult::err(e),
    }
}

pub async fn reload(state: Arc<ConsoleState>, path: Option<PathBuf>) -> CommandResult<ReloadDto> {
    let path = path.unwrap_or_else(|| state.targets_path.clone());
    let load_path = path.clone();
    let result = blocking(&state, move |orch| {
        orch.load_target_processes(&load_path);
        orch.target_processes()
    })
    .await;
    match result {
        Ok(targets) => reload_result(path, &targets),
        Err(e) => CommandResult::err(e),
    }
}

fn reload_result(path: PathBuf, targets: &TargetProcessSet) -> CommandResult<ReloadDto> {
    CommandResult::ok(ReloadDto {
        path,
        targets: targets.names().to_vec(),
    })
}

/// Executes one parsed command.
pub async fn execute(state: Arc<ConsoleState>, command: ConsoleCommand) -> ConsoleReply {
    debug!("console command: {command:?}");
    match command {
        ConsoleCommand::Activate => ConsoleReply::Transition(activate(state).await),
        ConsoleCommand::Deactivate => ConsoleReply::Transition(deactivate(state).await),
        ConsoleCommand::Toggle => ConsoleReply::Transition(toggle(state).await),
        ConsoleCommand::Status => ConsoleReply::Status(status(state).await),
        ConsoleCommand::Reload(path) => ConsoleReply::Reload(reload(state, path).await),
        ConsoleCommand::Help => ConsoleReply::Help,
        ConsoleCommand::Quit => ConsoleReply::Quit,
    }
}

/// Parses and executes one input line.
pub async fn execute_line(state: Arc<ConsoleState>, line: &str) -> ConsoleReply {
    match line.parse::<ConsoleCommand>() {
        Ok(command) => execute(state, command).await,
        Err(e) => ConsoleReply::Invalid(CommandResult::err(e.to_string())),
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!("{{\"success\":false,\"data\":null,\"error\":\"{e}\"}}"))
}

/// Renders a reply as JSON or as human-readable text.
pub fn render(reply: &ConsoleReply, json: bool) -> String {
    match reply {
        ConsoleReply::Transition(r) if json => to_json(r),
        ConsoleReply::Status(r) if json => to_json(r),
        ConsoleReply::Reload(r) if json => to_json(r),
        ConsoleReply::Invalid(r) if json => to_json(r),
        ConsoleReply::Help if json => to_json(&CommandResult::ok(HELP_TEXT)),
        ConsoleReply::Quit if json => to_json(&CommandResult::ok("bye")),

        ConsoleReply::Transition(r) => render_human(r, |t| {
            let mut lines = vec![format!("Ghost Mode {} ({})", t.state, t.direction)];
            lines.extend(t.status_lines.iter().map(|l| format!("  {l}")));
            lines.join("\n")
        }),
        ConsoleReply::Status(r) => render_human(r, |s| {
            let location = match s.location_enabled {
                Some(true) => "on",
                Some(false) => "off",
                None => "unknown",
            };
            format!(
                "state: {}\nplatform: {}\ntargets: {:?}\nkilled: {:?}\nlocation: {location} {}\nhardware: {}",
                s.state, s.platform, s.targets, s.killed, s.location_state, s.hardware.detail
            )
        }),
        ConsoleReply::Reload(r) => render_human(r, |d| {
            format!(
                "loaded {} target(s) from {}",
                d.targets.len(),
                d.path.display()
            )
        }),
        ConsoleReply::Invalid(r) => render_human(r, |_| String::new()),
        ConsoleReply::Help => HELP_TEXT.to_string(),
        ConsoleReply::Quit => "bye".to_string(),
    }
}

fn render_human<T: Serialize>(result: &CommandResult<T>, f: impl FnOnce(&T) -> String) -> String {
    match (&result.data, &result.error) {
        (Some(data), _) => f(data),
        (None, Some(e)) => format!("error: {e}"),
        (None, None) => String::new(),
    }
}

// ── Console loop ──────────────────────────────────────────────────────────────

/// Reads commands from `input` until `quit` or end of input.
///
/// Blank lines are ignored.
///
/// # Errors
///
/// Returns the underlying I/O error if reading `input` or writing `output`
/// fails.
pub async fn run_console<R, W>(
    state: Arc<ConsoleState>,
    input: R,
    mut output: W,
    json: bool,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = execute_line(Arc::clone(&state), &line).await;
        let text = render(&reply, json);
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        if matches!(reply, ConsoleReply::Quit) {
            break;
        }
    }
    Ok(())
}
