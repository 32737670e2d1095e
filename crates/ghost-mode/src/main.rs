//! Ghost Mode entry point.
//!
//! Wires together configuration, logging, the platform capability set, the
//! audit sink and the orchestrator, then runs the control console on the
//! Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config_or_default()     -- GHOST_MODE_CONFIG or platform dir
//!  └─ tracing_subscriber::fmt()    -- RUST_LOG, else configured log_level
//!  └─ privilege::is_elevated()     -- warn only
//!  └─ capabilities::for_platform() -- restricted | open providers
//!  └─ GhostModeOrchestrator::new() -- FileAuditSink attached
//!  └─ commands from argv, or the stdin console until quit / EOF / Ctrl-C
//! ```
//!
//! # Usage
//!
//! ```text
//! ghost-mode [--json] [COMMAND ...]
//! ```
//!
//! Each `COMMAND` argument is one console line (`activate`, `toggle`,
//! `"reload /path/to/targets.txt"`, ...).  With commands the binary runs
//! them in order and exits; without, it reads commands from stdin.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ghost_mode::application::{audit::AuditSink, orchestrator::GhostModeOrchestrator};
use ghost_mode::infrastructure::{
    audit_log::FileAuditSink,
    capabilities,
    command::{CommandRunner, SystemCommandRunner},
    console::{self, ConsoleCommand, ConsoleReply, ConsoleState},
    privilege,
    storage::config::{load_config_or_default, log_effective_config},
};

/// Parsed process arguments.
struct CliArgs {
    json: bool,
    commands: Vec<ConsoleCommand>,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut json = false;
        let mut commands = Vec::new();
        for arg in args {
            match arg.as_str() {
                "--json" => json = true,
                "-h" | "--help" => commands.push(ConsoleCommand::Help),
                flag if flag.starts_with("--") => bail!("unknown option `{flag}`"),
                line => commands.push(
                    line.parse::<ConsoleCommand>()
                        .with_context(|| format!("invalid command argument `{line}`"))?,
                ),
            }
        }
        Ok(Self { json, commands })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    let (config, config_warning) = load_config_or_default();

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    info!("Ghost Mode starting");
    log_effective_config(&config, config_warning.as_deref());

    // ── Platform capabilities ─────────────────────────────────────────────────
    let platform = config.platform();
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    if !privilege::is_elevated(runner.as_ref(), platform) {
        warn!("not running with administrator privileges; most protections will fail");
    }
    let capability_set = capabilities::for_platform(platform, runner);

    // ── Orchestrator ──────────────────────────────────────────────────────────
    let audit: Arc<dyn AuditSink> = Arc::new(FileAuditSink::new(config.paths.audit_log.clone()));
    let orchestrator = Arc::new(GhostModeOrchestrator::new(
        capability_set,
        audit,
        config.orchestrator_settings(),
    ));
    orchestrator.load_target_processes(&config.paths.target_processes);

    let state = ConsoleState::new(orchestrator, config.paths.target_processes.clone());

    // ── One-shot commands from argv ───────────────────────────────────────────
    if !args.commands.is_empty() {
        let mut stdout = tokio::io::stdout();
        for command in args.commands {
            let reply = console::execute(Arc::clone(&state), command).await;
            let text = console::render(&reply, args.json);
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            if matches!(reply, ConsoleReply::Quit) {
                break;
            }
        }
        stdout.flush().await?;
        return Ok(());
    }

    // ── Interactive console ───────────────────────────────────────────────────
    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = console::run_console(state, stdin, tokio::io::stdout(), args.json) => {
            result.context("console I/O failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            // A pending stdin read holds a blocking thread the runtime would wait on.
            std::process::exit(0);
        }
    }

    info!("Ghost Mode exiting");
    Ok(())
}
