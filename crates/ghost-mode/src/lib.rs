//! ghost-mode library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does Ghost Mode do? (for beginners)
//!
//! Ghost Mode is a single privacy switch.  Turning it on:
//!
//! 1. Disables the camera and microphone.
//! 2. Terminates every running process named in the target list
//!    (communication and telemetry apps, for example).
//! 3. Switches off location services, or, where that is impossible,
//!    randomizes the network card's hardware address.
//!
//! Turning it off restores what the platform allows.  Every step is
//! best-effort: a failing step is reported, never fatal, and the switch still
//! flips.  Each transition leaves one line in an append-only audit log.
//!
//! The crate follows a layered layout:
//!
//! - [`application`] – capability traits, the three subsystem adapters and
//!   the [`application::orchestrator::GhostModeOrchestrator`] state machine.
//! - [`infrastructure`] – OS commands, platform providers, audit sinks,
//!   configuration and the control console.

/// Application layer: use cases and the orchestrator.
pub mod application;

/// Infrastructure layer: OS adapters, storage, and the console.
pub mod infrastructure;
