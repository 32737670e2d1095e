//! Infrastructure layer for Ghost Mode.
//!
//! Contains the OS-facing adapters: external command execution, the
//! platform capability providers, audit sinks, configuration storage, the
//! privilege probe and the control console.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ghost_core`, but MUST NOT be imported by the `application` layer (test
//! modules excepted).
//!
//! # Sub-modules
//!
//! - **`command`** – the `CommandRunner` seam over `std::process::Command`,
//!   plus a scripted runner for tests.
//!
//! - **`capabilities`** – restricted-platform (PnP, services, registry) and
//!   open-platform (kernel modules, ALSA, macchanger) providers, the
//!   `sysinfo` process provider, and in-memory mocks.  `for_platform` picks
//!   the set once at startup.
//!
//! - **`audit_log`** – append-only file sink and in-memory sink.
//!
//! - **`storage`** – TOML configuration loading.
//!
//! - **`privilege`** – administrator / root check.
//!
//! - **`console`** – the line-oriented control shell.

pub mod audit_log;
pub mod capabilities;
pub mod command;
pub mod console;
pub mod privilege;
pub mod storage;
