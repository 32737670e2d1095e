//! Process enumeration and termination through `sysinfo`.
//!
//! The process table is refreshed on every call, so a sweep always sees the
//! processes running at that moment.

use std::sync::Mutex;

use ghost_core::GhostError;
use sysinfo::{Pid, Signal, System};
use tracing::debug;

use crate::application::capabilities::{ProcessCapability, ProcessEntry};

/// [`ProcessCapability`] over the live OS process table.
pub struct SysinfoProcesses {
    system: Mutex<System>,
}

impl SysinfoProcesses {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCapability for SysinfoProcesses {
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, GhostError> {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_processes();

        Ok(system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            })
            .collect())
    }

    fn terminate(&self, pid: u32) -> Result<(), GhostError> {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_processes();

        let process = system
            .process(Pid::from_u32(pid))
            .ok_or_else(|| GhostError::ExecutionFailure(format!("no such process: pid {pid}")))?;

        // SIGTERM where supported, otherwise the platform's default kill.
        let sent = match process.kill_with(Signal::Term) {
            Some(sent) => sent,
            None => process.kill(),
        };
        if sent {
            debug!("termination signal delivered to pid {pid}");
            Ok(())
        } else {
            Err(GhostError::AccessDenied(format!(
                "pid {pid} ({}) refused the termination signal",
                process.name()
            )))
        }
    }
}
