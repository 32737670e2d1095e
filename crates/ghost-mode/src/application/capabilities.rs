//! Capability traits: the platform-specific actions Ghost Mode relies on.
//!
//! Every method is best-effort and fail-open.  Expected operational failures
//! (no camera, command missing, privilege too low) come back as a
//! [`CapabilityResult`] with `succeeded == false`, never as a panic.
//!
//! Platform dispatch happens exactly once: a [`CapabilitySet`] is built for
//! one [`Platform`] at startup and the adapters only ever see the traits.
//! The concrete providers live in `infrastructure::capabilities`.

use std::fmt;
use std::sync::Arc;

use ghost_core::{CapabilityResult, GhostError, LocationSnapshot, TargetProcessSet};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// The two supported capability variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Elevated-privilege command execution (PnP, services, registry).
    /// Supports location spoofing.
    Restricted,
    /// Kernel-module and mixer commands.  No location spoofing; network
    /// identity randomization takes its place.
    Open,
}

impl Platform {
    /// The variant matching the host OS.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Restricted
        } else {
            Platform::Open
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Restricted => f.write_str("restricted"),
            Platform::Open => f.write_str("open"),
        }
    }
}

/// Camera and microphone control.
pub trait HardwareCapability: Send + Sync {
    fn disable_camera(&self) -> CapabilityResult;

    fn disable_microphone(&self) -> CapabilityResult;

    /// Undoes `disable_camera`.  `CapabilityUnavailable` where no
    /// restoration path exists.
    fn restore_camera(&self) -> CapabilityResult;

    fn restore_microphone(&self) -> CapabilityResult;
}

/// One entry of the OS process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// One termination attempt made by [`ProcessCapability::terminate_processes_by_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationAttempt {
    pub name: String,
    pub pid: u32,
    pub result: CapabilityResult,
}

/// Everything a termination sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminationSweep {
    pub attempts: Vec<TerminationAttempt>,
    /// Set when the process table could not be read at all.
    pub enumeration_error: Option<String>,
}

impl TerminationSweep {
    /// `true` when no lookup or access error occurred.
    pub fn is_clean(&self) -> bool {
        self.enumeration_error.is_none() && self.attempts.iter().all(|a| a.result.succeeded)
    }
}

/// Process enumeration and termination.
///
/// Implementors provide the two primitives; name matching is shared.
pub trait ProcessCapability: Send + Sync {
    /// Snapshot of the running processes.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::ExecutionFailure`] if the table cannot be read.
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, GhostError>;

    /// Asks the process to terminate.
    ///
    /// # Errors
    ///
    /// [`GhostError::ExecutionFailure`] if the pid no longer exists,
    /// [`GhostError::AccessDenied`] if the OS refused the signal.
    fn terminate(&self, pid: u32) -> Result<(), GhostError>;

    /// Terminates every running process whose name matches a target,
    /// ignoring case.
    fn terminate_processes_by_name(&self, targets: &TargetProcessSet) -> TerminationSweep {
        let processes = match self.list_processes() {
            Ok(list) => list,
            Err(e) => {
                error!("could not enumerate processes: {e}");
                return TerminationSweep {
                    attempts: Vec::new(),
                    enumeration_error: Some(e.to_string()),
                };
            }
        };

        let attempts = processes
            .into_iter()
            .filter(|p| targets.matches(&p.name))
            .map(|p| {
                let result = match self.terminate(p.pid) {
                    Ok(()) => CapabilityResult::ok(format!("terminated pid {}", p.pid)),
                    Err(e) => {
                        warn!("could not terminate {} (pid {}): {e}", p.name, p.pid);
                        CapabilityResult::failed(&e)
                    }
                };
                TerminationAttempt {
                    name: p.name,
                    pid: p.pid,
                    result,
                }
            })
            .collect();

        TerminationSweep {
            attempts,
            enumeration_error: None,
        }
    }

    /// `true` if any process with this name (ignoring case) is running.
    /// Enumeration failures read as "not running".
    fn is_process_running(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        match self.list_processes() {
            Ok(list) => list.iter().any(|p| p.name.to_lowercase() == wanted),
            Err(e) => {
                error!("error checking process status: {e}");
                false
            }
        }
    }
}

/// Location obfuscation, or its network-identity stand-in.
pub trait LocationCapability: Send + Sync {
    /// Whether `spoof_location` / `restore_location` exist on this platform.
    fn supports_location_spoofing(&self) -> bool;

    /// Writes the "location disabled" marker.  Absent coordinates are
    /// chosen at random.
    fn spoof_location(&self, latitude: Option<f64>, longitude: Option<f64>) -> CapabilityResult;

    /// Writes the marker back from a previously captured snapshot.
    fn restore_location(&self, snapshot: &LocationSnapshot) -> CapabilityResult;

    /// Reads the raw location-service state.
    fn current_location_state(&self) -> LocationSnapshot;

    /// Randomizes the hardware address of `interface`.
    fn randomize_network_identity(&self, interface: &str) -> CapabilityResult;
}

/// The providers for one platform, selected once at construction time.
#[derive(Clone)]
pub struct CapabilitySet {
    pub platform: Platform,
    pub hardware: Arc<dyn HardwareCapability>,
    pub processes: Arc<dyn ProcessCapability>,
    pub location: Arc<dyn LocationCapability>,
}

impl CapabilitySet {
    pub fn new(
        platform: Platform,
        hardware: Arc<dyn HardwareCapability>,
        processes: Arc<dyn ProcessCapability>,
        location: Arc<dyn LocationCapability>,
    ) -> Self {
        Self {
            platform,
            hardware,
            processes,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Minimal process table: pids listed in `denied` refuse termination.
    struct TableProcesses {
        table: Vec<ProcessEntry>,
        denied: Vec<u32>,
        killed: Mutex<Vec<u32>>,
    }

    impl TableProcesses {
        fn new(names: &[&str]) -> Self {
            Self {
                table: names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| ProcessEntry {
                        pid: 100 + i as u32,
                        name: n.to_string(),
                    })
                    .collect(),
                denied: Vec::new(),
                killed: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessCapability for TableProcesses {
        fn list_processes(&self) -> Result<Vec<ProcessEntry>, GhostError> {
            Ok(self.table.clone())
        }

        fn terminate(&self, pid: u32) -> Result<(), GhostError> {
            if self.denied.contains(&pid) {
                return Err(GhostError::AccessDenied(format!("pid {pid}")));
            }
            self.killed.lock().unwrap().push(pid);
            Ok(())
        }
    }

    struct BrokenTable;

    impl ProcessCapability for BrokenTable {
        fn list_processes(&self) -> Result<Vec<ProcessEntry>, GhostError> {
            Err(GhostError::ExecutionFailure("proc unreadable".into()))
        }

        fn terminate(&self, _pid: u32) -> Result<(), GhostError> {
            unreachable!("nothing to terminate")
        }
    }

    #[test]
    fn test_terminate_by_name_matches_ignoring_case() {
        // Arrange
        let procs = TableProcesses::new(&["Zoom.EXE", "chrome.exe"]);
        let targets = TargetProcessSet::from_names(["zoom.exe"]);

        // Act
        let sweep = procs.terminate_processes_by_name(&targets);

        // Assert
        assert_eq!(sweep.attempts.len(), 1);
        assert_eq!(sweep.attempts[0].name, "Zoom.EXE");
        assert_eq!(*procs.killed.lock().unwrap(), vec![100]);
        assert!(sweep.is_clean());
    }

    #[test]
    fn test_access_denied_makes_sweep_unclean() {
        // Arrange
        let mut procs = TableProcesses::new(&["teams.exe", "teams.exe"]);
        procs.denied.push(101);
        let targets = TargetProcessSet::from_names(["teams.exe"]);

        // Act
        let sweep = procs.terminate_processes_by_name(&targets);

        // Assert
        assert!(!sweep.is_clean());
        let outcomes: Vec<bool> = sweep.attempts.iter().map(|a| a.result.succeeded).collect();
        assert_eq!(outcomes, vec![true, false]);
    }

    #[test]
    fn test_enumeration_failure_is_reported_not_raised() {
        let sweep = BrokenTable.terminate_processes_by_name(&TargetProcessSet::from_names(["a"]));
        assert!(sweep.attempts.is_empty());
        assert!(sweep.enumeration_error.is_some());
        assert!(!sweep.is_clean());
    }

    #[test]
    fn test_is_process_running_ignores_case_and_fails_closed() {
        let procs = TableProcesses::new(&["Slack.exe"]);
        assert!(procs.is_process_running("slack.EXE"));
        assert!(!procs.is_process_running("discord.exe"));
        assert!(!BrokenTable.is_process_running("slack.exe"));
    }

    #[test]
    fn test_platform_display_names() {
        assert_eq!(Platform::Restricted.to_string(), "restricted");
        assert_eq!(Platform::Open.to_string(), "open");
    }
}
