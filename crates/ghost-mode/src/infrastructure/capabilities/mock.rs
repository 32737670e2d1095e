//! In-memory capability providers for tests.
//!
//! # Why hand-written mocks?
//!
//! The adapter unit tests use `mockall` expectations.  Integration tests need
//! something different: providers that *behave* like a small fake machine
//! (a process table that shrinks when processes are killed, a location value
//! that changes when written) and can be inspected afterwards.  These mocks
//! keep that state behind `Mutex`es so they can be shared through `Arc` with
//! the orchestrator while the test keeps its own handle.
//!
//! # Usage in tests
//!
//! ```ignore
//! let procs = Arc::new(MockProcesses::new(&["zoom.exe", "chrome.exe"]));
//! let caps = CapabilitySet::new(
//!     Platform::Restricted,
//!     Arc::new(MockHardware::new()),
//!     procs.clone(),
//!     Arc::new(MockLocation::restricted(Some(1))),
//! );
//! // ... activate ...
//! assert_eq!(procs.running(), vec!["chrome.exe"]);
//! ```

use std::sync::{Mutex, MutexGuard};

use ghost_core::{CapabilityResult, GhostError, LocationSnapshot};

use crate::application::capabilities::{
    HardwareCapability, LocationCapability, ProcessCapability, ProcessEntry,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ── Hardware ──────────────────────────────────────────────────────────────────

/// How [`MockHardware`] answers restore calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreBehaviour {
    Succeeds,
    Fails,
    /// No restoration path, as on the open platform.
    Unavailable,
}

/// Records every hardware call by name.
#[derive(Debug)]
pub struct MockHardware {
    disable_fails: bool,
    restore: RestoreBehaviour,
    calls: Mutex<Vec<&'static str>>,
}

impl MockHardware {
    /// Every call succeeds.
    pub fn new() -> Self {
        Self {
            disable_fails: false,
            restore: RestoreBehaviour::Succeeds,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every disable and restore call fails.
    pub fn failing() -> Self {
        Self {
            disable_fails: true,
            restore: RestoreBehaviour::Fails,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_restore(mut self, restore: RestoreBehaviour) -> Self {
        self.restore = restore;
        self
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    fn disable(&self, call: &'static str) -> CapabilityResult {
        lock(&self.calls).push(call);
        if self.disable_fails {
            CapabilityResult::failed(&GhostError::ExecutionFailure(format!("{call} failed")))
        } else {
            CapabilityResult::ok(format!("{call} ok"))
        }
    }

    fn restore(&self, call: &'static str) -> CapabilityResult {
        lock(&self.calls).push(call);
        match self.restore {
            RestoreBehaviour::Succeeds => CapabilityResult::ok(format!("{call} ok")),
            RestoreBehaviour::Fails => {
                CapabilityResult::failed(&GhostError::AccessDenied(format!("{call} refused")))
            }
            RestoreBehaviour::Unavailable => CapabilityResult::unavailable(call),
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareCapability for MockHardware {
    fn disable_camera(&self) -> CapabilityResult {
        self.disable("disable_camera")
    }

    fn disable_microphone(&self) -> CapabilityResult {
        self.disable("disable_microphone")
    }

    fn restore_camera(&self) -> CapabilityResult {
        self.restore("restore_camera")
    }

    fn restore_microphone(&self) -> CapabilityResult {
        self.restore("restore_microphone")
    }
}

// ── Processes ─────────────────────────────────────────────────────────────────

/// A fake process table.  Terminated processes disappear from it.
#[derive(Debug)]
pub struct MockProcesses {
    table: Mutex<Vec<ProcessEntry>>,
    terminated: Mutex<Vec<String>>,
    next_pid: Mutex<u32>,
    /// Lowercased names whose termination is refused.
    denied: Vec<String>,
    enumeration_fails: bool,
}

impl MockProcesses {
    /// A table holding one process per name, pids starting at 1000.
    pub fn new(names: &[&str]) -> Self {
        let table = names
            .iter()
            .zip(1000u32..)
            .map(|(name, pid)| ProcessEntry {
                pid,
                name: name.to_string(),
            })
            .collect::<Vec<_>>();
        let next_pid = 1000 + table.len() as u32;
        Self {
            table: Mutex::new(table),
            terminated: Mutex::new(Vec::new()),
            next_pid: Mutex::new(next_pid),
            denied: Vec::new(),
            enumeration_fails: false,
        }
    }

    /// Termination of `name` (any case) is refused with `AccessDenied`.
    pub fn with_denied(mut self, name: &str) -> Self {
        self.denied.push(name.to_lowercase());
        self
    }

    /// The process table cannot be read.
    pub fn with_enumeration_failure(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    /// Starts another process named `name`.
    pub fn spawn(&self, name: &str) -> u32 {
        let mut next = lock(&self.next_pid);
        let pid = *next;
        *next += 1;
        lock(&self.table).push(ProcessEntry {
            pid,
            name: name.to_string(),
        });
        pid
    }

    /// Names still in the table, in start order.
    pub fn running(&self) -> Vec<String> {
        lock(&self.table).iter().map(|p| p.name.clone()).collect()
    }

    /// Names of terminated processes, in termination order.
    pub fn terminated(&self) -> Vec<String> {
        lock(&self.terminated).clone()
    }
}

impl ProcessCapability for MockProcesses {
    fn list_processes(&self) -> Result<Vec<ProcessEntry>, GhostError> {
        if self.enumeration_fails {
            return Err(GhostError::ExecutionFailure("process table unreadable".into()));
        }
        Ok(lock(&self.table).clone())
    }

    fn terminate(&self, pid: u32) -> Result<(), GhostError> {
        let mut table = lock(&self.table);
        let index = table
            .iter()
            .position(|p| p.pid == pid)
            .ok_or_else(|| GhostError::ExecutionFailure(format!("no such process: pid {pid}")))?;

        if self.denied.contains(&table[index].name.to_lowercase()) {
            return Err(GhostError::AccessDenied(format!(
                "pid {pid} ({})",
                table[index].name
            )));
        }

        let entry = table.remove(index);
        lock(&self.terminated).push(entry.name);
        Ok(())
    }
}

// ── Location ──────────────────────────────────────────────────────────────────

/// A fake location service with a single `SensorPermissionState`-like value.
#[derive(Debug)]
pub struct MockLocation {
    spoofing: bool,
    permission_state: Mutex<Option<u32>>,
    spoof_fails: bool,
    network_fails: bool,
    restores: Mutex<Vec<LocationSnapshot>>,
    randomized: Mutex<Vec<String>>,
}

impl MockLocation {
    /// Spoofing supported; the value starts at `initial`.
    pub fn restricted(initial: Option<u32>) -> Self {
        Self {
            spoofing: true,
            permission_state: Mutex::new(initial),
            spoof_fails: false,
            network_fails: false,
            restores: Mutex::new(Vec::new()),
            randomized: Mutex::new(Vec::new()),
        }
    }

    /// No spoofing; network identity randomization succeeds.
    pub fn open() -> Self {
        Self {
            spoofing: false,
            ..Self::restricted(None)
        }
    }

    pub fn with_spoof_failure(mut self) -> Self {
        self.spoof_fails = true;
        self
    }

    pub fn with_network_failure(mut self) -> Self {
        self.network_fails = true;
        self
    }

    pub fn spoofing_supported(&self) -> bool {
        self.spoofing
    }

    /// The current fake registry value.
    pub fn permission_state(&self) -> Option<u32> {
        *lock(&self.permission_state)
    }

    /// Snapshots passed to `restore_location`, in call order.
    pub fn restores(&self) -> Vec<LocationSnapshot> {
        lock(&self.restores).clone()
    }

    /// Interfaces passed to `randomize_network_identity`.
    pub fn randomized(&self) -> Vec<String> {
        lock(&self.randomized).clone()
    }
}

impl LocationCapability for MockLocation {
    fn supports_location_spoofing(&self) -> bool {
        self.spoofing
    }

    fn spoof_location(&self, _latitude: Option<f64>, _longitude: Option<f64>) -> CapabilityResult {
        if !self.spoofing {
            return CapabilityResult::unavailable("location spoofing");
        }
        if self.spoof_fails {
            return CapabilityResult::failed(&GhostError::AccessDenied("sensor override key".into()));
        }
        *lock(&self.permission_state) = Some(0);
        CapabilityResult::ok("location services disabled")
    }

    fn restore_location(&self, snapshot: &LocationSnapshot) -> CapabilityResult {
        if !self.spoofing {
            return CapabilityResult::unavailable("location restore");
        }
        lock(&self.restores).push(snapshot.clone());
        let value = snapshot.first_value().unwrap_or(1);
        *lock(&self.permission_state) = Some(value);
        CapabilityResult::ok(format!("restored to {value}"))
    }

    fn current_location_state(&self) -> LocationSnapshot {
        LocationSnapshot::single(*lock(&self.permission_state))
    }

    fn randomize_network_identity(&self, interface: &str) -> CapabilityResult {
        if self.spoofing {
            return CapabilityResult::unavailable("network identity randomization");
        }
        lock(&self.randomized).push(interface.to_string());
        if self.network_fails {
            CapabilityResult::failed(&GhostError::ExecutionFailure(format!(
                "macchanger failed on {interface}"
            )))
        } else {
            CapabilityResult::ok(format!("{interface} randomized"))
        }
    }
}
