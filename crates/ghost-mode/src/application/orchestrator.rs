//! GhostModeOrchestrator: the activation/deactivation state machine.
//!
//! # State machine (for beginners)
//!
//! ```text
//!              activate()                      deactivate()
//! Inactive ──► [Activating] ──► Active ──► [Deactivating] ──► Inactive
//! ```
//!
//! The bracketed states exist only while `activate` / `deactivate` run.
//! They are never observable: the whole transition happens under one mutex,
//! so a concurrent caller waits and then sees the finished state.
//!
//! # Fail-open policy
//!
//! Every adapter runs on every transition, in fixed order
//! (hardware → processes → location), with no early exit.  The global state
//! is then set unconditionally: `Active` after an activation, `Inactive`
//! after a deactivation, however many protections failed.  The state is the
//! user's intent; the per-subsystem truth lives in the returned
//! [`TransitionReport`] and in the audit trail.
//!
//! # Blocking
//!
//! Capability providers may run external commands and block the calling
//! thread.  Callers that need to stay responsive should run the whole
//! `activate` / `deactivate` / `toggle` call on a worker thread (for example
//! `tokio::task::spawn_blocking`) and only hand the finished report back.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ghost_core::{
    ActivationResult, AuditEvent, DeactivationResult, Direction, GhostState, KilledProcessRecord,
    LocationSnapshot, SubsystemOutcome, TargetProcessSet, TransitionReport,
};
use tracing::{debug, info, warn};

use crate::application::{
    audit::AuditSink,
    capabilities::{CapabilitySet, Platform},
    hardware_control::HardwareControl,
    location_control::{LocationControl, SpoofCoordinates},
    process_control::ProcessControl,
};

/// Orchestrator tuning taken from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Interface randomized where location spoofing is unavailable.
    pub network_interface: String,
    pub coordinates: SpoofCoordinates,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            network_interface: "wlan0".to_string(),
            coordinates: SpoofCoordinates::default(),
        }
    }
}

/// Everything guarded by the transition lock.
struct Inner {
    state: GhostState,
    hardware: HardwareControl,
    processes: ProcessControl,
    location: LocationControl,
    network_interface: String,
}

/// Drives the three subsystems through Ghost Mode transitions.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct GhostModeOrchestrator {
    platform: Platform,
    inner: Mutex<Inner>,
    audit: Arc<dyn AuditSink>,
}

impl GhostModeOrchestrator {
    /// Builds the adapters over `capabilities`.  Starts `Inactive` with an
    /// empty target list.
    pub fn new(
        capabilities: CapabilitySet,
        audit: Arc<dyn AuditSink>,
        settings: OrchestratorSettings,
    ) -> Self {
        let inner = Inner {
            state: GhostState::Inactive,
            hardware: HardwareControl::new(capabilities.hardware),
            processes: ProcessControl::new(capabilities.processes, TargetProcessSet::new()),
            location: LocationControl::new(capabilities.location, settings.coordinates),
            network_interface: settings.network_interface,
        };
        Self {
            platform: capabilities.platform,
            inner: Mutex::new(inner),
            audit,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn current_state(&self) -> GhostState {
        self.lock().state
    }

    /// Replaces the target list from a newline-delimited file.
    ///
    /// A missing or unreadable file is logged and leaves the list empty.
    pub fn load_target_processes(&self, path: &Path) {
        self.lock().processes.load_targets(path);
    }

    pub fn set_target_processes(&self, targets: TargetProcessSet) {
        self.lock().processes.set_targets(targets);
    }

    pub fn target_processes(&self) -> TargetProcessSet {
        self.lock().processes.targets().clone()
    }

    /// Termination record of the latest activation.
    pub fn killed_processes(&self) -> KilledProcessRecord {
        self.lock().processes.killed().clone()
    }

    /// Raw location state, `()` where spoofing is unsupported.
    pub fn location_state(&self) -> LocationSnapshot {
        self.lock().location.current_state()
    }

    /// Hardware status probe (an `Unsupported` stub).
    pub fn hardware_status(&self) -> SubsystemOutcome {
        self.lock().hardware.status()
    }

    /// Runs every protection and sets the state to `Active`.
    pub fn activate(&self) -> ActivationResult {
        let mut guard = self.lock();
        self.run_activation(&mut guard)
    }

    /// Runs every restoration and sets the state to `Inactive`.
    pub fn deactivate(&self) -> DeactivationResult {
        let mut guard = self.lock();
        self.run_deactivation(&mut guard)
    }

    /// Activates when inactive, deactivates otherwise.  Returns the new state.
    pub fn toggle(&self) -> GhostState {
        self.toggle_report().state()
    }

    /// [`toggle`](Self::toggle), returning the full report.
    pub fn toggle_report(&self) -> TransitionReport {
        let mut guard = self.lock();
        match guard.state.toggle_direction() {
            Direction::Activation => self.run_activation(&mut guard),
            Direction::Deactivation => self.run_deactivation(&mut guard),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic mid-transition must not wedge the switch.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_activation(&self, inner: &mut Inner) -> ActivationResult {
        info!("Activating Ghost Mode");
        debug!("{} -> activating", inner.state);

        let hardware = inner.hardware.activate();
        let processes = inner.processes.activate();
        let location = if inner.location.supports_spoofing() {
            inner.location.activate()
        } else {
            inner
                .location
                .randomize_network_identity(&inner.network_interface)
        };
        let outcomes = vec![hardware, processes, location];

        inner.state = Direction::Activation.target_state();

        let event = AuditEvent::new(
            Direction::Activation,
            outcomes.clone(),
            inner.location.current_state(),
            inner.processes.killed().terminated(),
        );
        self.audit.record(&event);
        log_failures(&outcomes);

        TransitionReport::new(Direction::Activation, outcomes, inner.state)
    }

    fn run_deactivation(&self, inner: &mut Inner) -> DeactivationResult {
        info!("Deactivating Ghost Mode");
        debug!("{} -> deactivating", inner.state);

        let mut outcomes = vec![inner.hardware.deactivate(), inner.processes.deactivate()];
        if inner.location.supports_spoofing() {
            outcomes.push(inner.location.deactivate());
        }

        inner.state = Direction::Deactivation.target_state();

        let still_running = inner.processes.still_running();
        if !still_running.is_empty() {
            info!("target processes still running: {still_running:?}");
        }
        let event = AuditEvent::new(
            Direction::Deactivation,
            outcomes.clone(),
            inner.location.current_state(),
            still_running,
        );
        self.audit.record(&event);
        log_failures(&outcomes);

        TransitionReport::new(Direction::Deactivation, outcomes, inner.state)
    }
}

fn log_failures(outcomes: &[SubsystemOutcome]) {
    for outcome in outcomes.iter().filter(|o| !o.succeeded()) {
        warn!("{} did not complete: {}", outcome.name(), outcome.detail());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::audit_log::memory::MemoryAuditSink;
    use crate::infrastructure::capabilities::mock::{MockHardware, MockLocation, MockProcesses};
    use ghost_core::subsystem;

    fn make(
        hardware: MockHardware,
        processes: MockProcesses,
        location: MockLocation,
    ) -> (GhostModeOrchestrator, Arc<MemoryAuditSink>) {
        let platform = if location.spoofing_supported() {
            Platform::Restricted
        } else {
            Platform::Open
        };
        let sink = Arc::new(MemoryAuditSink::new());
        let caps = CapabilitySet::new(
            platform,
            Arc::new(hardware),
            Arc::new(processes),
            Arc::new(location),
        );
        let orch = GhostModeOrchestrator::new(
            caps,
            Arc::clone(&sink) as Arc<dyn AuditSink>,
            OrchestratorSettings::default(),
        );
        (orch, sink)
    }

    #[test]
    fn test_starts_inactive() {
        let (orch, sink) = make(
            MockHardware::new(),
            MockProcesses::new(&[]),
            MockLocation::restricted(Some(1)),
        );
        assert_eq!(orch.current_state(), GhostState::Inactive);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_activate_runs_subsystems_in_fixed_order() {
        // Arrange
        let (orch, _sink) = make(
            MockHardware::new(),
            MockProcesses::new(&[]),
            MockLocation::restricted(Some(1)),
        );

        // Act
        let report = orch.activate();

        // Assert
        let names: Vec<&str> = report.outcomes().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["hardware", "processes", "location"]);
        assert_eq!(report.direction(), Direction::Activation);
    }

    #[test]
    fn test_activate_without_spoofing_uses_network_identity() {
        let (orch, _sink) = make(
            MockHardware::new(),
            MockProcesses::new(&[]),
            MockLocation::open(),
        );

        let report = orch.activate();

        assert_eq!(report.outcomes().len(), 3);
        assert!(report.outcome(subsystem::NETWORK_IDENTITY).is_some());
        assert!(report.outcome(subsystem::LOCATION).is_none());
    }

    #[test]
    fn test_every_transition_emits_exactly_one_audit_event() {
        let (orch, sink) = make(
            MockHardware::new(),
            MockProcesses::new(&[]),
            MockLocation::restricted(Some(1)),
        );

        orch.activate();
        orch.deactivate();
        orch.toggle();

        let directions: Vec<Direction> = sink.events().iter().map(|e| e.direction()).collect();
        assert_eq!(
            directions,
            vec![Direction::Activation, Direction::Deactivation, Direction::Activation]
        );
    }

    #[test]
    fn test_toggle_alternates_state() {
        let (orch, _sink) = make(
            MockHardware::failing(),
            MockProcesses::new(&[]),
            MockLocation::open().with_network_failure(),
        );

        assert_eq!(orch.toggle(), GhostState::Active);
        assert_eq!(orch.toggle(), GhostState::Inactive);
        assert_eq!(orch.current_state(), GhostState::Inactive);
    }

    #[test]
    fn test_hardware_status_is_reported_as_unsupported() {
        let (orch, _sink) = make(
            MockHardware::new(),
            MockProcesses::new(&[]),
            MockLocation::open(),
        );
        orch.activate();

        let status = orch.hardware_status();

        assert!(status.is_unsupported());
        assert!(status.detail().contains("devices_disabled=true"));
    }
}
