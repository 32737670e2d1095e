//! Integration tests for the Ghost Mode orchestrator.
//!
//! # Purpose
//!
//! These tests drive `GhostModeOrchestrator` through its public API with the
//! in-memory providers from `infrastructure::capabilities::mock`, exactly the
//! way the console drives it with the real providers.  They verify:
//!
//! - Fail-open activation: every combination of subsystem failures still
//!   ends in `Active` with three outcomes.
//! - Round trips: activate followed by deactivate restores the prior state
//!   and the original location value.
//! - Process matching ignores case, and the termination record reflects
//!   what actually happened.
//! - Deactivating without a prior activation is safe.
//! - Concurrent toggles are serialized.
//!
//! # Fake machine
//!
//! ```text
//! MockHardware   – records calls, can be told to fail
//! MockProcesses  – a process table that shrinks as processes are killed
//! MockLocation   – one SensorPermissionState-like value, or no spoofing
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use ghost_core::{
    subsystem, CapabilityResult, Direction, GhostState, LocationSnapshot, OutcomeKind,
    TargetProcessSet,
};
use ghost_mode::application::{
    audit::AuditSink,
    capabilities::{CapabilitySet, HardwareCapability, Platform},
    orchestrator::{GhostModeOrchestrator, OrchestratorSettings},
};
use ghost_mode::infrastructure::{
    audit_log::memory::MemoryAuditSink,
    capabilities::mock::{MockHardware, MockLocation, MockProcesses, RestoreBehaviour},
};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Rig {
    orchestrator: GhostModeOrchestrator,
    processes: Arc<MockProcesses>,
    location: Arc<MockLocation>,
    audit: Arc<MemoryAuditSink>,
}

fn rig(
    hardware: impl HardwareCapability + 'static,
    processes: MockProcesses,
    location: MockLocation,
    targets: &[&str],
) -> Rig {
    let platform = if location.spoofing_supported() {
        Platform::Restricted
    } else {
        Platform::Open
    };
    let processes = Arc::new(processes);
    let location = Arc::new(location);
    let audit = Arc::new(MemoryAuditSink::new());

    let caps = CapabilitySet::new(
        platform,
        Arc::new(hardware),
        Arc::clone(&processes) as _,
        Arc::clone(&location) as _,
    );
    let orchestrator = GhostModeOrchestrator::new(
        caps,
        Arc::clone(&audit) as Arc<dyn AuditSink>,
        OrchestratorSettings::default(),
    );
    orchestrator.set_target_processes(TargetProcessSet::from_names(targets.iter().copied()));

    Rig {
        orchestrator,
        processes,
        location,
        audit,
    }
}

// ── Fail-open activation ──────────────────────────────────────────────────────

/// Every success/failure combination of the three subsystems ends `Active`
/// with exactly three outcomes, on both platforms.
#[test]
fn test_activation_is_fail_open_for_every_outcome_combination() {
    for mask in 0..8u8 {
        for spoofing in [true, false] {
            // Arrange
            let hardware_fails = mask & 1 != 0;
            let processes_fail = mask & 2 != 0;
            let location_fails = mask & 4 != 0;

            let hardware = if hardware_fails {
                MockHardware::failing()
            } else {
                MockHardware::new()
            };
            let processes = if processes_fail {
                MockProcesses::new(&["zoom.exe"]).with_denied("zoom.exe")
            } else {
                MockProcesses::new(&["zoom.exe"])
            };
            let location = match (spoofing, location_fails) {
                (true, false) => MockLocation::restricted(Some(1)),
                (true, true) => MockLocation::restricted(Some(1)).with_spoof_failure(),
                (false, false) => MockLocation::open(),
                (false, true) => MockLocation::open().with_network_failure(),
            };
            let r = rig(hardware, processes, location, &["zoom.exe"]);

            // Act
            let report = r.orchestrator.activate();

            // Assert
            assert_eq!(r.orchestrator.current_state(), GhostState::Active, "mask {mask}");
            assert_eq!(report.state(), GhostState::Active);
            assert_eq!(report.outcomes().len(), 3, "mask {mask}, spoofing {spoofing}");
            let expected_ok = [!hardware_fails, !processes_fail, !location_fails];
            let actual_ok: Vec<bool> = report.outcomes().iter().map(|o| o.succeeded()).collect();
            assert_eq!(actual_ok, expected_ok, "mask {mask}, spoofing {spoofing}");
            assert_eq!(r.audit.len(), 1);
        }
    }
}

#[test]
fn test_open_platform_reports_network_identity_in_third_slot() {
    let r = rig(MockHardware::new(), MockProcesses::new(&[]), MockLocation::open(), &[]);

    let report = r.orchestrator.activate();

    assert_eq!(report.outcomes()[2].name(), subsystem::NETWORK_IDENTITY);
    assert_eq!(r.location.randomized(), vec!["wlan0".to_string()]);
    assert!(report.status_lines().contains(&"MAC randomized".to_string()));
}

// ── Round trips ───────────────────────────────────────────────────────────────

#[test]
fn test_activate_then_deactivate_returns_to_prior_state() {
    // Arrange
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&["zoom.exe"]),
        MockLocation::restricted(Some(1)),
        &["zoom.exe"],
    );
    let before = r.orchestrator.current_state();

    // Act
    r.orchestrator.activate();
    r.orchestrator.deactivate();

    // Assert
    assert_eq!(r.orchestrator.current_state(), before);
    assert_eq!(before, GhostState::Inactive);
}

/// Restricted platform: the snapshot `(1,)` is captured, the disabled marker
/// is written, and deactivation writes the original value back.
#[test]
fn test_location_snapshot_is_captured_and_restored() {
    // Arrange
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&[]),
        MockLocation::restricted(Some(1)),
        &[],
    );

    // Act
    let activation = r.orchestrator.activate();
    let marker_during = r.location.permission_state();
    let deactivation = r.orchestrator.deactivate();

    // Assert
    assert!(activation.outcome(subsystem::LOCATION).unwrap().succeeded());
    assert_eq!(marker_during, Some(0));
    assert!(deactivation.outcome(subsystem::LOCATION).unwrap().succeeded());
    assert_eq!(r.location.restores(), vec![LocationSnapshot::single(Some(1))]);
    assert_eq!(r.location.permission_state(), Some(1));

    let events = r.audit.events();
    assert!(events[1].location_ok());
    assert!(r.audit.lines()[1].contains("location_restored=true, location_state=(1,)"));
}

#[test]
fn test_deactivation_outcomes_mark_stubs_as_unsupported() {
    let r = rig(
        MockHardware::new().with_restore(RestoreBehaviour::Unavailable),
        MockProcesses::new(&["zoom.exe"]),
        MockLocation::open(),
        &["zoom.exe"],
    );
    r.orchestrator.activate();

    let report = r.orchestrator.deactivate();

    // Open platform: no location step on the way back.
    assert_eq!(report.outcomes().len(), 2);
    assert!(report.all_succeeded());
    assert!(report.outcomes().iter().all(|o| o.kind() == OutcomeKind::Unsupported));
    // Nothing relaunched.
    assert!(r.processes.running().is_empty());
}

// ── Process matching ──────────────────────────────────────────────────────────

#[test]
fn test_process_matching_ignores_case() {
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&["Zoom.EXE"]),
        MockLocation::restricted(Some(1)),
        &["zoom.exe"],
    );

    r.orchestrator.activate();

    assert_eq!(r.processes.terminated(), vec!["Zoom.EXE".to_string()]);
    assert_eq!(r.orchestrator.killed_processes().get("Zoom.EXE"), Some(true));
}

/// Targets {zoom, teams}, running {zoom, chrome}: only zoom is killed, the
/// outcome succeeds, and teams is not reported as still running later.
#[test]
fn test_only_running_targets_are_terminated() {
    // Arrange
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&["zoom.exe", "chrome.exe"]),
        MockLocation::restricted(Some(1)),
        &["zoom.exe", "teams.exe"],
    );

    // Act
    let activation = r.orchestrator.activate();
    r.orchestrator.deactivate();

    // Assert
    let killed = r.orchestrator.killed_processes();
    assert_eq!(killed.len(), 1);
    assert_eq!(killed.get("zoom.exe"), Some(true));
    assert!(activation.outcome(subsystem::PROCESSES).unwrap().succeeded());
    assert_eq!(r.processes.running(), vec!["chrome.exe".to_string()]);

    let deactivation_event = &r.audit.events()[1];
    assert_eq!(deactivation_event.direction(), Direction::Deactivation);
    assert!(deactivation_event.processes().is_empty());
}

#[test]
fn test_relaunched_target_is_reported_as_still_running() {
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&["slack.exe"]),
        MockLocation::restricted(Some(1)),
        &["slack.exe"],
    );
    r.orchestrator.activate();
    r.processes.spawn("Slack.exe");

    r.orchestrator.deactivate();

    let line = r.audit.lines().pop().unwrap();
    assert!(line.contains("still_running=[\"slack.exe\"]"), "{line}");
}

// ── Safety without prior activation ───────────────────────────────────────────

#[test]
fn test_deactivate_without_activation_reports_location_failure() {
    // Arrange
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&[]),
        MockLocation::restricted(Some(1)),
        &[],
    );

    // Act
    let report = r.orchestrator.deactivate();

    // Assert
    assert_eq!(report.state(), GhostState::Inactive);
    let location = report.outcome(subsystem::LOCATION).unwrap();
    assert!(!location.succeeded());
    assert!(r.location.restores().is_empty());
    assert!(!r.audit.events()[0].location_ok());
}

#[test]
fn test_comment_only_target_file_yields_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("targets.txt");
    std::fs::write(&path, "# a\n\n   # b\n\n").unwrap();
    let r = rig(
        MockHardware::new(),
        MockProcesses::new(&["zoom.exe"]),
        MockLocation::open(),
        &["zoom.exe"],
    );

    r.orchestrator.load_target_processes(&path);

    assert!(r.orchestrator.target_processes().is_empty());
    r.orchestrator.activate();
    assert_eq!(r.processes.running(), vec!["zoom.exe".to_string()]);
}

// ── Concurrency ───────────────────────────────────────────────────────────────

/// Counts how many hardware calls overlap.
#[derive(Default)]
struct OverlapProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Hardware provider that sleeps inside each call.
struct SlowHardware(Arc<OverlapProbe>);

impl SlowHardware {
    fn step(&self) -> CapabilityResult {
        let now = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
        CapabilityResult::ok("slow")
    }
}

impl HardwareCapability for SlowHardware {
    fn disable_camera(&self) -> CapabilityResult {
        self.step()
    }
    fn disable_microphone(&self) -> CapabilityResult {
        self.step()
    }
    fn restore_camera(&self) -> CapabilityResult {
        self.step()
    }
    fn restore_microphone(&self) -> CapabilityResult {
        self.step()
    }
}

#[test]
fn test_concurrent_toggles_are_serialized() {
    // Arrange
    let probe = Arc::new(OverlapProbe::default());
    let r = Arc::new(rig(
        SlowHardware(Arc::clone(&probe)),
        MockProcesses::new(&[]),
        MockLocation::restricted(Some(1)),
        &[],
    ));
    let barrier = Arc::new(Barrier::new(2));

    // Act
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let r = Arc::clone(&r);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                r.orchestrator.toggle()
            })
        })
        .collect();
    let mut results: Vec<GhostState> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_by_key(|s| s.is_active());

    // Assert – one activation then one deactivation, never interleaved
    assert_eq!(results, vec![GhostState::Inactive, GhostState::Active]);
    assert_eq!(r.orchestrator.current_state(), GhostState::Inactive);
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
    let directions: Vec<Direction> = r.audit.events().iter().map(|e| e.direction()).collect();
    assert_eq!(directions, vec![Direction::Activation, Direction::Deactivation]);
}
