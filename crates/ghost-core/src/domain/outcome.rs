//! Subsystem outcomes and the per-transition report.
//!
//! # Two levels of result (for beginners)
//!
//! A *capability provider* (the code that actually runs `modprobe`, edits the
//! registry or kills a process) returns a [`CapabilityResult`]: a boolean
//! plus a diagnostic string.  It never returns `Err` and never panics for an
//! expected operational failure such as "no camera present".
//!
//! A *subsystem adapter* (hardware, processes, location) combines one or more
//! capability results into a single [`SubsystemOutcome`].  The orchestrator
//! collects the outcomes of one transition, in fixed order, into a
//! [`TransitionReport`].
//!
//! # Outcome kinds
//!
//! `succeeded` alone cannot tell a real success from a stub that merely
//! claims success (process restoration, for instance, is not implemented and
//! always "succeeds").  [`OutcomeKind::Unsupported`] marks those stubs so the
//! audit trail and the tests can tell them apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::state::{Direction, GhostState};
use crate::error::{FaultKind, GhostError};

/// Canonical subsystem names, used as [`SubsystemOutcome::name`].
pub mod subsystem {
    pub const HARDWARE: &str = "hardware";
    pub const PROCESSES: &str = "processes";
    pub const LOCATION: &str = "location";
    /// Replaces [`LOCATION`] on platforms without location spoofing.
    pub const NETWORK_IDENTITY: &str = "network_identity";
}

// ── Capability boundary ───────────────────────────────────────────────────────

/// Result of a single capability call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityResult {
    pub succeeded: bool,
    pub detail: String,
    /// Set when the call failed, or when the capability does not exist here.
    pub fault: Option<FaultKind>,
}

impl CapabilityResult {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            detail: detail.into(),
            fault: None,
        }
    }

    pub fn failed(error: &GhostError) -> Self {
        Self {
            succeeded: false,
            detail: error.to_string(),
            fault: Some(error.kind()),
        }
    }

    /// Shorthand for a [`GhostError::CapabilityUnavailable`] result.
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::failed(&GhostError::CapabilityUnavailable(what.into()))
    }

    /// `true` when the capability does not exist on this platform.
    pub fn is_unavailable(&self) -> bool {
        self.fault == Some(FaultKind::CapabilityUnavailable)
    }
}

impl From<Result<String, GhostError>> for CapabilityResult {
    fn from(result: Result<String, GhostError>) -> Self {
        match result {
            Ok(detail) => Self::ok(detail),
            Err(e) => Self::failed(&e),
        }
    }
}

// ── Subsystem outcome ─────────────────────────────────────────────────────────

/// How a subsystem call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Completed,
    Failed,
    /// The operation is a documented no-op on this platform or not
    /// implemented at all.  Counts as succeeded.
    Unsupported,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Completed => f.write_str("ok"),
            OutcomeKind::Failed => f.write_str("failed"),
            OutcomeKind::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// The outcome of one adapter invocation.  Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemOutcome {
    name: String,
    succeeded: bool,
    kind: OutcomeKind,
    detail: String,
}

impl SubsystemOutcome {
    pub fn completed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            kind: OutcomeKind::Completed,
            detail: detail.into(),
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: false,
            kind: OutcomeKind::Failed,
            detail: detail.into(),
        }
    }

    pub fn unsupported(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            kind: OutcomeKind::Unsupported,
            detail: detail.into(),
        }
    }

    /// Lifts a single capability result into an outcome.
    pub fn from_capability(name: impl Into<String>, result: &CapabilityResult) -> Self {
        if result.succeeded {
            Self::completed(name, result.detail.clone())
        } else {
            Self::failed(name, result.detail.clone())
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == OutcomeKind::Unsupported
    }
}

impl fmt::Display for SubsystemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.name, self.kind, self.detail)
    }
}

// ── Transition report ─────────────────────────────────────────────────────────

/// Ordered outcomes of one transition plus the state it produced.
///
/// Returned to the caller and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    direction: Direction,
    outcomes: Vec<SubsystemOutcome>,
    state: GhostState,
}

/// Report of an `activate` call.
pub type ActivationResult = TransitionReport;
/// Report of a `deactivate` call.
pub type DeactivationResult = TransitionReport;

impl TransitionReport {
    pub fn new(direction: Direction, outcomes: Vec<SubsystemOutcome>, state: GhostState) -> Self {
        Self {
            direction,
            outcomes,
            state,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn outcomes(&self) -> &[SubsystemOutcome] {
        &self.outcomes
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    /// Looks up an outcome by subsystem name.
    pub fn outcome(&self, name: &str) -> Option<&SubsystemOutcome> {
        self.outcomes.iter().find(|o| o.name() == name)
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(SubsystemOutcome::succeeded)
    }

    /// One short human-readable line per outcome, in outcome order.
    pub fn status_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| status_line(self.direction, o))
            .collect()
    }
}

fn status_line(direction: Direction, outcome: &SubsystemOutcome) -> String {
    let (label, done, verb) = match (direction, outcome.name()) {
        (Direction::Activation, subsystem::HARDWARE) => ("Hardware", "disabled", "disable"),
        (Direction::Activation, subsystem::PROCESSES) => {
            ("Processes", "terminated", "termination")
        }
        (Direction::Activation, subsystem::LOCATION) => ("Location", "spoofed", "spoof"),
        (Direction::Activation, subsystem::NETWORK_IDENTITY) => ("MAC", "randomized", "randomize"),
        (Direction::Deactivation, subsystem::HARDWARE) => ("Hardware", "restored", "restore"),
        (Direction::Deactivation, subsystem::PROCESSES) => ("Processes", "restored", "restore"),
        (Direction::Deactivation, subsystem::LOCATION) => ("Location", "restored", "restore"),
        (_, other) => return format!("{other}: {}", outcome.kind()),
    };

    match outcome.kind() {
        OutcomeKind::Completed => format!("{label} {done}"),
        OutcomeKind::Failed => format!("{label} {verb} failed"),
        OutcomeKind::Unsupported => format!("{label} {done} (no-op on this platform)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_result_from_err_carries_fault_kind() {
        // Arrange
        let result: Result<String, GhostError> =
            Err(GhostError::AccessDenied("pid 42".to_string()));

        // Act
        let cap = CapabilityResult::from(result);

        // Assert
        assert!(!cap.succeeded);
        assert_eq!(cap.fault, Some(FaultKind::AccessDenied));
        assert!(cap.detail.contains("pid 42"));
    }

    #[test]
    fn test_capability_result_unavailable_is_flagged() {
        let cap = CapabilityResult::unavailable("gps spoofing");
        assert!(!cap.succeeded);
        assert!(cap.is_unavailable());
        assert!(!CapabilityResult::ok("done").is_unavailable());
    }

    #[test]
    fn test_unsupported_outcome_counts_as_succeeded_but_is_distinguishable() {
        let stub = SubsystemOutcome::unsupported(subsystem::PROCESSES, "restoration not implemented");
        let real = SubsystemOutcome::completed(subsystem::PROCESSES, "terminated 1 process");

        assert!(stub.succeeded());
        assert!(real.succeeded());
        assert!(stub.is_unsupported());
        assert!(!real.is_unsupported());
        assert_ne!(stub.kind(), real.kind());
    }

    #[test]
    fn test_from_capability_maps_failure_to_failed_kind() {
        let cap = CapabilityResult::failed(&GhostError::ExecutionFailure("exit 1".into()));
        let outcome = SubsystemOutcome::from_capability(subsystem::LOCATION, &cap);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert_eq!(outcome.name(), "location");
    }

    #[test]
    fn test_outcome_display_includes_name_kind_and_detail() {
        let outcome = SubsystemOutcome::failed(subsystem::HARDWARE, "camera: exit 1");
        assert_eq!(outcome.to_string(), "hardware:failed (camera: exit 1)");
    }

    #[test]
    fn test_report_lookup_and_all_succeeded() {
        // Arrange
        let report = TransitionReport::new(
            Direction::Activation,
            vec![
                SubsystemOutcome::completed(subsystem::HARDWARE, "ok"),
                SubsystemOutcome::failed(subsystem::PROCESSES, "access denied"),
            ],
            GhostState::Active,
        );

        // Assert
        assert!(report.outcome(subsystem::HARDWARE).is_some());
        assert!(report.outcome(subsystem::LOCATION).is_none());
        assert!(!report.all_succeeded());
        assert_eq!(report.state(), GhostState::Active);
    }

    #[test]
    fn test_activation_status_lines_follow_outcome_order() {
        let report = TransitionReport::new(
            Direction::Activation,
            vec![
                SubsystemOutcome::completed(subsystem::HARDWARE, ""),
                SubsystemOutcome::failed(subsystem::PROCESSES, ""),
                SubsystemOutcome::completed(subsystem::NETWORK_IDENTITY, ""),
            ],
            GhostState::Active,
        );

        assert_eq!(
            report.status_lines(),
            vec![
                "Hardware disabled".to_string(),
                "Processes termination failed".to_string(),
                "MAC randomized".to_string(),
            ]
        );
    }

    #[test]
    fn test_deactivation_status_lines_mark_stubs() {
        let report = TransitionReport::new(
            Direction::Deactivation,
            vec![
                SubsystemOutcome::completed(subsystem::HARDWARE, ""),
                SubsystemOutcome::unsupported(subsystem::PROCESSES, ""),
                SubsystemOutcome::failed(subsystem::LOCATION, ""),
            ],
            GhostState::Inactive,
        );

        let lines = report.status_lines();
        assert_eq!(lines[0], "Hardware restored");
        assert_eq!(lines[1], "Processes restored (no-op on this platform)");
        assert_eq!(lines[2], "Location restore failed");
    }
}
