//! Audit events.
//!
//! One [`AuditEvent`] is created per transition by the orchestrator and
//! appended to the audit sink.  Events are never mutated.
//!
//! # Line format
//!
//! ```text
//! 2024-05-01 09:30:00.000 - Activated Ghost Mode - hardware_ok=true, location_ok=false, location_state=(1,), terminated=["zoom.exe"] | outcomes=[hardware:ok (...); processes:ok (...); location:failed (...)]
//! 2024-05-01 10:00:00.000 - Deactivated Ghost Mode - hardware_restored=true, location_restored=true, location_state=(1,), still_running=[] | outcomes=[...]
//! ```
//!
//! The fields before `|` are fixed; the `outcomes` segment lists every
//! subsystem outcome in invocation order.  `location_state` is the raw
//! snapshot, not reformatted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::outcome::{subsystem, SubsystemOutcome};
use crate::domain::snapshot::LocationSnapshot;
use crate::domain::state::Direction;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A single audit-trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    id: Uuid,
    timestamp: DateTime<Utc>,
    direction: Direction,
    outcomes: Vec<SubsystemOutcome>,
    location_state: LocationSnapshot,
    /// Terminated names on activation, still-running targets on deactivation.
    processes: Vec<String>,
}

impl AuditEvent {
    /// Creates an event stamped with the current wall-clock time.
    pub fn new(
        direction: Direction,
        outcomes: Vec<SubsystemOutcome>,
        location_state: LocationSnapshot,
        processes: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            direction,
            outcomes,
            location_state,
            processes,
        }
    }

    /// Replaces the timestamp; used for reproducible rendering.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn outcomes(&self) -> &[SubsystemOutcome] {
        &self.outcomes
    }

    pub fn location_state(&self) -> &LocationSnapshot {
        &self.location_state
    }

    pub fn processes(&self) -> &[String] {
        &self.processes
    }

    pub fn hardware_ok(&self) -> bool {
        self.succeeded(subsystem::HARDWARE)
    }

    /// Location outcome, or network identity where that replaced it.
    /// `false` when neither ran.
    pub fn location_ok(&self) -> bool {
        self.succeeded(subsystem::LOCATION) || self.succeeded(subsystem::NETWORK_IDENTITY)
    }

    fn succeeded(&self, name: &str) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.name() == name && o.succeeded())
    }

    /// Renders the event as one audit line (no trailing newline).
    pub fn to_line(&self) -> String {
        let (action, hw_key, loc_key, proc_key) = match self.direction {
            Direction::Activation => ("Activated", "hardware_ok", "location_ok", "terminated"),
            Direction::Deactivation => (
                "Deactivated",
                "hardware_restored",
                "location_restored",
                "still_running",
            ),
        };
        let outcomes = self
            .outcomes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        format!(
            "{ts} - {action} Ghost Mode - {hw_key}={hw}, {loc_key}={loc}, location_state={state}, {proc_key}={procs:?} | outcomes=[{outcomes}]",
            ts = self.timestamp.format(TIMESTAMP_FORMAT),
            hw = self.hardware_ok(),
            loc = self.location_ok(),
            state = self.location_state,
            procs = self.processes,
        )
    }
}
