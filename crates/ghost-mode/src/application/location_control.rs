//! LocationControl: location obfuscation with a single-use snapshot.
//!
//! `activate` captures the current location state before writing the
//! "location disabled" marker; `deactivate` consumes that snapshot to write
//! the marker back.  Without a snapshot there is nothing to restore and
//! `deactivate` fails.
//!
//! Platforms without location spoofing use
//! [`LocationControl::randomize_network_identity`] in its place; the
//! orchestrator makes that choice.

use std::sync::Arc;

use ghost_core::{subsystem, LocationSnapshot, SubsystemOutcome};
use tracing::{info, warn};

use crate::application::capabilities::LocationCapability;

/// Fixed spoof coordinates.  Absent values are randomized per activation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpoofCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Adapter over a [`LocationCapability`].
pub struct LocationControl {
    capability: Arc<dyn LocationCapability>,
    coordinates: SpoofCoordinates,
    snapshot: Option<LocationSnapshot>,
}

impl LocationControl {
    pub fn new(capability: Arc<dyn LocationCapability>, coordinates: SpoofCoordinates) -> Self {
        Self {
            capability,
            coordinates,
            snapshot: None,
        }
    }

    pub fn supports_spoofing(&self) -> bool {
        self.capability.supports_location_spoofing()
    }

    /// The captured snapshot awaiting restoration, if any.
    pub fn snapshot(&self) -> Option<&LocationSnapshot> {
        self.snapshot.as_ref()
    }

    /// Raw state for the audit trail; `()` where spoofing is unsupported.
    pub fn current_state(&self) -> LocationSnapshot {
        if self.supports_spoofing() {
            self.capability.current_location_state()
        } else {
            LocationSnapshot::empty()
        }
    }

    /// Captures the current state, then writes the disabled marker.
    pub fn activate(&mut self) -> SubsystemOutcome {
        if !self.supports_spoofing() {
            warn!("location spoofing not supported on this platform");
            return SubsystemOutcome::failed(
                subsystem::LOCATION,
                "location spoofing not supported on this platform",
            );
        }

        let snapshot = self.capability.current_location_state();
        info!("captured location state {snapshot}");
        self.snapshot = Some(snapshot);

        let result = self
            .capability
            .spoof_location(self.coordinates.latitude, self.coordinates.longitude);
        SubsystemOutcome::from_capability(subsystem::LOCATION, &result)
    }

    /// Restores the marker from the captured snapshot, consuming it.
    pub fn deactivate(&mut self) -> SubsystemOutcome {
        let Some(snapshot) = self.snapshot.take() else {
            warn!("no location snapshot captured; nothing to restore");
            return SubsystemOutcome::failed(
                subsystem::LOCATION,
                "no location snapshot captured; nothing to restore",
            );
        };

        let result = self.capability.restore_location(&snapshot);
        if result.succeeded {
            info!("restored original location settings from {snapshot}");
        }
        SubsystemOutcome::from_capability(subsystem::LOCATION, &result)
    }

    /// Network identity randomization, the positional stand-in for
    /// location obfuscation.
    pub fn randomize_network_identity(&self, interface: &str) -> SubsystemOutcome {
        let result = self.capability.randomize_network_identity(interface);
        SubsystemOutcome::from_capability(subsystem::NETWORK_IDENTITY, &result)
    }
}
