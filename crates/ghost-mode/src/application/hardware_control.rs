//! HardwareControl: camera and microphone protection.
//!
//! `activate` always attempts both devices, even when the first one fails.
//! `deactivate` is not an exact inverse: on platforms without a restoration
//! path it reports success with an `Unsupported` outcome.

use std::sync::Arc;

use ghost_core::{subsystem, CapabilityResult, SubsystemOutcome};
use tracing::{info, warn};

use crate::application::capabilities::HardwareCapability;

/// Adapter over a [`HardwareCapability`].
pub struct HardwareControl {
    capability: Arc<dyn HardwareCapability>,
    devices_disabled: bool,
}

impl HardwareControl {
    pub fn new(capability: Arc<dyn HardwareCapability>) -> Self {
        Self {
            capability,
            devices_disabled: false,
        }
    }

    /// `true` after any `activate` call, whatever the individual results.
    pub fn devices_disabled(&self) -> bool {
        self.devices_disabled
    }

    /// Disables camera and microphone.  Succeeds only if both did.
    pub fn activate(&mut self) -> SubsystemOutcome {
        let camera = self.capability.disable_camera();
        let microphone = self.capability.disable_microphone();
        self.devices_disabled = true;

        info!(
            "camera disable success: {}, microphone disable success: {}",
            camera.succeeded, microphone.succeeded
        );

        let detail = describe(&camera, &microphone);
        if camera.succeeded && microphone.succeeded {
            SubsystemOutcome::completed(subsystem::HARDWARE, detail)
        } else {
            SubsystemOutcome::failed(subsystem::HARDWARE, detail)
        }
    }

    /// Restores whatever the platform can restore.
    pub fn deactivate(&mut self) -> SubsystemOutcome {
        let camera = self.capability.restore_camera();
        let microphone = self.capability.restore_microphone();
        self.devices_disabled = false;

        if camera.is_unavailable() && microphone.is_unavailable() {
            info!("no hardware restoration path on this platform");
            return SubsystemOutcome::unsupported(
                subsystem::HARDWARE,
                "no restoration path on this platform",
            );
        }

        let detail = describe(&camera, &microphone);
        let restored = |r: &CapabilityResult| r.succeeded || r.is_unavailable();
        if restored(&camera) && restored(&microphone) {
            SubsystemOutcome::completed(subsystem::HARDWARE, detail)
        } else {
            warn!("hardware restore incomplete: {detail}");
            SubsystemOutcome::failed(subsystem::HARDWARE, detail)
        }
    }

    /// Device status probe.  Not implemented on any platform.
    pub fn status(&self) -> SubsystemOutcome {
        SubsystemOutcome::unsupported(
            subsystem::HARDWARE,
            format!(
                "device status checks not implemented; devices_disabled={}",
                self.devices_disabled
            ),
        )
    }
}

fn describe(camera: &CapabilityResult, microphone: &CapabilityResult) -> String {
    format!("camera: {}; microphone: {}", camera.detail, microphone.detail)
}
