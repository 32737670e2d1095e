//! Open-platform providers (Linux-style).
//!
//! - Camera: unload the `uvcvideo` kernel module (`sudo modprobe -r`).
//! - Microphone: mute ALSA capture (`amixer set Capture nocap`).
//! - No hardware restoration path and no location spoofing.  Network
//!   identity randomization (`ifconfig down`, `macchanger -r`, `ifconfig up`)
//!   stands in for location obfuscation.

use std::sync::Arc;

use ghost_core::{CapabilityResult, GhostError, LocationSnapshot};
use tracing::{info, warn};

use crate::application::capabilities::{HardwareCapability, LocationCapability};
use crate::infrastructure::command::{run_checked, CommandRunner};

/// Camera and microphone control through kernel modules and ALSA.
pub struct OpenHardware {
    runner: Arc<dyn CommandRunner>,
}

impl OpenHardware {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl HardwareCapability for OpenHardware {
    fn disable_camera(&self) -> CapabilityResult {
        let result = run_checked(self.runner.as_ref(), "sudo", &["modprobe", "-r", "uvcvideo"])
            .map(|_| "uvcvideo module unloaded".to_string());
        info!("webcam disable success: {}", result.is_ok());
        CapabilityResult::from(result)
    }

    fn disable_microphone(&self) -> CapabilityResult {
        let result = run_checked(self.runner.as_ref(), "amixer", &["set", "Capture", "nocap"])
            .map(|_| "ALSA capture muted".to_string());
        info!("microphone disable success: {}", result.is_ok());
        CapabilityResult::from(result)
    }

    fn restore_camera(&self) -> CapabilityResult {
        CapabilityResult::unavailable("camera restore")
    }

    fn restore_microphone(&self) -> CapabilityResult {
        CapabilityResult::unavailable("microphone restore")
    }
}

/// Network-identity randomization; location spoofing is unavailable.
pub struct OpenLocation {
    runner: Arc<dyn CommandRunner>,
}

impl OpenLocation {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn randomize(&self, interface: &str) -> Result<String, GhostError> {
        let runner = self.runner.as_ref();
        run_checked(runner, "sudo", &["ifconfig", interface, "down"])?;
        run_checked(runner, "sudo", &["macchanger", "-r", interface])?;
        run_checked(runner, "sudo", &["ifconfig", interface, "up"])?;
        Ok(format!("{interface} hardware address randomized"))
    }
}

impl LocationCapability for OpenLocation {
    fn supports_location_spoofing(&self) -> bool {
        false
    }

    fn spoof_location(&self, _latitude: Option<f64>, _longitude: Option<f64>) -> CapabilityResult {
        CapabilityResult::unavailable("location spoofing")
    }

    fn restore_location(&self, _snapshot: &LocationSnapshot) -> CapabilityResult {
        CapabilityResult::unavailable("location restore")
    }

    fn current_location_state(&self) -> LocationSnapshot {
        LocationSnapshot::single(None)
    }

    fn randomize_network_identity(&self, interface: &str) -> CapabilityResult {
        let result = self.randomize(interface);
        match &result {
            Ok(_) => info!("MAC address randomized for {interface}"),
            Err(e) => warn!("MAC randomization failed: {e}"),
        }
        CapabilityResult::from(result)
    }
}
