//! Restricted-platform providers (Windows-style, elevated privileges).
//!
//! # How devices are disabled (for beginners)
//!
//! Each device has a primary mechanism and a fallback:
//!
//! | Device     | Primary                                   | Fallback                                        |
//! |------------|-------------------------------------------|-------------------------------------------------|
//! | Camera     | `Disable-PnpDevice` on the `Camera` class | `usbvideo` service start type 4, `net stop`     |
//! | Microphone | `Disable-PnpDevice` on `*Microphone*` audio endpoints | `net stop AudioEndpointBuilder`, `net stop Audiosrv` |
//!
//! The fallback always counts as success.  The provider remembers which
//! mechanism altered each device so `restore_*` undoes exactly that one.
//!
//! Location services are switched off through the sensor-override registry
//! value `SensorPermissionState` (0 = off, 1 = on).  Writes go through
//! `reg add`; reads go through a [`PermissionStateReader`] (the registry API
//! on Windows hosts).

use std::sync::{Arc, Mutex};

use ghost_core::{CapabilityResult, GhostError, LocationSnapshot};
use rand::Rng;
use tracing::{info, warn};

use crate::application::capabilities::{HardwareCapability, LocationCapability};
use crate::infrastructure::command::{command_line, run_checked, CommandRunner};

use super::registry::{
    host_reader, PermissionStateReader, SENSOR_OVERRIDE_KEY, SENSOR_PERMISSION_VALUE,
};

const USBVIDEO_SERVICE_KEY: &str = r"HKLM\SYSTEM\CurrentControlSet\Services\usbvideo";

const CAMERA_DISABLE_SCRIPT: &str = "Get-PnpDevice -Class Camera | Disable-PnpDevice -Confirm:$false";
const CAMERA_ENABLE_SCRIPT: &str = "Get-PnpDevice -Class Camera | Enable-PnpDevice -Confirm:$false";
const MICROPHONE_DISABLE_SCRIPT: &str = "Get-PnpDevice -Class AudioEndpoint | Where-Object {$_.FriendlyName -like \"*Microphone*\"} | Disable-PnpDevice -Confirm:$false";
const MICROPHONE_ENABLE_SCRIPT: &str = "Get-PnpDevice -Class AudioEndpoint | Where-Object {$_.FriendlyName -like \"*Microphone*\"} | Enable-PnpDevice -Confirm:$false";

const AUDIO_SERVICES: [&str; 2] = ["AudioEndpointBuilder", "Audiosrv"];

/// Which mechanism took a device offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableMechanism {
    /// The PnP device was disabled.
    PnpDevice,
    /// The driver or audio services were stopped.
    ServiceFallback,
}

// ── Hardware ──────────────────────────────────────────────────────────────────

/// Camera and microphone control through PnP cmdlets and service control.
pub struct RestrictedHardware {
    runner: Arc<dyn CommandRunner>,
    camera: Mutex<Option<DisableMechanism>>,
    microphone: Mutex<Option<DisableMechanism>>,
}

impl RestrictedHardware {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            camera: Mutex::new(None),
            microphone: Mutex::new(None),
        }
    }

    /// Mechanism that last disabled the camera, if it is still disabled.
    pub fn camera_mechanism(&self) -> Option<DisableMechanism> {
        *lock(&self.camera)
    }

    pub fn microphone_mechanism(&self) -> Option<DisableMechanism> {
        *lock(&self.microphone)
    }

    fn powershell(&self, script: &str) -> Result<(), GhostError> {
        run_checked(self.runner.as_ref(), "powershell", &["-NoProfile", "-Command", script])
            .map(|_| ())
    }

    /// Runs a fallback step; its exit status is logged and otherwise ignored.
    fn best_effort(&self, program: &str, args: &[&str]) {
        if let Err(e) = run_checked(self.runner.as_ref(), program, args) {
            warn!("fallback step `{}` failed: {e}", command_line(program, args));
        }
    }

    fn set_usbvideo_start_type(&self, start: &str) -> Result<(), GhostError> {
        run_checked(
            self.runner.as_ref(),
            "reg",
            &["add", USBVIDEO_SERVICE_KEY, "/v", "Start", "/t", "REG_DWORD", "/d", start, "/f"],
        )
        .map(|_| ())
    }

    fn restore_camera_via(&self, mechanism: DisableMechanism) -> Result<String, GhostError> {
        match mechanism {
            DisableMechanism::PnpDevice => {
                self.powershell(CAMERA_ENABLE_SCRIPT)?;
                Ok("camera re-enabled via PnP".to_string())
            }
            DisableMechanism::ServiceFallback => {
                self.set_usbvideo_start_type("3")?;
                run_checked(self.runner.as_ref(), "net", &["start", "usbvideo"])?;
                Ok("usbvideo service restored".to_string())
            }
        }
    }

    fn restore_microphone_via(&self, mechanism: DisableMechanism) -> Result<String, GhostError> {
        match mechanism {
            DisableMechanism::PnpDevice => {
                self.powershell(MICROPHONE_ENABLE_SCRIPT)?;
                Ok("microphone endpoints re-enabled via PnP".to_string())
            }
            DisableMechanism::ServiceFallback => {
                for service in AUDIO_SERVICES {
                    run_checked(self.runner.as_ref(), "net", &["start", service])?;
                }
                Ok("audio services started".to_string())
            }
        }
    }
}

impl HardwareCapability for RestrictedHardware {
    fn disable_camera(&self) -> CapabilityResult {
        let mechanism = match self.powershell(CAMERA_DISABLE_SCRIPT) {
            Ok(()) => DisableMechanism::PnpDevice,
            Err(e) => {
                warn!("PnP camera disable failed ({e}); stopping usbvideo instead");
                self.best_effort(
                    "reg",
                    &["add", USBVIDEO_SERVICE_KEY, "/v", "Start", "/t", "REG_DWORD", "/d", "4", "/f"],
                );
                self.best_effort("net", &["stop", "usbvideo"]);
                DisableMechanism::ServiceFallback
            }
        };
        *lock(&self.camera) = Some(mechanism);
        info!("webcam disable success: true ({mechanism:?})");

        CapabilityResult::ok(match mechanism {
            DisableMechanism::PnpDevice => "camera disabled via PnP",
            DisableMechanism::ServiceFallback => "camera disabled via usbvideo service fallback",
        })
    }

    fn disable_microphone(&self) -> CapabilityResult {
        let mechanism = match self.powershell(MICROPHONE_DISABLE_SCRIPT) {
            Ok(()) => DisableMechanism::PnpDevice,
            Err(e) => {
                warn!("PnP microphone disable failed ({e}); stopping audio services instead");
                for service in AUDIO_SERVICES {
                    self.best_effort("net", &["stop", service]);
                }
                DisableMechanism::ServiceFallback
            }
        };
        *lock(&self.microphone) = Some(mechanism);
        info!("microphone disable success: true ({mechanism:?})");

        CapabilityResult::ok(match mechanism {
            DisableMechanism::PnpDevice => "microphone disabled via PnP",
            DisableMechanism::ServiceFallback => "microphone disabled via audio service fallback",
        })
    }

    fn restore_camera(&self) -> CapabilityResult {
        let mut recorded = lock(&self.camera);
        let Some(mechanism) = *recorded else {
            return CapabilityResult::ok("camera: nothing to restore");
        };
        let result = self.restore_camera_via(mechanism);
        // Keep the mechanism until the undo succeeds so the next restore retries it.
        if result.is_ok() {
            *recorded = None;
        }
        let result = CapabilityResult::from(result);
        info!("camera restore success: {}", result.succeeded);
        result
    }

    fn restore_microphone(&self) -> CapabilityResult {
        let mut recorded = lock(&self.microphone);
        let Some(mechanism) = *recorded else {
            return CapabilityResult::ok("microphone: nothing to restore");
        };
        let result = self.restore_microphone_via(mechanism);
        // Keep the mechanism until the undo succeeds so the next restore retries it.
        if result.is_ok() {
            *recorded = None;
        }
        let result = CapabilityResult::from(result);
        info!("microphone restore success: {}", result.succeeded);
        result
    }
}

// ── Location ──────────────────────────────────────────────────────────────────

/// Location-services control through the sensor-override registry value.
pub struct RestrictedLocation {
    runner: Arc<dyn CommandRunner>,
    reader: Arc<dyn PermissionStateReader>,
}

impl RestrictedLocation {
    /// Writes through `runner`; reads with the host's registry reader.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        let reader = host_reader(Arc::clone(&runner));
        Self::with_reader(runner, reader)
    }

    pub fn with_reader(
        runner: Arc<dyn CommandRunner>,
        reader: Arc<dyn PermissionStateReader>,
    ) -> Self {
        Self { runner, reader }
    }

    fn write_permission_state(&self, value: u32) -> Result<(), GhostError> {
        let value = value.to_string();
        run_checked(
            self.runner.as_ref(),
            "reg",
            &[
                "add",
                SENSOR_OVERRIDE_KEY,
                "/v",
                SENSOR_PERMISSION_VALUE,
                "/t",
                "REG_DWORD",
                "/d",
                &value,
                "/f",
            ],
        )
        .map(|_| ())
    }
}

impl LocationCapability for RestrictedLocation {
    fn supports_location_spoofing(&self) -> bool {
        true
    }

    fn spoof_location(&self, latitude: Option<f64>, longitude: Option<f64>) -> CapabilityResult {
        let mut rng = rand::thread_rng();
        let latitude = latitude.unwrap_or_else(|| rng.gen_range(-90.0..=90.0));
        let longitude = longitude.unwrap_or_else(|| rng.gen_range(-180.0..=180.0));

        let result = self
            .write_permission_state(0)
            .map(|()| format!("location services disabled; reporting ({latitude:.4}, {longitude:.4})"));
        match &result {
            Ok(detail) => info!("{detail}"),
            Err(e) => warn!("location spoofing failed: {e}"),
        }
        CapabilityResult::from(result)
    }

    fn restore_location(&self, snapshot: &LocationSnapshot) -> CapabilityResult {
        let value = snapshot.first_value().unwrap_or(1);
        let result = self
            .write_permission_state(value)
            .map(|()| format!("{SENSOR_PERMISSION_VALUE} restored to {value}"));
        if let Err(e) = &result {
            warn!("location restore failed: {e}");
        }
        CapabilityResult::from(result)
    }

    fn current_location_state(&self) -> LocationSnapshot {
        match self.reader.read_permission_state() {
            Ok(value) => LocationSnapshot::single(value),
            Err(e) => {
                warn!("error getting location: {e}");
                LocationSnapshot::single(None)
            }
        }
    }

    fn randomize_network_identity(&self, _interface: &str) -> CapabilityResult {
        CapabilityResult::unavailable("network identity randomization")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::mock::ScriptedCommandRunner;
    use crate::infrastructure::capabilities::registry::RegQueryReader;
    use crate::infrastructure::command::CommandOutput;
    use ghost_core::FaultKind;

    fn hardware(runner: ScriptedCommandRunner) -> (RestrictedHardware, Arc<ScriptedCommandRunner>) {
        let runner = Arc::new(runner);
        (
            RestrictedHardware::new(Arc::clone(&runner) as Arc<dyn CommandRunner>),
            runner,
        )
    }

    fn location(runner: ScriptedCommandRunner) -> (RestrictedLocation, Arc<ScriptedCommandRunner>) {
        let runner = Arc::new(runner);
        let shared = Arc::clone(&runner) as Arc<dyn CommandRunner>;
        (
            RestrictedLocation::with_reader(
                Arc::clone(&shared),
                Arc::new(RegQueryReader::new(shared)),
            ),
            runner,
        )
    }

    // ── Hardware ──────────────────────────────────────────────────────────────

    #[test]
    fn test_camera_disabled_via_pnp_when_cmdlet_succeeds() {
        // Arrange
        let (hw, runner) = hardware(ScriptedCommandRunner::new());

        // Act
        let result = hw.disable_camera();

        // Assert
        assert!(result.succeeded);
        assert_eq!(hw.camera_mechanism(), Some(DisableMechanism::PnpDevice));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Disable-PnpDevice"));
    }

    #[test]
    fn test_camera_falls_back_to_usbvideo_service_and_still_succeeds() {
        // Arrange
        let (hw, runner) = hardware(
            ScriptedCommandRunner::new()
                .with_failure("powershell")
                .with_failure("net stop usbvideo"),
        );

        // Act
        let result = hw.disable_camera();

        // Assert
        assert!(result.succeeded);
        assert_eq!(hw.camera_mechanism(), Some(DisableMechanism::ServiceFallback));
        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].starts_with("reg add HKLM\\SYSTEM\\CurrentControlSet\\Services\\usbvideo"));
        assert!(calls[1].ends_with("/d 4 /f"));
        assert_eq!(calls[2], "net stop usbvideo");
    }

    #[test]
    fn test_microphone_fallback_stops_both_audio_services() {
        let (hw, runner) = hardware(ScriptedCommandRunner::new().with_failure("powershell"));

        let result = hw.disable_microphone();

        assert!(result.succeeded);
        let calls = runner.calls();
        assert_eq!(
            &calls[1..],
            &["net stop AudioEndpointBuilder", "net stop Audiosrv"]
        );
    }

    #[test]
    fn test_restore_undoes_exactly_the_mechanism_used() {
        // Arrange – camera via fallback, microphone via PnP
        let runner = ScriptedCommandRunner::new()
            .with_failure("powershell -NoProfile -Command Get-PnpDevice -Class Camera | Disable");
        let (hw, runner) = hardware(runner);
        hw.disable_camera();
        hw.disable_microphone();
        let before = runner.calls().len();

        // Act
        let camera = hw.restore_camera();
        let microphone = hw.restore_microphone();

        // Assert
        assert!(camera.succeeded);
        assert!(microphone.succeeded);
        let calls = runner.calls();
        let restore_calls = &calls[before..];
        assert!(restore_calls[0].ends_with("/d 3 /f"));
        assert_eq!(restore_calls[1], "net start usbvideo");
        assert!(restore_calls[2].contains("Enable-PnpDevice"));
        assert!(restore_calls[2].contains("*Microphone*"));
        assert_eq!(restore_calls.len(), 3);
    }

    #[test]
    fn test_restore_with_nothing_altered_runs_no_commands() {
        let (hw, runner) = hardware(ScriptedCommandRunner::new());

        let camera = hw.restore_camera();
        let microphone = hw.restore_microphone();

        assert!(camera.succeeded);
        assert!(microphone.succeeded);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_failed_restore_reports_access_denied() {
        let (hw, _runner) = hardware(
            ScriptedCommandRunner::new()
                .with_failure("powershell")
                .with_output("net start", CommandOutput::failure(2, "Access is denied.")),
        );
        hw.disable_microphone();

        let result = hw.restore_microphone();

        assert!(!result.succeeded);
        assert_eq!(result.fault, Some(FaultKind::AccessDenied));
    }

    #[test]
    fn test_failed_pnp_enable_is_retried_on_next_restore() {
        // Arrange
        let (hw, runner) = hardware(ScriptedCommandRunner::new().with_output(
            "powershell -NoProfile -Command Get-PnpDevice -Class Camera | Enable",
            CommandOutput::failure(1, "Generic failure"),
        ));
        hw.disable_camera();

        // Act
        let first = hw.restore_camera();
        let second = hw.restore_camera();

        // Assert
        assert!(!first.succeeded);
        assert!(!second.succeeded);
        assert_eq!(hw.camera_mechanism(), Some(DisableMechanism::PnpDevice));
        let enables = runner
            .calls()
            .iter()
            .filter(|c| c.contains("Enable-PnpDevice"))
            .count();
        assert_eq!(enables, 2);
    }

    #[test]
    fn test_successful_restore_clears_recorded_mechanism() {
        let (hw, runner) = hardware(ScriptedCommandRunner::new().with_failure("powershell"));
        hw.disable_microphone();

        let first = hw.restore_microphone();
        let calls_after_first = runner.calls().len();
        let second = hw.restore_microphone();

        assert!(first.succeeded);
        assert_eq!(hw.microphone_mechanism(), None);
        assert_eq!(second.detail, "microphone: nothing to restore");
        assert_eq!(runner.calls().len(), calls_after_first);
    }

    // ── Location ──────────────────────────────────────────────────────────────

    #[test]
    fn test_current_location_state_parses_reg_query_output() {
        let (loc, _runner) = location(ScriptedCommandRunner::new().with_output(
            "reg query",
            CommandOutput::success(
                "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\...\r\n    SensorPermissionState    REG_DWORD    0x1\r\n",
            ),
        ));

        assert_eq!(loc.current_location_state(), LocationSnapshot::single(Some(1)));
    }

    #[test]
    fn test_current_location_state_is_none_when_value_missing() {
        let (loc, _runner) = location(ScriptedCommandRunner::new().with_output(
            "reg query",
            CommandOutput::failure(1, "ERROR: The system was unable to find the specified registry key or value."),
        ));

        assert_eq!(loc.current_location_state(), LocationSnapshot::single(None));
    }

    #[test]
    fn test_spoof_writes_zero_to_permission_state() {
        // Arrange
        let (loc, runner) = location(ScriptedCommandRunner::new());

        // Act
        let result = loc.spoof_location(Some(10.0), Some(20.0));

        // Assert
        assert!(result.succeeded);
        assert!(result.detail.contains("(10.0000, 20.0000)"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("SensorPermissionState /t REG_DWORD /d 0 /f"));
    }

    #[test]
    fn test_spoof_picks_coordinates_in_range_when_absent() {
        let (loc, _runner) = location(ScriptedCommandRunner::new());

        let result = loc.spoof_location(None, None);

        assert!(result.succeeded);
        let coords = result
            .detail
            .rsplit('(')
            .next()
            .and_then(|s| s.strip_suffix(')'))
            .unwrap();
        let mut parts = coords.split(", ").map(|p| p.parse::<f64>().unwrap());
        let lat = parts.next().unwrap();
        let long = parts.next().unwrap();
        assert!((-90.0..=90.0).contains(&lat));
        assert!((-180.0..=180.0).contains(&long));
    }

    #[test]
    fn test_restore_writes_snapshot_value_or_one() {
        let (loc, runner) = location(ScriptedCommandRunner::new());

        loc.restore_location(&LocationSnapshot::single(Some(0)));
        loc.restore_location(&LocationSnapshot::single(None));

        let calls = runner.calls();
        assert!(calls[0].ends_with("/d 0 /f"));
        assert!(calls[1].ends_with("/d 1 /f"));
    }

    #[test]
    fn test_network_identity_is_unavailable() {
        let (loc, runner) = location(ScriptedCommandRunner::new());

        let result = loc.randomize_network_identity("wlan0");

        assert!(!result.succeeded);
        assert!(result.is_unavailable());
        assert!(runner.calls().is_empty());
    }
}
