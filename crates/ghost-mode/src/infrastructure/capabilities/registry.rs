//! Reading the location sensor-override value.
//!
//! On Windows hosts the value is read through the registry API
//! (`RegGetValueW`), which returns a typed `REG_DWORD`.  Everywhere else,
//! and in tests, [`RegQueryReader`] runs `reg query` through the
//! [`CommandRunner`] seam and parses its output.  `reg.exe` prints the value
//! name, the type name and the hex value untranslated on every display
//! language, so the parse only relies on those three tokens.

use std::sync::Arc;

use ghost_core::GhostError;

use crate::infrastructure::command::{run_checked, CommandRunner};

pub(crate) const SENSOR_OVERRIDE_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Windows NT\CurrentVersion\Sensor\Overrides\{BFA794E4-F964-4FDB-90F6-51056BFE4B44}";

pub(crate) const SENSOR_PERMISSION_VALUE: &str = "SensorPermissionState";

/// Source of the current `SensorPermissionState` value.
pub trait PermissionStateReader: Send + Sync {
    /// `Ok(None)` when the value exists but is not a `REG_DWORD`.
    fn read_permission_state(&self) -> Result<Option<u32>, GhostError>;
}

/// Reader for this host: the registry API on Windows, `reg query` elsewhere.
pub fn host_reader(runner: Arc<dyn CommandRunner>) -> Arc<dyn PermissionStateReader> {
    #[cfg(target_os = "windows")]
    {
        let _ = runner;
        Arc::new(windows_api::RegistryApiReader)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(RegQueryReader::new(runner))
    }
}

// ── reg query ─────────────────────────────────────────────────────────────────

/// Reads the value with `reg query`.
pub struct RegQueryReader {
    runner: Arc<dyn CommandRunner>,
}

impl RegQueryReader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl PermissionStateReader for RegQueryReader {
    fn read_permission_state(&self) -> Result<Option<u32>, GhostError> {
        let output = run_checked(
            self.runner.as_ref(),
            "reg",
            &["query", SENSOR_OVERRIDE_KEY, "/v", SENSOR_PERMISSION_VALUE],
        )?;
        Ok(parse_reg_dword(&output.stdout, SENSOR_PERMISSION_VALUE))
    }
}

/// Extracts a `REG_DWORD` from `reg query` output such as
/// `    SensorPermissionState    REG_DWORD    0x1`.
fn parse_reg_dword(output: &str, value_name: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        if fields.next()? != value_name || fields.next()? != "REG_DWORD" {
            return None;
        }
        let raw = fields.next()?;
        let hex = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
        u32::from_str_radix(hex, 16).ok()
    })
}

// ── Registry API ──────────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
pub use windows_api::RegistryApiReader;

#[cfg(target_os = "windows")]
mod windows_api {
    use std::ffi::c_void;

    use ghost_core::GhostError;
    use windows::core::w;
    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, ERROR_UNSUPPORTED_TYPE,
    };
    use windows::Win32::System::Registry::{RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_DWORD};

    use super::PermissionStateReader;

    /// Reads the value with `RegGetValueW`.
    pub struct RegistryApiReader;

    impl PermissionStateReader for RegistryApiReader {
        fn read_permission_state(&self) -> Result<Option<u32>, GhostError> {
            let mut value: u32 = 0;
            let mut size = std::mem::size_of::<u32>() as u32;

            // SAFETY: `value` and `size` are live stack locals and `size`
            // holds the byte length of `value`, as RRF_RT_REG_DWORD requires.
            let status = unsafe {
                RegGetValueW(
                    HKEY_LOCAL_MACHINE,
                    w!(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Sensor\Overrides\{BFA794E4-F964-4FDB-90F6-51056BFE4B44}"),
                    w!("SensorPermissionState"),
                    RRF_RT_REG_DWORD,
                    None,
                    Some(&mut value as *mut u32 as *mut c_void),
                    Some(&mut size as *mut u32),
                )
            };

            if status == ERROR_SUCCESS {
                Ok(Some(value))
            } else if status == ERROR_UNSUPPORTED_TYPE {
                Ok(None)
            } else if status == ERROR_ACCESS_DENIED {
                Err(GhostError::AccessDenied(
                    "reading SensorPermissionState".to_string(),
                ))
            } else if status == ERROR_FILE_NOT_FOUND {
                Err(GhostError::ExecutionFailure(
                    "SensorPermissionState is not set".to_string(),
                ))
            } else {
                Err(GhostError::ExecutionFailure(format!(
                    "RegGetValueW failed with code {}",
                    status.0
                )))
            }
        }
    }
}
