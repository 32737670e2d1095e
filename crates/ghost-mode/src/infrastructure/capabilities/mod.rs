//! Concrete capability providers.
//!
//! # Platform selection (for beginners)
//!
//! The application layer never asks "am I on Windows?".  Instead
//! [`for_platform`] is called once at startup and returns a
//! [`CapabilitySet`] whose trait objects already carry the right behaviour:
//!
//! | Platform     | Hardware             | Location / network          |
//! |--------------|----------------------|-----------------------------|
//! | `Restricted` | [`RestrictedHardware`] | [`RestrictedLocation`]    |
//! | `Open`       | [`OpenHardware`]       | [`OpenLocation`]          |
//!
//! Both use [`SysinfoProcesses`] for the process table.  `mock` holds
//! in-memory providers for tests.

pub mod mock;
pub mod open;
pub mod processes;
pub mod registry;
pub mod restricted;

use std::sync::Arc;

use tracing::info;

use crate::application::capabilities::{CapabilitySet, Platform};
use crate::infrastructure::command::CommandRunner;

pub use open::{OpenHardware, OpenLocation};
pub use processes::SysinfoProcesses;
pub use restricted::{RestrictedHardware, RestrictedLocation};

/// Builds the providers for `platform`, issuing OS commands through `runner`.
pub fn for_platform(platform: Platform, runner: Arc<dyn CommandRunner>) -> CapabilitySet {
    info!("using {platform} platform capabilities");
    let processes = Arc::new(SysinfoProcesses::new());
    match platform {
        Platform::Restricted => CapabilitySet::new(
            platform,
            Arc::new(RestrictedHardware::new(Arc::clone(&runner))),
            processes,
            Arc::new(RestrictedLocation::new(runner)),
        ),
        Platform::Open => CapabilitySet::new(
            platform,
            Arc::new(OpenHardware::new(Arc::clone(&runner))),
            processes,
            Arc::new(OpenLocation::new(runner)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::mock::ScriptedCommandRunner;

    #[test]
    fn test_restricted_set_supports_location_spoofing() {
        let caps = for_platform(Platform::Restricted, Arc::new(ScriptedCommandRunner::new()));
        assert_eq!(caps.platform, Platform::Restricted);
        assert!(caps.location.supports_location_spoofing());
    }

    #[test]
    fn test_open_set_has_no_location_spoofing() {
        let caps = for_platform(Platform::Open, Arc::new(ScriptedCommandRunner::new()));
        assert_eq!(caps.platform, Platform::Open);
        assert!(!caps.location.supports_location_spoofing());
        assert!(caps.hardware.restore_camera().is_unavailable());
    }
}
