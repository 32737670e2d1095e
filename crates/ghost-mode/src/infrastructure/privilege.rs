//! Administrator / root privilege probe.
//!
//! Ghost Mode's commands need elevated privileges on both platforms.  The
//! binary only warns when they are missing; every capability still runs and
//! reports its own `AccessDenied`.

use tracing::debug;

use crate::application::capabilities::Platform;
use crate::infrastructure::command::CommandRunner;

/// `true` when the current process runs elevated.
///
/// - Restricted: `net session` succeeds only for administrators.
/// - Open: `id -u` prints `0` for root.
///
/// Any failure to run the probe reads as "not elevated".
pub fn is_elevated(runner: &dyn CommandRunner, platform: Platform) -> bool {
    let elevated = match platform {
        Platform::Restricted => runner
            .run("net", &["session"])
            .map(|out| out.succeeded())
            .unwrap_or(false),
        Platform::Open => runner
            .run("id", &["-u"])
            .map(|out| out.succeeded() && out.stdout.trim() == "0")
            .unwrap_or(false),
    };
    debug!("privilege probe on {platform}: elevated={elevated}");
    elevated
}
