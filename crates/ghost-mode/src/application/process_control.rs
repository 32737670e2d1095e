//! ProcessControl: terminates target processes on activation.
//!
//! Owns the [`TargetProcessSet`] and the [`KilledProcessRecord`] of the most
//! recent activation.  Restoring killed processes on deactivation is not
//! implemented; `deactivate` logs what would be restored and reports an
//! `Unsupported` success.

use std::path::Path;
use std::sync::Arc;

use ghost_core::{subsystem, KilledProcessRecord, SubsystemOutcome, TargetProcessSet};
use tracing::{error, info, warn};

use crate::application::capabilities::ProcessCapability;

/// Adapter over a [`ProcessCapability`].
pub struct ProcessControl {
    capability: Arc<dyn ProcessCapability>,
    targets: TargetProcessSet,
    killed: KilledProcessRecord,
}

impl ProcessControl {
    pub fn new(capability: Arc<dyn ProcessCapability>, targets: TargetProcessSet) -> Self {
        Self {
            capability,
            targets,
            killed: KilledProcessRecord::new(),
        }
    }

    pub fn targets(&self) -> &TargetProcessSet {
        &self.targets
    }

    pub fn set_targets(&mut self, targets: TargetProcessSet) {
        self.targets = targets;
    }

    /// Termination record of the latest activation.
    pub fn killed(&self) -> &KilledProcessRecord {
        &self.killed
    }

    /// Replaces the target list from a file.
    ///
    /// On failure the error is logged and the list is left empty.
    pub fn load_targets(&mut self, path: &Path) {
        match TargetProcessSet::from_file(path) {
            Ok(targets) => {
                info!("loaded target processes: {:?}", targets.names());
                self.targets = targets;
            }
            Err(e) => {
                error!("error loading target processes: {e}");
                self.targets = TargetProcessSet::new();
            }
        }
    }

    /// Terminates every running process matching a target.
    ///
    /// Succeeds iff no termination attempt hit an access or lookup error.
    pub fn activate(&mut self) -> SubsystemOutcome {
        self.killed.clear();
        let sweep = self.capability.terminate_processes_by_name(&self.targets);

        for attempt in &sweep.attempts {
            if attempt.result.succeeded {
                info!("terminated process: {} (pid {})", attempt.name, attempt.pid);
            }
            self.killed.record(attempt.name.clone(), attempt.result.succeeded);
        }

        let terminated = sweep.attempts.iter().filter(|a| a.result.succeeded).count();
        let mut detail = format!(
            "terminated {terminated} of {} matching process(es)",
            sweep.attempts.len()
        );
        if let Some(e) = &sweep.enumeration_error {
            detail.push_str(&format!("; process lookup failed: {e}"));
        }
        for failed in sweep.attempts.iter().filter(|a| !a.result.succeeded) {
            detail.push_str(&format!("; {}: {}", failed.name, failed.result.detail));
        }

        if sweep.is_clean() {
            SubsystemOutcome::completed(subsystem::PROCESSES, detail)
        } else {
            warn!("could not terminate every target process: {detail}");
            SubsystemOutcome::failed(subsystem::PROCESSES, detail)
        }
    }

    /// Process restoration is not implemented; only the intent is logged.
    pub fn deactivate(&mut self) -> SubsystemOutcome {
        let pending = self.killed.terminated();
        info!("processes to restore: {pending:?}");
        SubsystemOutcome::unsupported(
            subsystem::PROCESSES,
            format!("process restoration not implemented; not relaunched: {pending:?}"),
        )
    }

    /// Targets that are currently running, in target-list order.
    pub fn still_running(&self) -> Vec<String> {
        self.targets
            .iter()
            .filter(|name| self.capability.is_process_running(name))
            .map(str::to_string)
            .collect()
    }
}
