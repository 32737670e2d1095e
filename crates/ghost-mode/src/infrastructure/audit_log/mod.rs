//! Audit sinks: where each transition's [`AuditEvent`] ends up.
//!
//! [`FileAuditSink`] appends one line per event to an append-only file.
//! Recording never fails from the caller's point of view: I/O problems are
//! logged and the event is dropped.  [`memory::MemoryAuditSink`] keeps events
//! in memory for tests and for the console's `status` command.

pub mod memory;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ghost_core::AuditEvent;
use tracing::{debug, warn};

use crate::application::audit::AuditSink;

/// Appends audit lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
    // Serializes appends from concurrent transitions.
    write_lock: Mutex<()>,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let line = event.to_line();
        match self.append(&line) {
            Ok(()) => debug!("audit event {} written to {}", event.id(), self.path.display()),
            Err(e) => warn!(
                "could not write audit event to {}: {e}",
                self.path.display()
            ),
        }
    }
}
