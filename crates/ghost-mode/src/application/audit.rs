//! The audit sink seam.
//!
//! The orchestrator hands every [`AuditEvent`] to an [`AuditSink`].  Sinks
//! are append-only and never fail observably: write errors are logged and
//! swallowed inside the implementation.  Implementations live in
//! `infrastructure::audit_log`.

use ghost_core::AuditEvent;

/// Append-only recorder of audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}
