//! In-memory audit sink.

use std::sync::{Mutex, MutexGuard};

use ghost_core::AuditEvent;

use crate::application::audit::AuditSink;

/// Keeps every recorded event in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Rendered audit lines, as a file sink would have written them.
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().map(AuditEvent::to_line).collect()
    }

    pub fn last(&self) -> Option<AuditEvent> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.lock().push(event.clone());
    }
}
