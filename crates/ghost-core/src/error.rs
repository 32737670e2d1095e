//! Failure taxonomy for capability providers and configuration loading.
//!
//! None of these errors ever reaches the orchestrator or its caller.  They
//! are raised inside a capability provider (or while loading the target
//! list) and converted on the spot into a [`CapabilityResult`] or a logged
//! diagnostic.
//!
//! [`CapabilityResult`]: crate::domain::outcome::CapabilityResult

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for capability and configuration operations.
#[derive(Debug, Error)]
pub enum GhostError {
    /// The operation is not supported on the current platform.
    #[error("not supported on this platform: {0}")]
    CapabilityUnavailable(String),

    /// An external command or OS API returned non-zero or could not run.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),

    /// The process lacked the privilege to perform the action.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The target-process list could not be read.
    #[error("failed to load {path}: {source}")]
    ConfigLoadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GhostError {
    /// Returns the fieldless kind of this error.
    pub fn kind(&self) -> FaultKind {
        match self {
            GhostError::CapabilityUnavailable(_) => FaultKind::CapabilityUnavailable,
            GhostError::ExecutionFailure(_) => FaultKind::ExecutionFailure,
            GhostError::AccessDenied(_) => FaultKind::AccessDenied,
            GhostError::ConfigLoadFailure { .. } => FaultKind::ConfigLoadFailure,
        }
    }
}

/// Fieldless mirror of [`GhostError`], carried on outcomes so they stay
/// `Clone + Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    CapabilityUnavailable,
    ExecutionFailure,
    AccessDenied,
    ConfigLoadFailure,
}
