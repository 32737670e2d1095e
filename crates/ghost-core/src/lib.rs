//! # ghost-core
//!
//! Shared domain library for Ghost Mode: the global privacy state, the
//! outcome types every subsystem reports, the target-process list, and the
//! audit event recorded for each transition.
//!
//! This crate performs no OS calls apart from reading the target-process
//! list file.  Everything that touches cameras, microphones, processes or
//! location settings lives in the `ghost-mode` crate behind capability
//! traits.
//!
//! # Architecture overview (for beginners)
//!
//! Ghost Mode turns several independent privacy protections on and off as
//! one logical switch:
//!
//! - camera and microphone disablement,
//! - termination of configured "target" processes (video-call apps, etc.),
//! - location obfuscation (or network identity randomization where location
//!   spoofing is not available).
//!
//! Each protection can fail on its own.  The switch itself never fails: the
//! global [`GhostState`] follows the user's intent, and every individual
//! success or failure is reported in a [`TransitionReport`] and written to
//! the audit trail as an [`AuditEvent`].
//!
//! - **`domain`** – the value types listed above.
//! - **`error`** – the four failure kinds a capability provider may hit,
//!   and the fieldless [`FaultKind`] mirror carried on outcomes.

pub mod domain;
pub mod error;

// Re-export the most-used types at the crate root so callers can write
// `ghost_core::GhostState` instead of `ghost_core::domain::state::GhostState`.
pub use domain::audit::AuditEvent;
pub use domain::outcome::{
    subsystem, ActivationResult, CapabilityResult, DeactivationResult, OutcomeKind,
    SubsystemOutcome, TransitionReport,
};
pub use domain::snapshot::LocationSnapshot;
pub use domain::state::{Direction, GhostState};
pub use domain::targets::{KilledProcessRecord, TargetProcessSet};
pub use error::{FaultKind, GhostError};
