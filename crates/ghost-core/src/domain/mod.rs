//! Domain entities for Ghost Mode.
//!
//! Pure value types with no infrastructure dependencies.  Every type here is
//! created once and never mutated afterwards, except the two per-session
//! collections ([`targets::TargetProcessSet`] and
//! [`targets::KilledProcessRecord`]) which are owned by the process adapter.

/// Audit events and their one-line rendering.
pub mod audit;
/// Subsystem outcomes and transition reports.
pub mod outcome;
/// Captured location state used for later restoration.
pub mod snapshot;
/// Global Ghost Mode state and transition direction.
pub mod state;
/// Target-process list and per-activation termination record.
pub mod targets;
