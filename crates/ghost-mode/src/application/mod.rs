//! Application layer: the Ghost Mode use cases.
//!
//! # What lives here?
//!
//! - **`capabilities`** – the platform-agnostic traits the rest of the code
//!   talks to (`HardwareCapability`, `ProcessCapability`,
//!   `LocationCapability`) and the `CapabilitySet` chosen once at startup.
//!
//! - **`hardware_control`**, **`process_control`**, **`location_control`** –
//!   the subsystem adapters.  Each wraps one capability, makes exactly one
//!   attempt per transition and folds the result into a `SubsystemOutcome`.
//!
//! - **`orchestrator`** – `GhostModeOrchestrator`, the state machine that
//!   drives the adapters in fixed order, decides the global state and emits
//!   the audit event.
//!
//! - **`audit`** – the `AuditSink` trait the orchestrator writes to.
//!
//! Nothing in this layer runs an OS command directly; concrete providers are
//! injected from `infrastructure`.

pub mod audit;
pub mod capabilities;
pub mod hardware_control;
pub mod location_control;
pub mod orchestrator;
pub mod process_control;
