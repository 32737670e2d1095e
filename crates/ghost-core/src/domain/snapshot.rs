//! Captured location-service state.
//!
//! The snapshot is an opaque tuple of optional registry-style values.  It is
//! rendered exactly like a tuple literal (`()`, `(1,)`, `(None,)`,
//! `(0, 1)`) so the audit trail shows the raw state verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw location state as read from the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSnapshot(Vec<Option<u32>>);

impl LocationSnapshot {
    /// The empty tuple `()`: no location state on this platform.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A one-element tuple, `(v,)` or `(None,)`.
    pub fn single(value: Option<u32>) -> Self {
        Self(vec![value])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First element, if present and known.
    pub fn first_value(&self) -> Option<u32> {
        self.0.first().copied().flatten()
    }

    /// `Some(false)` when the first value is `0` (location off), `Some(true)`
    /// for any other known value, `None` when unknown.
    pub fn location_enabled(&self) -> Option<bool> {
        self.first_value().map(|v| v != 0)
    }
}

impl fmt::Display for LocationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("None")?,
            }
        }
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}
