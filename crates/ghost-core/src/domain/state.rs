//! Global Ghost Mode state.
//!
//! The state is a user-facing intent flag, not a verified hardware truth:
//! it is `Active` iff the most recent transition was an activation, no
//! matter how many individual protections failed along the way.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The process-wide Ghost Mode state.  Starts `Inactive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostState {
    #[default]
    Inactive,
    Active,
}

impl GhostState {
    pub fn is_active(self) -> bool {
        matches!(self, GhostState::Active)
    }

    /// Direction a toggle takes from this state.
    pub fn toggle_direction(self) -> Direction {
        match self {
            GhostState::Inactive => Direction::Activation,
            GhostState::Active => Direction::Deactivation,
        }
    }
}

impl fmt::Display for GhostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GhostState::Inactive => f.write_str("inactive"),
            GhostState::Active => f.write_str("active"),
        }
    }
}

/// Which way a transition goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Activation,
    Deactivation,
}

impl Direction {
    /// The state a transition in this direction always lands in.
    pub fn target_state(self) -> GhostState {
        match self {
            Direction::Activation => GhostState::Active,
            Direction::Deactivation => GhostState::Inactive,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Activation => f.write_str("activation"),
            Direction::Deactivation => f.write_str("deactivation"),
        }
    }
}
