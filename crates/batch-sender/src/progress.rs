//! Progress indicator of a submission.

use crate::error::BatchError;
use serde::Serialize;
use std::fmt;

/// Step of the two-phase flow.
///
/// ```text
/// Idle ──► Approving ──► Distributing ──► Idle
///   └──────────────────────►┘
/// ```
///
/// Any state may fall back to `Idle` on failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    #[default]
    Idle,
    Approving,
    Distributing,
}

impl ProgressState {
    /// Step number shown in the action label.
    pub const fn step(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Approving => 1,
            Self::Distributing => 2,
        }
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Approving)
                | (Self::Idle, Self::Distributing)
                | (Self::Approving, Self::Distributing)
                | (Self::Approving, Self::Idle)
                | (Self::Distributing, Self::Idle)
        )
    }

    /// Returns `next` if the transition is allowed.
    pub fn transition(self, next: Self) -> Result<Self, BatchError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BatchError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Approving => f.write_str("approving"),
            Self::Distributing => f.write_str("distributing"),
        }
    }
}
