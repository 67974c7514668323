//! Life event status values and the transition state machine.
//!
//! Transition rules:
//! - `detected`     -> `acknowledged`, `dismissed`
//! - `acknowledged` -> `dismissed`, `completed`
//! - `dismissed`    -> (terminal)
//! - `completed`    -> (terminal)
//!
//! Re-applying the current status is accepted as a no-op so that repeated
//! or concurrent dismiss/complete calls converge on the same final state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a persisted life event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeEventStatus {
    /// Initial status, assigned by the engine on persistence.
    Detected,
    /// The user opened or accepted the notification.
    Acknowledged,
    /// The user rejected the notification.
    Dismissed,
    /// The user finished the suggested updates.
    Completed,
}

/// Statuses that count as "active" (not yet terminally resolved).
pub const ACTIVE_STATUSES: [LifeEventStatus; 2] =
    [LifeEventStatus::Detected, LifeEventStatus::Acknowledged];

impl LifeEventStatus {
    pub const ALL: [LifeEventStatus; 4] = [
        LifeEventStatus::Detected,
        LifeEventStatus::Acknowledged,
        LifeEventStatus::Dismissed,
        LifeEventStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifeEventStatus::Detected => "detected",
            LifeEventStatus::Acknowledged => "acknowledged",
            LifeEventStatus::Dismissed => "dismissed",
            LifeEventStatus::Completed => "completed",
        }
    }

    pub fn is_active(self) -> bool {
        ACTIVE_STATUSES.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifeEventStatus::Dismissed | LifeEventStatus::Completed)
    }

    /// Statuses reachable from `self` by a real state change.
    pub fn valid_transitions(self) -> &'static [LifeEventStatus] {
        use LifeEventStatus::*;
        match self {
            Detected => &[Acknowledged, Dismissed],
            Acknowledged => &[Dismissed, Completed],
            Dismissed | Completed => &[],
        }
    }

    /// Whether `self -> next` is allowed, counting same-status as a no-op.
    pub fn can_transition_to(self, next: LifeEventStatus) -> bool {
        self == next || self.valid_transitions().contains(&next)
    }

    pub fn validate_transition(self, next: LifeEventStatus) -> Result<(), InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }

    /// Every status from which `next` may be applied.
    ///
    /// Used by stores that check and write in a single conditional update.
    pub fn sources_for(next: LifeEventStatus) -> Vec<LifeEventStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .collect()
    }
}

impl fmt::Display for LifeEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeEventStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid life event status '{s}'. Must be one of: detected, acknowledged, dismissed, completed"
                ))
            })
    }
}

/// A rejected status change. Indicates a caller logic error; never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot transition life event from '{from}' to '{to}'")]
pub struct InvalidTransition {
    pub from: LifeEventStatus,
    pub to: LifeEventStatus,
}

impl From<InvalidTransition> for CoreError {
    fn from(err: InvalidTransition) -> Self {
        CoreError::InvalidTransition {
            from: err.from.to_string(),
            to: err.to.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
