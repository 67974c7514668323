//! Per-user life event statistics for offline threshold tuning.
//!
//! The numbers feed a human reviewing detector weights; nothing adjusts
//! weights automatically.

use serde::Serialize;

use crate::life_event::LifeEventType;
use crate::status::LifeEventStatus;

/// Aggregate outcome of a user's detected events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeEventStats {
    /// Distinct types currently acknowledged, first-seen order.
    pub acknowledged_types: Vec<LifeEventType>,
    /// Distinct types the user dismissed, first-seen order.
    pub dismissed_types: Vec<LifeEventType>,
    /// `completed / (total - dismissed)`, or `0.0` when nothing is left.
    pub completion_rate: f64,
}

impl LifeEventStats {
    /// Compute statistics from `(type, status)` pairs of one user's events.
    pub fn compute<I>(events: I) -> Self
    where
        I: IntoIterator<Item = (LifeEventType, LifeEventStatus)>,
    {
        let mut acknowledged_types = Vec::new();
        let mut dismissed_types = Vec::new();
        let mut completed = 0usize;
        let mut not_dismissed = 0usize;

        for (event_type, status) in events {
            match status {
                LifeEventStatus::Acknowledged => push_unique(&mut acknowledged_types, event_type),
                LifeEventStatus::Dismissed => push_unique(&mut dismissed_types, event_type),
                LifeEventStatus::Completed => completed += 1,
                LifeEventStatus::Detected => {}
            }
            if status != LifeEventStatus::Dismissed {
                not_dismissed += 1;
            }
        }

        let completion_rate = if not_dismissed > 0 {
            completed as f64 / not_dismissed as f64
        } else {
            0.0
        };

        Self {
            acknowledged_types,
            dismissed_types,
            completion_rate,
        }
    }
}

fn push_unique(types: &mut Vec<LifeEventType>, event_type: LifeEventType) {
    if !types.contains(&event_type) {
        types.push(event_type);
    }
}
