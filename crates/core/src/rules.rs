//! Declarative detector rule tables and the shared evaluator.
//!
//! Every detector is a static [`DetectorSpec`]: an ordered list of
//! [`Rule`]s plus the event type(s) it can emit. [`evaluate`] walks the
//! rules uniformly, so tuning a weight or window is a table edit.

use serde::Serialize;

use crate::life_event::{LifeEventCandidate, LifeEventType};
use crate::signals::SignalSet;

/// Upper bound on any detector's confidence.
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Which of a detector's two event types the signals point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Primary,
    Alternate,
}

/// Result of one rule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Miss,
    Hit,
    /// Hit that also decides the event direction. The last directed hit wins.
    Directed(Polarity),
}

impl Verdict {
    pub fn from_bool(hit: bool) -> Self {
        if hit {
            Verdict::Hit
        } else {
            Verdict::Miss
        }
    }
}

/// How a firing rule changes the running confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Effect {
    /// Add a fixed weight.
    Add(f64),
    /// Replace the running confidence outright.
    Set(f64),
}

impl Effect {
    fn apply(self, confidence: f64) -> f64 {
        match self {
            Effect::Add(weight) => confidence + weight,
            Effect::Set(value) => value,
        }
    }
}

/// Signal predicate. Receives the rule's window so one function can be
/// shared between rules with different windows.
pub type Check = fn(&SignalSet<'_>, Option<u32>) -> Verdict;

/// One weighted check in a detector table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub explanation: &'static str,
    pub effect: Effect,
    /// Recency window in days; `None` means the check ignores timestamps.
    pub window_days: Option<u32>,
    pub check: Check,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("explanation", &self.explanation)
            .field("effect", &self.effect)
            .field("window_days", &self.window_days)
            .finish()
    }
}

/// A complete detector definition.
#[derive(Debug)]
pub struct DetectorSpec {
    pub name: &'static str,
    pub primary: LifeEventType,
    /// Second event type selected by a [`Polarity::Alternate`] verdict.
    pub alternate: Option<LifeEventType>,
    pub rules: &'static [Rule],
}

impl DetectorSpec {
    fn event_type(&self, polarity: Polarity) -> LifeEventType {
        match (polarity, self.alternate) {
            (Polarity::Alternate, Some(alternate)) => alternate,
            _ => self.primary,
        }
    }

    pub fn detect(&self, signals: &SignalSet<'_>) -> Option<LifeEventCandidate> {
        evaluate(self, signals)
    }
}

/// Run a detector table against `signals`.
///
/// Returns `None` when no rule fired. The confidence of a returned
/// candidate is capped at [`MAX_CONFIDENCE`] and `indicators` holds exactly
/// one explanation per fired rule.
pub fn evaluate(spec: &DetectorSpec, signals: &SignalSet<'_>) -> Option<LifeEventCandidate> {
    let mut confidence = 0.0_f64;
    let mut indicators = Vec::new();
    let mut polarity = Polarity::Primary;

    for rule in spec.rules {
        match (rule.check)(signals, rule.window_days) {
            Verdict::Miss => continue,
            Verdict::Hit => {}
            Verdict::Directed(p) => polarity = p,
        }
        indicators.push(rule.explanation.to_string());
        confidence = rule.effect.apply(confidence);
    }

    let confidence = confidence.min(MAX_CONFIDENCE);
    if confidence <= 0.0 || indicators.is_empty() {
        return None;
    }

    let event_type = spec.event_type(polarity);
    Some(LifeEventCandidate {
        event_type,
        detected_date: signals.now(),
        confidence,
        indicators,
        suggested_updates: event_type
            .suggested_updates()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        urgency: event_type.urgency(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
