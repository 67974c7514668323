//! Detection coordinator.
//!
//! Runs every detector against one user's signals, drops candidates below
//! the confidence threshold, and ranks the survivors. Pure: persistence is
//! a separate step so callers can de-duplicate against stored events first.

use crate::detectors::ALL_DETECTORS;
use crate::life_event::{LifeEventCandidate, NewLifeEvent};
use crate::rules::DetectorSpec;
use crate::signals::{ActivityRecord, ExternalIndicator, ProfileChange, SignalSet};

/// Default minimum confidence for a candidate to surface.
pub const MIN_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Runs a fixed set of detectors with a confidence threshold.
#[derive(Debug, Clone)]
pub struct DetectionCoordinator {
    min_confidence: f64,
    detectors: &'static [&'static DetectorSpec],
}

impl DetectionCoordinator {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            min_confidence,
            detectors: &ALL_DETECTORS,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Whether `candidate` clears the threshold (inclusive).
    pub fn accepts(&self, candidate: &LifeEventCandidate) -> bool {
        candidate.confidence >= self.min_confidence
    }

    /// Every positive candidate, before threshold filtering.
    pub fn candidates(&self, signals: &SignalSet<'_>) -> Vec<LifeEventCandidate> {
        self.detectors
            .iter()
            .filter_map(|detector| detector.detect(signals))
            .collect()
    }

    /// Detect life events for `user_id` from raw signal collections,
    /// evaluated against the current time.
    pub fn detect(
        &self,
        user_id: &str,
        activities: &[ActivityRecord],
        profile_changes: &[ProfileChange],
        external_indicators: &[ExternalIndicator],
    ) -> Vec<NewLifeEvent> {
        let signals = SignalSet::new(activities, profile_changes, external_indicators);
        self.detect_signals(user_id, &signals)
    }

    /// Detect life events from a prepared [`SignalSet`].
    ///
    /// Results are ranked most urgent first, then by descending confidence.
    pub fn detect_signals(&self, user_id: &str, signals: &SignalSet<'_>) -> Vec<NewLifeEvent> {
        self.select(self.candidates(signals), user_id)
    }

    /// Keep the candidates that clear the threshold, ranked, for `user_id`.
    pub fn select(&self, candidates: Vec<LifeEventCandidate>, user_id: &str) -> Vec<NewLifeEvent> {
        let mut accepted: Vec<LifeEventCandidate> =
            candidates.into_iter().filter(|c| self.accepts(c)).collect();
        rank(&mut accepted);
        accepted.into_iter().map(|c| c.for_user(user_id)).collect()
    }
}

impl Default for DetectionCoordinator {
    fn default() -> Self {
        Self::new(MIN_CONFIDENCE_THRESHOLD)
    }
}

/// Sort candidates most urgent first, then by descending confidence.
pub fn rank(candidates: &mut [LifeEventCandidate]) {
    candidates.sort_by(|a, b| {
        a.urgency
            .cmp(&b.urgency)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
