//! Signal tracking policy: consent gate, buffering, and re-check triggers.
//!
//! The activity-tracking collaborator records signals only while the user
//! has granted consent. Without consent signals are dropped silently and
//! detection simply sees less; that is never an error.

use crate::error::CoreError;
use crate::signals::{ActivityRecord, ExternalIndicator, ProfileChange};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Profile fields whose change warrants an immediate detection run.
pub const IMMEDIATE_CHECK_FIELDS: &[&str] = &[
    "maritalStatus",
    "employmentStatus",
    "address",
    "city",
    "state",
    "numberOfChildren",
    "employer",
    "jobTitle",
];

/// Indicators above this source confidence trigger an immediate run.
pub const HIGH_CONFIDENCE_INDICATOR: f64 = 0.8;

/// Days between background detection runs.
pub const PERIODIC_CHECK_INTERVAL_DAYS: u32 = 7;

/// Lookback windows and row caps used when loading stored signals.
pub const ACTIVITY_LOOKBACK_DAYS: u32 = 90;
pub const ACTIVITY_LOAD_LIMIT: i64 = 100;
pub const PROFILE_CHANGE_LOOKBACK_DAYS: u32 = 90;
pub const PROFILE_CHANGE_LOAD_LIMIT: i64 = 50;
pub const INDICATOR_LOOKBACK_DAYS: u32 = 30;
pub const INDICATOR_LOAD_LIMIT: i64 = 20;

pub fn should_trigger_immediate_check(field: &str) -> bool {
    IMMEDIATE_CHECK_FIELDS.contains(&field)
}

pub fn indicator_triggers_check(indicator: &ExternalIndicator) -> bool {
    indicator.confidence > HIGH_CONFIDENCE_INDICATOR
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Outcome of offering a signal to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Consent withheld; the signal was discarded.
    Skipped,
    /// Buffered. `check_now` asks the caller to run detection immediately.
    Recorded { check_now: bool },
}

/// Signals drained from a [`SignalBuffer`] for one detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedSignals {
    pub activities: Vec<ActivityRecord>,
    pub profile_changes: Vec<ProfileChange>,
    pub indicators: Vec<ExternalIndicator>,
}

impl BufferedSignals {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.profile_changes.is_empty() && self.indicators.is_empty()
    }
}

/// Session-local accumulation of signals, gated by consent.
#[derive(Debug, Default)]
pub struct SignalBuffer {
    consent: bool,
    pending: BufferedSignals,
}

impl SignalBuffer {
    pub fn new(consent: bool) -> Self {
        Self {
            consent,
            pending: BufferedSignals::default(),
        }
    }

    pub fn has_consent(&self) -> bool {
        self.consent
    }

    /// Withdrawing consent also discards anything already buffered.
    pub fn set_consent(&mut self, consent: bool) {
        self.consent = consent;
        if !consent {
            self.pending = BufferedSignals::default();
        }
    }

    pub fn track_activity(&mut self, activity: ActivityRecord) -> TrackOutcome {
        if !self.consent {
            return TrackOutcome::Skipped;
        }
        self.pending.activities.push(activity);
        TrackOutcome::Recorded { check_now: false }
    }

    pub fn track_profile_change(&mut self, change: ProfileChange) -> TrackOutcome {
        if !self.consent {
            return TrackOutcome::Skipped;
        }
        let check_now = should_trigger_immediate_check(&change.field);
        self.pending.profile_changes.push(change);
        TrackOutcome::Recorded { check_now }
    }

    /// Buffer an external indicator. Fails only on an out-of-range
    /// source confidence.
    pub fn track_indicator(&mut self, indicator: ExternalIndicator) -> Result<TrackOutcome, CoreError> {
        indicator.validate()?;
        if !self.consent {
            return Ok(TrackOutcome::Skipped);
        }
        let check_now = indicator_triggers_check(&indicator);
        self.pending.indicators.push(indicator);
        Ok(TrackOutcome::Recorded { check_now })
    }

    pub fn pending(&self) -> &BufferedSignals {
        &self.pending
    }

    /// Take everything buffered, leaving the buffer empty.
    pub fn drain(&mut self) -> BufferedSignals {
        std::mem::take(&mut self.pending)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::signals::{ActivityDetails, ActivityType, IndicatorSource};

    fn activity() -> ActivityRecord {
        ActivityRecord::new("user_1", ActivityType::AssetChange, Utc::now(), ActivityDetails::new())
    }

    #[test]
    fn without_consent_everything_is_skipped() {
        let mut buffer = SignalBuffer::new(false);
        assert_eq!(buffer.track_activity(activity()), TrackOutcome::Skipped);
        assert_eq!(
            buffer.track_profile_change(ProfileChange::new("city", "A", "B", Utc::now())),
            TrackOutcome::Skipped
        );
        let ind = ExternalIndicator::new(IndicatorSource::Email, "marriage_certificate", 0.9);
        assert_eq!(buffer.track_indicator(ind).unwrap(), TrackOutcome::Skipped);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn significant_profile_fields_request_immediate_check() {
        let mut buffer = SignalBuffer::new(true);
        let outcome = buffer.track_profile_change(ProfileChange::new("employer", "A", "B", Utc::now()));
        assert_eq!(outcome, TrackOutcome::Recorded { check_now: true });
        let outcome = buffer.track_profile_change(ProfileChange::new("nickname", "A", "B", Utc::now()));
        assert_eq!(outcome, TrackOutcome::Recorded { check_now: false });
    }

    #[test]
    fn only_high_confidence_indicators_request_immediate_check() {
        let mut buffer = SignalBuffer::new(true);
        let strong = ExternalIndicator::new(IndicatorSource::DocumentScan, "death_certificate", 0.95);
        let weak = ExternalIndicator::new(IndicatorSource::Calendar, "birth_certificate", 0.8);
        assert_eq!(buffer.track_indicator(strong).unwrap(), TrackOutcome::Recorded { check_now: true });
        assert_eq!(buffer.track_indicator(weak).unwrap(), TrackOutcome::Recorded { check_now: false });
    }

    #[test]
    fn invalid_indicator_confidence_is_rejected() {
        let mut buffer = SignalBuffer::new(true);
        let bad = ExternalIndicator::new(IndicatorSource::UserInput, "death_certificate", -0.1);
        assert!(buffer.track_indicator(bad).is_err());
    }

    #[test]
    fn drain_empties_buffer() {
        let mut buffer = SignalBuffer::new(true);
        buffer.track_activity(activity());
        buffer.track_activity(activity());
        let drained = buffer.drain();
        assert_eq!(drained.activities.len(), 2);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn withdrawing_consent_discards_pending() {
        let mut buffer = SignalBuffer::new(true);
        buffer.track_activity(activity());
        buffer.set_consent(false);
        assert!(buffer.pending().is_empty());
        assert!(!buffer.has_consent());
    }
}
