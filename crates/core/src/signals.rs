//! Raw detection signals and the normalizer that detectors scan.
//!
//! Three kinds of input feed the detectors:
//!
//! - [`ActivityRecord`]: a tracked user action with an open attribute bag.
//! - [`ProfileChange`]: a single profile field mutation.
//! - [`ExternalIndicator`]: a third-party or derived classification.
//!
//! [`SignalSet`] borrows all three for one detection run and exposes the
//! shared recency predicate. Missing or malformed attributes never fail a
//! run; they simply read as absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::{Timestamp, UserId};

/// Milliseconds in one day, used by the recency predicate.
const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Activity records
// ---------------------------------------------------------------------------

/// Kind of tracked user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    ProfileUpdate,
    AssetChange,
    BeneficiaryUpdate,
    DocumentUpload,
    GuardianUpdate,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::ProfileUpdate,
        ActivityType::AssetChange,
        ActivityType::BeneficiaryUpdate,
        ActivityType::DocumentUpload,
        ActivityType::GuardianUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::ProfileUpdate => "profile_update",
            ActivityType::AssetChange => "asset_change",
            ActivityType::BeneficiaryUpdate => "beneficiary_update",
            ActivityType::DocumentUpload => "document_upload",
            ActivityType::GuardianUpdate => "guardian_update",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown activity type '{s}'")))
    }
}

/// The `action` attribute of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Update,
}

impl Action {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Action::Add),
            "remove" => Some(Action::Remove),
            "update" => Some(Action::Update),
            _ => None,
        }
    }
}

/// Open attribute bag attached to an [`ActivityRecord`].
///
/// Well-known keys: `action`, `relationship`, `reason`, `document_type`,
/// `asset_type`, `change_type`, `update_type`, `value`. Unknown keys are kept
/// but ignored by the detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityDetails(Map<String, Value>);

impl ActivityDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a single attribute.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// String attribute, or `None` when missing or not a string.
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn action(&self) -> Option<Action> {
        self.str_attr("action").and_then(Action::parse)
    }

    pub fn relationship(&self) -> Option<&str> {
        self.str_attr("relationship")
    }

    pub fn reason(&self) -> Option<&str> {
        self.str_attr("reason")
    }

    pub fn document_type(&self) -> Option<&str> {
        self.str_attr("document_type")
    }

    pub fn asset_type(&self) -> Option<&str> {
        self.str_attr("asset_type")
    }

    pub fn change_type(&self) -> Option<&str> {
        self.str_attr("change_type")
    }

    pub fn update_type(&self) -> Option<&str> {
        self.str_attr("update_type")
    }

    /// Numeric `value` attribute (monetary amounts for asset changes).
    pub fn value(&self) -> Option<f64> {
        self.0.get("value").and_then(Value::as_f64)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ActivityDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One observed user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_type: ActivityType,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub details: ActivityDetails,
    pub user_id: UserId,
}

impl ActivityRecord {
    pub fn new(
        user_id: impl Into<UserId>,
        activity_type: ActivityType,
        timestamp: Timestamp,
        details: ActivityDetails,
    ) -> Self {
        Self {
            activity_type,
            timestamp,
            details,
            user_id: user_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile changes
// ---------------------------------------------------------------------------

/// A single profile field mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileChange {
    pub field: String,
    #[serde(default)]
    pub old_value: Value,
    #[serde(default)]
    pub new_value: Value,
    pub timestamp: Timestamp,
}

impl ProfileChange {
    pub fn new(
        field: impl Into<String>,
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            field: field.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            timestamp,
        }
    }

    pub fn old_number(&self) -> Option<f64> {
        value_as_number(&self.old_value)
    }

    pub fn new_number(&self) -> Option<f64> {
        value_as_number(&self.new_value)
    }
}

/// Profile forms submit numbers as either JSON numbers or numeric strings.
fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// External indicators
// ---------------------------------------------------------------------------

/// Origin of an [`ExternalIndicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSource {
    Calendar,
    Email,
    DocumentScan,
    UserInput,
}

impl IndicatorSource {
    pub const ALL: [IndicatorSource; 4] = [
        IndicatorSource::Calendar,
        IndicatorSource::Email,
        IndicatorSource::DocumentScan,
        IndicatorSource::UserInput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorSource::Calendar => "calendar",
            IndicatorSource::Email => "email",
            IndicatorSource::DocumentScan => "document_scan",
            IndicatorSource::UserInput => "user_input",
        }
    }
}

impl FromStr for IndicatorSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown indicator source '{s}'")))
    }
}

/// A third-party or derived signal, e.g. a scanned-document classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIndicator {
    pub source: IndicatorSource,
    pub indicator_type: String,
    pub confidence: f64,
    #[serde(default)]
    pub data: Value,
}

impl ExternalIndicator {
    pub fn new(source: IndicatorSource, indicator_type: impl Into<String>, confidence: f64) -> Self {
        Self {
            source,
            indicator_type: indicator_type.into(),
            confidence,
            data: Value::Object(Map::new()),
        }
    }

    pub fn is_type(&self, indicator_type: &str) -> bool {
        self.indicator_type == indicator_type
    }

    /// Reject source confidences outside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        ensure_confidence(self.confidence, "indicator confidence")
    }
}

/// A confidence is a probability: finite and within `[0.0, 1.0]`.
pub fn ensure_confidence(value: f64, label: &str) -> Result<(), CoreError> {
    if value.is_nan() || value < 0.0 || value > 1.0 {
        return Err(CoreError::Validation(format!(
            "{label} {value} is not a confidence in [0, 1]"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signal set
// ---------------------------------------------------------------------------

/// Whether `timestamp` lies within `days_threshold` days of `now`.
///
/// The distance is measured in whole days rounded up, in either direction,
/// so a record from 30 days and one hour ago counts as 31 days old.
pub fn is_recent_at(now: Timestamp, timestamp: Timestamp, days_threshold: u32) -> bool {
    let diff_ms = (now - timestamp).num_milliseconds().abs();
    let diff_days = (diff_ms + MS_PER_DAY - 1) / MS_PER_DAY;
    diff_days <= i64::from(days_threshold)
}

/// Borrowed view over one user's signals for a single detection run.
#[derive(Debug, Clone, Copy)]
pub struct SignalSet<'a> {
    activities: &'a [ActivityRecord],
    profile_changes: &'a [ProfileChange],
    indicators: &'a [ExternalIndicator],
    now: Timestamp,
}

impl<'a> SignalSet<'a> {
    /// Build a signal set evaluated against the current wall clock.
    pub fn new(
        activities: &'a [ActivityRecord],
        profile_changes: &'a [ProfileChange],
        indicators: &'a [ExternalIndicator],
    ) -> Self {
        Self::at(chrono::Utc::now(), activities, profile_changes, indicators)
    }

    /// Build a signal set evaluated against a fixed `now`.
    pub fn at(
        now: Timestamp,
        activities: &'a [ActivityRecord],
        profile_changes: &'a [ProfileChange],
        indicators: &'a [ExternalIndicator],
    ) -> Self {
        Self {
            activities,
            profile_changes,
            indicators,
            now,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn is_recent(&self, timestamp: Timestamp, days_threshold: u32) -> bool {
        is_recent_at(self.now, timestamp, days_threshold)
    }

    /// `true` when no window applies or `timestamp` falls inside it.
    fn within(&self, timestamp: Timestamp, window_days: Option<u32>) -> bool {
        window_days.map_or(true, |days| self.is_recent(timestamp, days))
    }

    /// Activities of `activity_type` inside the window.
    pub fn activities(
        &self,
        activity_type: ActivityType,
        window_days: Option<u32>,
    ) -> impl Iterator<Item = &'a ActivityRecord> + '_ {
        self.activities
            .iter()
            .filter(move |a| a.activity_type == activity_type && self.within(a.timestamp, window_days))
    }

    /// Profile changes to any of `fields` inside the window.
    pub fn profile_changes(
        &self,
        fields: &'static [&'static str],
        window_days: Option<u32>,
    ) -> impl Iterator<Item = &'a ProfileChange> + '_ {
        self.profile_changes
            .iter()
            .filter(move |c| fields.contains(&c.field.as_str()) && self.within(c.timestamp, window_days))
    }

    /// External indicators of any of `types`. Indicators carry no timestamp
    /// of their own; the loader bounds them before a run.
    pub fn indicators(&self, types: &'static [&'static str]) -> impl Iterator<Item = &'a ExternalIndicator> {
        self.indicators
            .iter()
            .filter(move |i| types.contains(&i.indicator_type.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.profile_changes.is_empty() && self.indicators.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
