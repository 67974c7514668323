//! Signal rows: `user_activities`, `profile_changes`, `external_indicators`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use legacy_core::error::CoreError;
use legacy_core::signals::{
    ActivityDetails, ActivityRecord, ActivityType, ExternalIndicator, IndicatorSource,
    ProfileChange,
};
use legacy_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserActivityRow {
    pub id: DbId,
    pub user_id: String,
    pub activity_type: String,
    pub details: Value,
    pub occurred_at: Timestamp,
}

impl TryFrom<UserActivityRow> for ActivityRecord {
    type Error = CoreError;

    fn try_from(row: UserActivityRow) -> Result<Self, Self::Error> {
        let activity_type: ActivityType = row.activity_type.parse()?;
        // Non-object details carry no attributes the detectors could read.
        let details = match row.details {
            Value::Object(map) => ActivityDetails::from(map),
            _ => ActivityDetails::new(),
        };
        Ok(ActivityRecord::new(row.user_id, activity_type, row.occurred_at, details))
    }
}

/// DTO for recording an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserActivity {
    pub user_id: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub details: ActivityDetails,
    pub occurred_at: Timestamp,
}

impl From<&ActivityRecord> for CreateUserActivity {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            activity_type: record.activity_type,
            details: record.details.clone(),
            occurred_at: record.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Profile changes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfileChangeRow {
    pub id: DbId,
    pub user_id: String,
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    pub changed_at: Timestamp,
}

impl From<ProfileChangeRow> for ProfileChange {
    fn from(row: ProfileChangeRow) -> Self {
        ProfileChange::new(row.field, row.old_value, row.new_value, row.changed_at)
    }
}

// ---------------------------------------------------------------------------
// External indicators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExternalIndicatorRow {
    pub id: DbId,
    pub user_id: String,
    pub source: String,
    pub indicator_type: String,
    pub confidence: f64,
    pub data: Value,
    pub recorded_at: Timestamp,
}

impl TryFrom<ExternalIndicatorRow> for ExternalIndicator {
    type Error = CoreError;

    fn try_from(row: ExternalIndicatorRow) -> Result<Self, Self::Error> {
        let source: IndicatorSource = row.source.parse()?;
        let mut indicator = ExternalIndicator::new(source, row.indicator_type, row.confidence);
        indicator.data = row.data;
        Ok(indicator)
    }
}
