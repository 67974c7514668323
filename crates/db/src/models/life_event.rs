//! `life_events` rows.

use serde::Serialize;
use sqlx::FromRow;

use legacy_core::error::CoreError;
use legacy_core::life_event::{LifeEvent, LifeEventType, Urgency};
use legacy_core::status::LifeEventStatus;
use legacy_core::types::{DbId, Timestamp};

/// A full `life_events` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LifeEventRow {
    pub id: DbId,
    pub user_id: String,
    pub event_type: String,
    pub detected_date: Timestamp,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub suggested_updates: Vec<String>,
    pub urgency: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<LifeEventRow> for LifeEvent {
    type Error = CoreError;

    fn try_from(row: LifeEventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let decode = |e: CoreError| CoreError::Internal(format!("life_events row {id}: {e}"));
        Ok(Self {
            id,
            event_type: row.event_type.parse::<LifeEventType>().map_err(decode)?,
            urgency: row.urgency.parse::<Urgency>().map_err(decode)?,
            status: row.status.parse::<LifeEventStatus>().map_err(decode)?,
            user_id: row.user_id,
            detected_date: row.detected_date,
            confidence: row.confidence,
            indicators: row.indicators,
            suggested_updates: row.suggested_updates,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The `(event_type, status)` projection used for statistics.
#[derive(Debug, Clone, FromRow)]
pub struct EventTypeStatusRow {
    pub event_type: String,
    pub status: String,
}

impl EventTypeStatusRow {
    pub fn parse(&self) -> Result<(LifeEventType, LifeEventStatus), CoreError> {
        Ok((self.event_type.parse()?, self.status.parse()?))
    }
}
