//! Repository for the `life_events` table.

use sqlx::PgPool;

use legacy_core::life_event::NewLifeEvent;
use legacy_core::status::ACTIVE_STATUSES;
use legacy_core::types::DbId;

use crate::models::life_event::{EventTypeStatusRow, LifeEventRow};

/// Column list for `life_events` queries.
const COLUMNS: &str = "\
    id, user_id, event_type, detected_date, confidence, indicators, \
    suggested_updates, urgency, status, created_at, updated_at";

/// Provides query operations for detected life events.
pub struct LifeEventRepo;

impl LifeEventRepo {
    /// Insert a newly detected event with status `detected`.
    pub async fn create(pool: &PgPool, event: &NewLifeEvent) -> Result<LifeEventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO life_events \
                (user_id, event_type, detected_date, confidence, indicators, \
                 suggested_updates, urgency) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LifeEventRow>(&query)
            .bind(&event.user_id)
            .bind(event.event_type.as_str())
            .bind(event.detected_date)
            .bind(event.confidence)
            .bind(&event.indicators)
            .bind(&event.suggested_updates)
            .bind(event.urgency.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LifeEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM life_events WHERE id = $1");
        sqlx::query_as::<_, LifeEventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's `detected` and `acknowledged` events, newest
    /// detection first, capped at `limit`.
    pub async fn list_active(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<LifeEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM life_events \
             WHERE user_id = $1 AND status = ANY($2) \
             ORDER BY detected_date DESC, id DESC \
             LIMIT $3"
        );
        let active: Vec<&str> = ACTIVE_STATUSES.iter().map(|s| s.as_str()).collect();
        sqlx::query_as::<_, LifeEventRow>(&query)
            .bind(user_id)
            .bind(&active)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// `(event_type, status)` of every event the user has ever had.
    pub async fn list_type_status(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<EventTypeStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, EventTypeStatusRow>(
            "SELECT event_type, status FROM life_events \
             WHERE user_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Set `status` only if the row's current status is in `allowed_from`.
    ///
    /// Returns `None` when the row is missing or its status did not match,
    /// so concurrent transitions cannot skip the state machine.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        allowed_from: &[String],
    ) -> Result<Option<LifeEventRow>, sqlx::Error> {
        let query = format!(
            "UPDATE life_events \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LifeEventRow>(&query)
            .bind(id)
            .bind(status)
            .bind(allowed_from)
            .fetch_optional(pool)
            .await
    }
}
