//! Repository for the signal tables read by detection.
//!
//! Loads are bounded by lookback window and row cap; older or surplus
//! signals never reach the detectors.

use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::PgPool;

use legacy_core::signals::{ExternalIndicator, ProfileChange};
use legacy_core::tracking::{
    ACTIVITY_LOAD_LIMIT, ACTIVITY_LOOKBACK_DAYS, INDICATOR_LOAD_LIMIT, INDICATOR_LOOKBACK_DAYS,
    PROFILE_CHANGE_LOAD_LIMIT, PROFILE_CHANGE_LOOKBACK_DAYS,
};
use legacy_core::types::{DbId, Timestamp};

use crate::models::signal::{
    CreateUserActivity, ExternalIndicatorRow, ProfileChangeRow, UserActivityRow,
};

const ACTIVITY_COLUMNS: &str = "id, user_id, activity_type, details, occurred_at";
const PROFILE_CHANGE_COLUMNS: &str = "id, user_id, field, old_value, new_value, changed_at";
const INDICATOR_COLUMNS: &str =
    "id, user_id, source, indicator_type, confidence, data, recorded_at";

fn cutoff(days: u32) -> Timestamp {
    Utc::now() - Duration::days(i64::from(days))
}

/// Provides insert and windowed-load operations for detection signals.
pub struct SignalRepo;

impl SignalRepo {
    // -- inserts ------------------------------------------------------------

    pub async fn insert_activity(
        pool: &PgPool,
        activity: &CreateUserActivity,
    ) -> Result<DbId, sqlx::Error> {
        let details = Value::Object(activity.details.clone().into_inner());
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO user_activities (user_id, activity_type, details, occurred_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&activity.user_id)
        .bind(activity.activity_type.as_str())
        .bind(details)
        .bind(activity.occurred_at)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn insert_profile_change(
        pool: &PgPool,
        user_id: &str,
        change: &ProfileChange,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO profile_changes (user_id, field, old_value, new_value, changed_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(&change.field)
        .bind(&change.old_value)
        .bind(&change.new_value)
        .bind(change.timestamp)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Record an external indicator observed at `recorded_at`.
    pub async fn insert_indicator(
        pool: &PgPool,
        user_id: &str,
        indicator: &ExternalIndicator,
        recorded_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO external_indicators \
                (user_id, source, indicator_type, confidence, data, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(indicator.source.as_str())
        .bind(&indicator.indicator_type)
        .bind(indicator.confidence)
        .bind(&indicator.data)
        .bind(recorded_at)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    // -- windowed loads -----------------------------------------------------

    /// Activities from the last 90 days, newest first, at most 100.
    pub async fn recent_activities(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<UserActivityRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_activities \
             WHERE user_id = $1 AND occurred_at >= $2 \
             ORDER BY occurred_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, UserActivityRow>(&query)
            .bind(user_id)
            .bind(cutoff(ACTIVITY_LOOKBACK_DAYS))
            .bind(ACTIVITY_LOAD_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Profile changes from the last 90 days, newest first, at most 50.
    pub async fn recent_profile_changes(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<ProfileChangeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_CHANGE_COLUMNS} FROM profile_changes \
             WHERE user_id = $1 AND changed_at >= $2 \
             ORDER BY changed_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, ProfileChangeRow>(&query)
            .bind(user_id)
            .bind(cutoff(PROFILE_CHANGE_LOOKBACK_DAYS))
            .bind(PROFILE_CHANGE_LOAD_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Indicators from the last 30 days, newest first, at most 20.
    pub async fn recent_indicators(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<ExternalIndicatorRow>, sqlx::Error> {
        let query = format!(
            "SELECT {INDICATOR_COLUMNS} FROM external_indicators \
             WHERE user_id = $1 AND recorded_at >= $2 \
             ORDER BY recorded_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, ExternalIndicatorRow>(&query)
            .bind(user_id)
            .bind(cutoff(INDICATOR_LOOKBACK_DAYS))
            .bind(INDICATOR_LOAD_LIMIT)
            .fetch_all(pool)
            .await
    }
}
