//! Integration tests for the signal repository.
//!
//! - Inserted signals load back as domain records
//! - Loads exclude rows outside the lookback window
//! - Loads are scoped to one user

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use legacy_core::signals::{
    ActivityDetails, ActivityRecord, ActivityType, ExternalIndicator, IndicatorSource,
    ProfileChange,
};
use legacy_db::models::signal::CreateUserActivity;
use legacy_db::repositories::SignalRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn activity(user_id: &str, days_ago: i64) -> CreateUserActivity {
    let record = ActivityRecord::new(
        user_id,
        ActivityType::GuardianUpdate,
        Utc::now() - Duration::days(days_ago),
        ActivityDetails::new()
            .with("relationship", "spouse")
            .with("action", "add"),
    );
    CreateUserActivity::from(&record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_activities_round_trip_within_window(pool: PgPool) {
    SignalRepo::insert_activity(&pool, &activity("user_1", 3)).await.unwrap();
    SignalRepo::insert_activity(&pool, &activity("user_1", 120)).await.unwrap();
    SignalRepo::insert_activity(&pool, &activity("user_2", 1)).await.unwrap();

    let rows = SignalRepo::recent_activities(&pool, "user_1").await.unwrap();
    assert_eq!(rows.len(), 1);

    let record = ActivityRecord::try_from(rows[0].clone()).unwrap();
    assert_eq!(record.activity_type, ActivityType::GuardianUpdate);
    assert_eq!(record.details.relationship(), Some("spouse"));
    assert_eq!(record.user_id, "user_1");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_changes_keep_json_values(pool: PgPool) {
    let change = ProfileChange::new("income", json!(50_000), json!("75000"), Utc::now());
    SignalRepo::insert_profile_change(&pool, "user_1", &change).await.unwrap();

    let rows = SignalRepo::recent_profile_changes(&pool, "user_1").await.unwrap();
    let loaded = ProfileChange::from(rows[0].clone());
    assert_eq!(loaded.field, "income");
    assert_eq!(loaded.old_number(), Some(50_000.0));
    assert_eq!(loaded.new_number(), Some(75_000.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_indicators_use_thirty_day_window(pool: PgPool) {
    let indicator = ExternalIndicator::new(IndicatorSource::DocumentScan, "death_certificate", 0.9);
    SignalRepo::insert_indicator(&pool, "user_1", &indicator, Utc::now() - Duration::days(2))
        .await
        .unwrap();
    SignalRepo::insert_indicator(&pool, "user_1", &indicator, Utc::now() - Duration::days(45))
        .await
        .unwrap();

    let rows = SignalRepo::recent_indicators(&pool, "user_1").await.unwrap();
    assert_eq!(rows.len(), 1);
    let loaded = ExternalIndicator::try_from(rows[0].clone()).unwrap();
    assert!(loaded.is_type("death_certificate"));
    assert_eq!(loaded.source, IndicatorSource::DocumentScan);
}
