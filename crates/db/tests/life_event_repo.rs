//! Integration tests for the `life_events` repository.
//!
//! Exercises the repository against a real database:
//! - Insert defaults status to `detected`
//! - Active listing filters terminal statuses, orders newest first, honours the limit
//! - Conditional transitions only apply from allowed source statuses
//! - Schema constraints reject out-of-range confidence

use chrono::{Duration, Utc};
use sqlx::PgPool;

use legacy_core::life_event::{LifeEvent, LifeEventType, NewLifeEvent};
use legacy_core::status::LifeEventStatus;
use legacy_db::repositories::LifeEventRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_event(user_id: &str, event_type: LifeEventType, days_ago: i64) -> NewLifeEvent {
    NewLifeEvent {
        user_id: user_id.to_string(),
        event_type,
        detected_date: Utc::now() - Duration::days(days_ago),
        confidence: 0.8,
        indicators: vec!["Test indicator".to_string()],
        suggested_updates: event_type
            .suggested_updates()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        urgency: event_type.urgency(),
    }
}

fn statuses(from: &[LifeEventStatus]) -> Vec<String> {
    from.iter().map(|s| s.as_str().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_find(pool: PgPool) {
    let created = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Marriage, 0))
        .await
        .unwrap();
    assert_eq!(created.status, "detected");
    assert_eq!(created.event_type, "marriage");
    assert_eq!(created.indicators, vec!["Test indicator".to_string()]);

    let found = LifeEventRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    let event = LifeEvent::try_from(found).unwrap();
    assert_eq!(event.event_type, LifeEventType::Marriage);
    assert_eq!(event.status, LifeEventStatus::Detected);
    assert_eq!(event.suggested_updates.len(), 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_missing_returns_none(pool: PgPool) {
    assert!(LifeEventRepo::find_by_id(&pool, 9_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_active_filters_and_orders(pool: PgPool) {
    let old = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Move, 5))
        .await
        .unwrap();
    let recent = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Birth, 1))
        .await
        .unwrap();
    let dismissed = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::JobChange, 0))
        .await
        .unwrap();
    LifeEventRepo::create(&pool, &new_event("user_2", LifeEventType::Death, 0))
        .await
        .unwrap();

    LifeEventRepo::transition_status(
        &pool,
        dismissed.id,
        "dismissed",
        &statuses(&[LifeEventStatus::Detected]),
    )
    .await
    .unwrap()
    .unwrap();

    let active = LifeEventRepo::list_active(&pool, "user_1", 10).await.unwrap();
    let ids: Vec<i64> = active.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![recent.id, old.id]);

    let limited = LifeEventRepo::list_active(&pool, "user_1", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, recent.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transition_respects_allowed_sources(pool: PgPool) {
    let created = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Retirement, 0))
        .await
        .unwrap();

    // Row is still detected, so an acknowledged-only guard must not match.
    let skipped = LifeEventRepo::transition_status(
        &pool,
        created.id,
        "completed",
        &statuses(&[LifeEventStatus::Acknowledged]),
    )
    .await
    .unwrap();
    assert!(skipped.is_none());

    let acknowledged = LifeEventRepo::transition_status(
        &pool,
        created.id,
        "acknowledged",
        &statuses(&[LifeEventStatus::Detected]),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(acknowledged.status, "acknowledged");
    assert!(acknowledged.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_type_status_projection(pool: PgPool) {
    let a = LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Marriage, 0))
        .await
        .unwrap();
    LifeEventRepo::create(&pool, &new_event("user_1", LifeEventType::Move, 0))
        .await
        .unwrap();
    LifeEventRepo::transition_status(&pool, a.id, "dismissed", &statuses(&[LifeEventStatus::Detected]))
        .await
        .unwrap();

    let rows = LifeEventRepo::list_type_status(&pool, "user_1").await.unwrap();
    let parsed: Vec<_> = rows.iter().map(|r| r.parse().unwrap()).collect();
    assert_eq!(
        parsed,
        vec![
            (LifeEventType::Marriage, LifeEventStatus::Dismissed),
            (LifeEventType::Move, LifeEventStatus::Detected),
        ]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_confidence_out_of_range_violates_check(pool: PgPool) {
    let mut event = new_event("user_1", LifeEventType::Birth, 0);
    event.confidence = 1.2;
    let err = LifeEventRepo::create(&pool, &event).await.unwrap_err();
    assert!(
        err.as_database_error().is_some_and(|e| e.is_check_violation()),
        "expected check violation, got {err:?}"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check(pool: PgPool) {
    legacy_db::health_check(&pool).await.unwrap();
}
