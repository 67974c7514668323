//! Detection orchestration: detect, de-duplicate, persist with retry.
//!
//! [`LifeEventService`] owns a [`LifeEventStore`] and the coordinator. A
//! detection run never fails because one event could not be stored; such
//! events are logged and reported in [`DetectionRun::failed`].

use std::collections::HashSet;

use serde::Serialize;

use legacy_core::config::EngineConfig;
use legacy_core::coordinator::DetectionCoordinator;
use legacy_core::life_event::{LifeEvent, LifeEventType, NewLifeEvent};
use legacy_core::signals::{ActivityRecord, ExternalIndicator, ProfileChange, SignalSet};
use legacy_core::stats::LifeEventStats;
use legacy_core::status::LifeEventStatus;
use legacy_core::tracking::{BufferedSignals, SignalBuffer};
use legacy_core::types::DbId;

use crate::error::StoreError;
use crate::retry::{retry, RetryPolicy};
use crate::store::{LifeEventStore, SignalSource};

/// Active events scanned when checking a candidate for duplicates.
const DEDUPE_SCAN_LIMIT: i64 = 100;

/// An event written during a detection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedEvent {
    pub id: DbId,
    pub event: NewLifeEvent,
}

/// An event that could not be stored after all retries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEvent {
    pub event: NewLifeEvent,
    pub error: String,
}

/// Outcome of one detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionRun {
    pub persisted: Vec<PersistedEvent>,
    /// Types skipped because the user already has an active event of that type.
    pub skipped_duplicates: Vec<LifeEventType>,
    pub failed: Vec<FailedEvent>,
}

pub struct LifeEventService<S> {
    store: S,
    coordinator: DetectionCoordinator,
    retry: RetryPolicy,
    active_limit: i64,
}

impl<S: LifeEventStore> LifeEventService<S> {
    pub fn new(store: S, config: &EngineConfig) -> Self {
        Self {
            store,
            coordinator: DetectionCoordinator::new(config.min_confidence),
            retry: RetryPolicy::from_config(config),
            active_limit: config.active_limit,
        }
    }

    /// Replace the retry policy, e.g. to drop backoff sleeps in tests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn coordinator(&self) -> &DetectionCoordinator {
        &self.coordinator
    }

    /// Run detection for `user_id` over raw signals at the current time.
    pub async fn run_detection(
        &self,
        user_id: &str,
        activities: &[ActivityRecord],
        profile_changes: &[ProfileChange],
        external_indicators: &[ExternalIndicator],
    ) -> Result<DetectionRun, StoreError> {
        let signals = SignalSet::new(activities, profile_changes, external_indicators);
        let detected = self.detect(user_id, &signals);
        self.persist_new(user_id, detected).await
    }

    /// Run detection over a prepared [`SignalSet`].
    ///
    /// Fails only if the user's active events cannot be read for
    /// de-duplication; individual persistence failures are reported in the
    /// returned [`DetectionRun`].
    pub async fn run_detection_signals(
        &self,
        user_id: &str,
        signals: &SignalSet<'_>,
    ) -> Result<DetectionRun, StoreError> {
        let detected = self.detect(user_id, signals);
        self.persist_new(user_id, detected).await
    }

    fn detect(&self, user_id: &str, signals: &SignalSet<'_>) -> Vec<NewLifeEvent> {
        let candidates = self.coordinator.candidates(signals);
        for candidate in candidates.iter().filter(|c| !self.coordinator.accepts(c)) {
            tracing::debug!(
                user_id,
                event_type = %candidate.event_type,
                confidence = candidate.confidence,
                "Candidate below confidence threshold",
            );
        }
        self.coordinator.select(candidates, user_id)
    }

    async fn persist_new(
        &self,
        user_id: &str,
        detected: Vec<NewLifeEvent>,
    ) -> Result<DetectionRun, StoreError> {
        let mut run = DetectionRun::default();
        if detected.is_empty() {
            return Ok(run);
        }

        let active = retry(&self.retry, "active_events", || {
            self.store.active_events(user_id, DEDUPE_SCAN_LIMIT)
        })
        .await?;
        let mut seen: HashSet<LifeEventType> = active.iter().map(|e| e.event_type).collect();

        for event in detected {
            if !seen.insert(event.event_type) {
                tracing::debug!(user_id, event_type = %event.event_type, "Event type already active, skipping");
                run.skipped_duplicates.push(event.event_type);
                continue;
            }

            match retry(&self.retry, "persist", || self.store.persist(&event)).await {
                Ok(id) => {
                    tracing::info!(
                        user_id,
                        event_id = id,
                        event_type = %event.event_type,
                        confidence = event.confidence,
                        "Life event detected",
                    );
                    run.persisted.push(PersistedEvent { id, event });
                }
                Err(e) => {
                    tracing::error!(
                        user_id,
                        event_type = %event.event_type,
                        error = %e,
                        "Dropping life event after failed persistence",
                    );
                    run.failed.push(FailedEvent {
                        event,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(run)
    }

    // -- presenter boundary -------------------------------------------------

    /// The user's open events, newest first, capped by the configured limit.
    pub async fn active_events(&self, user_id: &str) -> Result<Vec<LifeEvent>, StoreError> {
        self.store.active_events(user_id, self.active_limit).await
    }

    /// Apply a status change. Invalid transitions are returned, not retried.
    pub async fn update_status(
        &self,
        event_id: DbId,
        status: LifeEventStatus,
    ) -> Result<LifeEvent, StoreError> {
        match self.store.update_status(event_id, status).await {
            Ok(event) => {
                tracing::info!(event_id, status = %event.status, "Life event status updated");
                Ok(event)
            }
            Err(e) => {
                tracing::warn!(event_id, requested = %status, error = %e, "Life event status update rejected");
                Err(e)
            }
        }
    }

    pub async fn acknowledge(&self, event_id: DbId) -> Result<LifeEvent, StoreError> {
        self.update_status(event_id, LifeEventStatus::Acknowledged).await
    }

    pub async fn dismiss(&self, event_id: DbId) -> Result<LifeEvent, StoreError> {
        self.update_status(event_id, LifeEventStatus::Dismissed).await
    }

    pub async fn complete(&self, event_id: DbId) -> Result<LifeEvent, StoreError> {
        self.update_status(event_id, LifeEventStatus::Completed).await
    }

    pub async fn stats(&self, user_id: &str) -> Result<LifeEventStats, StoreError> {
        self.store.stats(user_id).await
    }
}

impl<S: LifeEventStore + SignalSource> LifeEventService<S> {
    /// Run detection from a session buffer, falling back to stored signals.
    ///
    /// Each signal kind comes from `buffer` when it holds any, otherwise
    /// from the store's recent signals. After a successful run the buffered
    /// signals are recorded and the buffer is drained; on error the buffer
    /// is left intact so the next check sees the same signals.
    pub async fn check_for_life_events(
        &self,
        user_id: &str,
        buffer: &mut SignalBuffer,
    ) -> Result<DetectionRun, StoreError> {
        let pending = buffer.pending();
        let needs_stored = pending.activities.is_empty()
            || pending.profile_changes.is_empty()
            || pending.indicators.is_empty();
        let stored = if needs_stored {
            retry(&self.retry, "load_signals", || self.store.load_signals(user_id)).await?
        } else {
            BufferedSignals::default()
        };

        let activities = if pending.activities.is_empty() {
            &stored.activities
        } else {
            &pending.activities
        };
        let profile_changes = if pending.profile_changes.is_empty() {
            &stored.profile_changes
        } else {
            &pending.profile_changes
        };
        let indicators = if pending.indicators.is_empty() {
            &stored.indicators
        } else {
            &pending.indicators
        };
        tracing::debug!(
            user_id,
            activities = activities.len(),
            profile_changes = profile_changes.len(),
            indicators = indicators.len(),
            "Checking for life events",
        );

        let signals = SignalSet::new(activities, profile_changes, indicators);
        let detected = self.detect(user_id, &signals);
        let run = self.persist_new(user_id, detected).await?;

        if !pending.is_empty() {
            let recorded_at = chrono::Utc::now();
            retry(&self.retry, "record_signals", || {
                self.store.record_signals(user_id, pending, recorded_at)
            })
            .await?;
        }
        buffer.drain();
        Ok(run)
    }
}
