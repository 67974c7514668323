//! In-memory [`LifeEventStore`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use legacy_core::life_event::{LifeEvent, NewLifeEvent};
use legacy_core::stats::LifeEventStats;
use legacy_core::status::LifeEventStatus;
use legacy_core::tracking::BufferedSignals;
use legacy_core::types::{DbId, Timestamp};

use super::{LifeEventStore, SignalSource};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct State {
    next_id: DbId,
    events: BTreeMap<DbId, LifeEvent>,
    signals: HashMap<String, BufferedSignals>,
    failing_persists: u32,
    failing_loads: u32,
}

/// Mutex-guarded map of events keyed by id. Ids start at 1.
///
/// Signals are kept per user without lookback windows.
#[derive(Debug, Default)]
pub struct MemoryLifeEventStore {
    state: Mutex<State>,
}

impl MemoryLifeEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` persists fail with a retryable error.
    pub fn fail_next_persists(&self, count: u32) {
        self.lock().failing_persists = count;
    }

    /// Make the next `count` signal loads fail with a retryable error.
    pub fn fail_next_loads(&self, count: u32) {
        self.lock().failing_loads = count;
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is only mutated after validation, so a poisoned guard is consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LifeEventStore for MemoryLifeEventStore {
    async fn persist(&self, event: &NewLifeEvent) -> Result<DbId, StoreError> {
        let mut state = self.lock();
        if state.failing_persists > 0 {
            state.failing_persists -= 1;
            return Err(StoreError::Persistence("injected persistence failure".into()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state
            .events
            .insert(id, LifeEvent::from_new(id, event.clone(), Utc::now()));
        Ok(id)
    }

    async fn find(&self, id: DbId) -> Result<Option<LifeEvent>, StoreError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn active_events(&self, user_id: &str, limit: i64) -> Result<Vec<LifeEvent>, StoreError> {
        let state = self.lock();
        let mut active: Vec<LifeEvent> = state
            .events
            .values()
            .filter(|e| e.user_id == user_id && e.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.detected_date
                .cmp(&a.detected_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        active.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(active)
    }

    async fn update_status(&self, id: DbId, status: LifeEventStatus) -> Result<LifeEvent, StoreError> {
        let mut state = self.lock();
        let event = state.events.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if event.status == status {
            return Ok(event.clone());
        }
        event.status.validate_transition(status)?;
        event.status = status;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn stats(&self, user_id: &str) -> Result<LifeEventStats, StoreError> {
        let state = self.lock();
        Ok(LifeEventStats::compute(
            state
                .events
                .values()
                .filter(|e| e.user_id == user_id)
                .map(|e| (e.event_type, e.status)),
        ))
    }
}

impl SignalSource for MemoryLifeEventStore {
    async fn load_signals(&self, user_id: &str) -> Result<BufferedSignals, StoreError> {
        let mut state = self.lock();
        if state.failing_loads > 0 {
            state.failing_loads -= 1;
            return Err(StoreError::Persistence("injected load failure".into()));
        }
        Ok(state.signals.get(user_id).cloned().unwrap_or_default())
    }

    async fn record_signals(
        &self,
        user_id: &str,
        signals: &BufferedSignals,
        _recorded_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let stored = state.signals.entry(user_id.to_string()).or_default();
        stored.activities.extend(signals.activities.iter().cloned().map(|mut a| {
            a.user_id = user_id.to_string();
            a
        }));
        stored.profile_changes.extend(signals.profile_changes.iter().cloned());
        stored.indicators.extend(signals.indicators.iter().cloned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
