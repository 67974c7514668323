//! PostgreSQL [`LifeEventStore`] and [`SignalSource`] over the `legacy-db` repositories.
//!
//! Status changes run as one conditional `UPDATE ... WHERE status = ANY(..)`
//! so the transition check and the write cannot interleave with another
//! writer.

use legacy_core::error::CoreError;
use legacy_core::life_event::{LifeEvent, NewLifeEvent};
use legacy_core::signals::{ActivityRecord, ExternalIndicator, ProfileChange};
use legacy_core::stats::LifeEventStats;
use legacy_core::status::{InvalidTransition, LifeEventStatus};
use legacy_core::tracking::BufferedSignals;
use legacy_core::types::{DbId, Timestamp};
use legacy_db::models::life_event::LifeEventRow;
use legacy_db::models::signal::CreateUserActivity;
use legacy_db::repositories::{LifeEventRepo, SignalRepo};
use legacy_db::DbPool;

use super::{LifeEventStore, SignalSource};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PgLifeEventStore {
    pool: DbPool,
}

impl PgLifeEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn decode(row: LifeEventRow) -> Result<LifeEvent, StoreError> {
    LifeEvent::try_from(row).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_status(raw: &str) -> Result<LifeEventStatus, StoreError> {
    raw.parse().map_err(|e: CoreError| StoreError::Decode(e.to_string()))
}

impl LifeEventStore for PgLifeEventStore {
    async fn persist(&self, event: &NewLifeEvent) -> Result<DbId, StoreError> {
        let row = LifeEventRepo::create(&self.pool, event).await?;
        Ok(row.id)
    }

    async fn find(&self, id: DbId) -> Result<Option<LifeEvent>, StoreError> {
        LifeEventRepo::find_by_id(&self.pool, id)
            .await?
            .map(decode)
            .transpose()
    }

    async fn active_events(&self, user_id: &str, limit: i64) -> Result<Vec<LifeEvent>, StoreError> {
        LifeEventRepo::list_active(&self.pool, user_id, limit)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn update_status(&self, id: DbId, status: LifeEventStatus) -> Result<LifeEvent, StoreError> {
        let allowed_from: Vec<String> = LifeEventStatus::sources_for(status)
            .into_iter()
            .filter(|from| *from != status)
            .map(|from| from.as_str().to_string())
            .collect();

        if let Some(row) =
            LifeEventRepo::transition_status(&self.pool, id, status.as_str(), &allowed_from).await?
        {
            return decode(row);
        }

        // Nothing matched: the row is missing, already there, or the move is illegal.
        let row = LifeEventRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        let current = decode_status(&row.status)?;
        if current == status {
            return decode(row);
        }
        Err(InvalidTransition {
            from: current,
            to: status,
        }
        .into())
    }

    async fn stats(&self, user_id: &str) -> Result<LifeEventStats, StoreError> {
        let pairs = LifeEventRepo::list_type_status(&self.pool, user_id)
            .await?
            .iter()
            .map(|row| row.parse().map_err(|e| StoreError::Decode(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LifeEventStats::compute(pairs))
    }
}

impl SignalSource for PgLifeEventStore {
    /// Rows whose stored type no longer parses are skipped with a warning.
    async fn load_signals(&self, user_id: &str) -> Result<BufferedSignals, StoreError> {
        let activities = SignalRepo::recent_activities(&self.pool, user_id)
            .await?
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                ActivityRecord::try_from(row)
                    .map_err(|e| tracing::warn!(activity_id = id, error = %e, "Skipping unreadable activity"))
                    .ok()
            })
            .collect();

        let profile_changes = SignalRepo::recent_profile_changes(&self.pool, user_id)
            .await?
            .into_iter()
            .map(ProfileChange::from)
            .collect();

        let indicators = SignalRepo::recent_indicators(&self.pool, user_id)
            .await?
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                ExternalIndicator::try_from(row)
                    .map_err(|e| tracing::warn!(indicator_id = id, error = %e, "Skipping unreadable indicator"))
                    .ok()
            })
            .collect();

        Ok(BufferedSignals {
            activities,
            profile_changes,
            indicators,
        })
    }

    async fn record_signals(
        &self,
        user_id: &str,
        signals: &BufferedSignals,
        recorded_at: Timestamp,
    ) -> Result<(), StoreError> {
        for activity in &signals.activities {
            let mut create = CreateUserActivity::from(activity);
            create.user_id = user_id.to_string();
            SignalRepo::insert_activity(&self.pool, &create).await?;
        }
        for change in &signals.profile_changes {
            SignalRepo::insert_profile_change(&self.pool, user_id, change).await?;
        }
        for indicator in &signals.indicators {
            SignalRepo::insert_indicator(&self.pool, user_id, indicator, recorded_at).await?;
        }
        Ok(())
    }
}
