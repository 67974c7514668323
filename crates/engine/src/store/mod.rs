//! Life event persistence.
//!
//! [`LifeEventStore`] is the seam between orchestration and storage. The
//! PostgreSQL implementation backs production; the in-memory one backs
//! tests and embedded use.
//!
//! Every implementation applies the status state machine atomically:
//! concurrent updates to one event converge to a single final status.

use std::future::Future;

use legacy_core::life_event::{LifeEvent, NewLifeEvent};
use legacy_core::stats::LifeEventStats;
use legacy_core::status::LifeEventStatus;
use legacy_core::tracking::BufferedSignals;
use legacy_core::types::{DbId, Timestamp};

use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryLifeEventStore;
pub use postgres::PgLifeEventStore;

pub trait LifeEventStore: Send + Sync {
    /// Store a newly detected event with status `detected`.
    fn persist(&self, event: &NewLifeEvent) -> impl Future<Output = Result<DbId, StoreError>> + Send;

    fn find(&self, id: DbId) -> impl Future<Output = Result<Option<LifeEvent>, StoreError>> + Send;

    /// `detected` and `acknowledged` events for `user_id`, newest
    /// `detected_date` first, at most `limit`.
    fn active_events(
        &self,
        user_id: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<LifeEvent>, StoreError>> + Send;

    /// Move an event to `status`.
    ///
    /// Re-applying the current status returns the event unchanged. Illegal
    /// transitions fail with [`StoreError::InvalidTransition`] and leave the
    /// stored status as it was.
    fn update_status(
        &self,
        id: DbId,
        status: LifeEventStatus,
    ) -> impl Future<Output = Result<LifeEvent, StoreError>> + Send;

    fn stats(&self, user_id: &str) -> impl Future<Output = Result<LifeEventStats, StoreError>> + Send;
}

/// Stored detection signals for users.
pub trait SignalSource: Send + Sync {
    /// The user's recent signals, bounded by the detection lookback windows.
    fn load_signals(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<BufferedSignals, StoreError>> + Send;

    /// Store `signals` for `user_id`. Activities are filed under `user_id`
    /// whatever their own `user_id` says; indicators are stamped with
    /// `recorded_at`.
    fn record_signals(
        &self,
        user_id: &str,
        signals: &BufferedSignals,
        recorded_at: Timestamp,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
