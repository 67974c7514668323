//! Life event storage and detection orchestration.
//!
//! - [`store`]: the [`LifeEventStore`](store::LifeEventStore) trait with
//!   PostgreSQL and in-memory implementations.
//! - [`retry`]: bounded exponential backoff for store writes.
//! - [`service`]: [`LifeEventService`](service::LifeEventService): runs
//!   detection, skips already-active event types, persists the rest.

pub mod error;
pub mod retry;
pub mod service;
pub mod store;

pub use error::StoreError;
pub use service::{DetectionRun, LifeEventService};
