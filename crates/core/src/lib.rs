//! Pure domain logic for life event detection.
//!
//! This crate has no database or runtime dependencies. Everything here is
//! deterministic and testable in isolation:
//!
//! - [`signals`]: raw inputs and the recency-aware [`signals::SignalSet`].
//! - [`rules`] / [`detectors`]: declarative detector tables.
//! - [`coordinator`]: threshold filtering and ranking.
//! - [`status`]: the life event status state machine.
//! - [`stats`]: per-user outcome statistics.
//! - [`checklist`], [`tracking`], [`config`]: supporting policy.

pub mod checklist;
pub mod config;
pub mod coordinator;
pub mod detectors;
pub mod error;
pub mod life_event;
pub mod rules;
pub mod signals;
pub mod stats;
pub mod status;
pub mod tracking;
pub mod types;
