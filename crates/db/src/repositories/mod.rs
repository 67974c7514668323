//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod life_event_repo;
pub mod signal_repo;

pub use life_event_repo::LifeEventRepo;
pub use signal_repo::SignalRepo;
