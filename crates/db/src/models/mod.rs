//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` row structs mirroring the table columns, with enum columns
//!   kept as their stored text
//! - conversions from rows into the `legacy_core` domain types

pub mod life_event;
pub mod signal;
