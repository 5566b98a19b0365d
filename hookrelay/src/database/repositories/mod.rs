//! Repository layer for database access.
//!
//! Each store is a trait with a sqlx-backed implementation, so the relay
//! pipeline depends on the contract rather than on SQLite.

pub mod audit;
pub mod destination;
pub mod event_modifier;
pub mod repo_binding;

pub use audit::*;
pub use destination::*;
pub use event_modifier::*;
pub use repo_binding::*;
