//! Database models.
//!
//! These map directly to the schema; list-valued columns are JSON text and
//! are decoded through accessor methods.

pub mod audit;
pub mod destination;
pub mod event_modifier;
pub mod repo_binding;

pub use audit::*;
pub use destination::*;
pub use event_modifier::*;
pub use repo_binding::*;
