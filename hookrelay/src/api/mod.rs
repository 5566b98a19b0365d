//! HTTP surface.
//!
//! Receives GitHub webhooks, serves the per-request audit trail and a few
//! informational endpoints.

pub mod error;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};
