//! hookrelay: relays GitHub webhook events to Discord channels.
//!
//! Each destination owns a secret, a set of bound repositories with their
//! channels, and an ordered list of event modifiers that can deny events or
//! redirect them to another channel.

pub mod api;
pub mod audit;
pub mod config;
pub mod database;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod modifiers;
pub mod relay;
pub mod services;
pub mod utils;
pub mod webhook;

pub use error::{Error, Result};
