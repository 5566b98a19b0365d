//! Event modifiers: the per-destination admission and redirect rules.
//!
//! Rules are evaluated highest priority first. A matching blacklist rule
//! denies outright, a whitelist rule that does not match denies unless a
//! higher-priority redirect already claimed the event, and matching redirect
//! rules set the channel override. Later (lower-priority) redirects overwrite
//! earlier ones.

mod pattern;
mod resolver;

pub use pattern::pattern_matches;
pub use resolver::{AclCause, AclFailure, EventCheck, ModifierResolver, evaluate};
