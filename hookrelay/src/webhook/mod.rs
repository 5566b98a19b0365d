//! Inbound GitHub webhook handling: signature verification and the minimal
//! envelope the relay needs before rendering.

pub mod envelope;
pub mod signature;

pub use envelope::{Envelope, event_kind};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};

/// Header carrying the GitHub event name.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Event GitHub sends when a webhook is first configured.
pub const PING_EVENT: &str = "ping";
