//! The relay pipeline: admission, arbitration and hand-off to delivery.

pub mod diagnostics;
pub mod gate;
pub mod normalize;
pub mod service;

pub use gate::{DestinationGate, GatePermit};
pub use normalize::{normalize, total_chars};
pub use service::{
    InboundWebhook, ProcessingReport, RelayError, RelayOutcome, RelayService, RelayStores,
};
