//! Relay observability: structured outcome events and in-process counters.
//!
//! Events go to an `EventSink` (tracing by default). Counters are kept as
//! atomics and rendered in Prometheus text format for the shutdown summary.

pub mod events;
pub mod metrics;

pub use events::{EventSink, ForwardAction, ForwardedEvent, RelayEvent, SkippedEvent, TracingSink};
pub use metrics::RelayMetrics;
