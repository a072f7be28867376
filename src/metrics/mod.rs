//! Asterisk metrics collection and data structures.
//!
//! This module turns AMI query results into named numeric values for a host
//! metrics framework: peer totals and reachability for IAX and SIP, plus the
//! channel and call counters from `core show channels`.

pub mod collector;
pub mod data;
pub mod traits;

// Re-export commonly used items
pub use collector::AsteriskCollector;
pub use data::{AsteriskSnapshot, PeerSummary};
pub use traits::{MemorySink, MetricSink, MetricsProvider, PrefixedSink};
