//! # Asterisk AMI - Manager Interface Client
//!
//! A small blocking client for the Asterisk Manager Interface (AMI), the
//! line-oriented TCP protocol Asterisk exposes for administration. It logs in,
//! enumerates IAX and SIP peers, runs CLI commands and turns the replies into
//! typed records and named metrics.
//!
//! ## Features
//!
//! - **Session handling**: banner, login with events disabled, explicit disconnect
//! - **Peer enumeration**: `IAXpeerlist` and `SIPPeers` decoded into records
//! - **Channel statistics**: counters scanned from `core show channels`
//! - **Metric emission**: snapshots published to any [`MetricSink`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asterisk_ami::{AmiConfig, AmiSession, PeerKind};
//!
//! fn main() -> asterisk_ami::Result<()> {
//!     let config = AmiConfig::new("127.0.0.1", 5038).with_credentials("admin", "secret");
//!     let mut session = AmiSession::connect(config)?;
//!
//!     if session.login()? {
//!         let peers = session.list_peers(PeerKind::Sip)?;
//!         let stats = session.channel_stats()?;
//!         println!("{} SIP peers, {} active calls", peers.len(), stats.active_calls);
//!     }
//!
//!     session.disconnect();
//!     Ok(())
//! }
//! ```

pub mod ami;
pub mod config;
pub mod error;
pub mod metrics;

// Re-export public API
pub use ami::{AmiSession, ChannelStats, PeerKind, PeerRecord};
pub use config::AmiConfig;
pub use error::{AmiError, Result};
pub use metrics::{
    collector::AsteriskCollector,
    data::{AsteriskSnapshot, PeerSummary},
    traits::{MemorySink, MetricSink, MetricsProvider, PrefixedSink},
};

/// The default AMI port
pub const DEFAULT_AMI_PORT: u16 = 5038;

/// The default per-read socket timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// The default TCP connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// The default metric path prefix
pub const DEFAULT_METRIC_PREFIX: &str = "asterisk";
