//! Data structures for Asterisk metrics.

use crate::ami::{ChannelStats, PeerRecord};
use serde::{Deserialize, Serialize};

/// Result of one collection cycle against an Asterisk server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteriskSnapshot {
    /// Timestamp when this snapshot was taken (Unix timestamp in milliseconds)
    pub timestamp: u64,
    /// Whether the manager accepted the credentials
    pub authenticated: bool,
    /// Peer totals and reachability
    pub peers: PeerSummary,
    /// Channel and call counters
    pub channels: ChannelStats,
}

/// Peer counts for both channel drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSummary {
    pub iax_peers_total: u64,
    /// IAX peers with a known address
    pub iax_peers_connected: u64,
    pub sip_peers_total: u64,
    /// SIP peers whose status contains `OK`
    pub sip_peers_connected: u64,
}

impl PeerSummary {
    pub fn from_peers(iax_peers: &[PeerRecord], sip_peers: &[PeerRecord]) -> Self {
        Self {
            iax_peers_total: iax_peers.len() as u64,
            iax_peers_connected: iax_peers.iter().filter(|p| p.has_address()).count() as u64,
            sip_peers_total: sip_peers.len() as u64,
            sip_peers_connected: sip_peers.iter().filter(|p| p.status_ok()).count() as u64,
        }
    }
}

impl AsteriskSnapshot {
    /// Create an empty, unauthenticated snapshot with the current timestamp.
    pub fn new() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis().max(0) as u64,
            authenticated: false,
            peers: PeerSummary::default(),
            channels: ChannelStats::default(),
        }
    }

    /// Every named value, in publication order.
    pub fn metrics(&self) -> Vec<(&'static str, u64)> {
        let mut metrics = vec![
            ("iax_peers_total", self.peers.iax_peers_total),
            ("sip_peers_total", self.peers.sip_peers_total),
            ("sip_peers_connected", self.peers.sip_peers_connected),
            ("iax_peers_connected", self.peers.iax_peers_connected),
        ];
        metrics.extend(self.channels.metrics());
        metrics
    }
}

impl Default for AsteriskSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
