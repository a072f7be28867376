//! Collection cycle against an Asterisk manager.

use crate::ami::AmiSession;
use crate::config::AmiConfig;
use crate::error::{AmiError, Result};
use crate::metrics::{
    data::{AsteriskSnapshot, PeerSummary},
    traits::{MetricSink, MetricsProvider},
};
use tracing::{debug, warn};

/// Collects peer and channel statistics over a fresh AMI session per cycle.
#[derive(Debug, Clone)]
pub struct AsteriskCollector {
    config: AmiConfig,
}

impl AsteriskCollector {
    /// Create a new collector. The configuration is checked here so a bad
    /// host or port fails before the first cycle.
    pub fn new(config: AmiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run one blocking cycle: connect, login, query, disconnect.
    ///
    /// A rejected login still yields a snapshot, with every counter at zero.
    pub fn collect_blocking(&self) -> Result<AsteriskSnapshot> {
        let mut session = AmiSession::connect(self.config.clone())?;
        let result = Self::query(&mut session);
        session.disconnect();
        result
    }

    fn query(session: &mut AmiSession) -> Result<AsteriskSnapshot> {
        let mut snapshot = AsteriskSnapshot::new();
        snapshot.authenticated = session.login()?;
        if !snapshot.authenticated {
            warn!("Collecting without authentication; all counters will be zero");
        }

        let iax_peers = session.iax_peers()?;
        let sip_peers = session.sip_peers()?;
        snapshot.peers = PeerSummary::from_peers(&iax_peers, &sip_peers);
        snapshot.channels = session.channel_stats()?;

        debug!(
            "Collected {} IAX peers, {} SIP peers, {} active channels",
            snapshot.peers.iax_peers_total,
            snapshot.peers.sip_peers_total,
            snapshot.channels.active_channels
        );
        Ok(snapshot)
    }

    /// Run one cycle and publish every value to `sink`.
    pub fn collect_into<S: MetricSink>(&self, sink: &mut S) -> Result<AsteriskSnapshot> {
        let snapshot = self.collect_blocking()?;
        publish(&snapshot, sink);
        Ok(snapshot)
    }
}

/// Emit every named value of `snapshot`.
pub fn publish<S: MetricSink + ?Sized>(snapshot: &AsteriskSnapshot, sink: &mut S) {
    for (name, value) in snapshot.metrics() {
        sink.publish(name, value);
    }
}

impl MetricsProvider for AsteriskCollector {
    async fn collect_snapshot(&mut self) -> Result<AsteriskSnapshot> {
        let collector = self.clone();
        tokio::task::spawn_blocking(move || collector.collect_blocking())
            .await
            .map_err(|e| AmiError::task_error(e.to_string()))?
    }
}
