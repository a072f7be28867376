//! Decoding of `core show channels` output.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// CLI command whose output feeds [`ChannelStats`].
pub const CHANNELS_COMMAND: &str = "core show channels";

/// Channel and call counters reported by `core show channels`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Channel lines starting with `SIP/`
    pub sip_channels: u64,
    /// Channel lines starting with `IAX2/`
    pub iax_channels: u64,
    pub active_calls: u64,
    pub active_channels: u64,
    pub calls_processed: u64,
}

impl ChannelStats {
    /// Scan command output line by line.
    ///
    /// Never fails: a counter whose line is missing, or whose leading token
    /// is not a number, stays at zero.
    pub fn from_command_output(output: &str) -> Self {
        let mut stats = Self::default();

        for line in output.lines().map(|line| line.trim_end_matches('\r')) {
            if line.contains("active channels") {
                set_leading_count(&mut stats.active_channels, line);
            } else if line.contains("active calls") {
                set_leading_count(&mut stats.active_calls, line);
            } else if line.contains("calls processed") {
                set_leading_count(&mut stats.calls_processed, line);
            } else if line.starts_with("SIP/") {
                stats.sip_channels += 1;
            } else if line.starts_with("IAX2/") {
                stats.iax_channels += 1;
            }
        }

        stats
    }

    /// Named counters in publication order.
    pub fn metrics(&self) -> [(&'static str, u64); 5] {
        [
            ("sip_channels", self.sip_channels),
            ("iax_channels", self.iax_channels),
            ("active_calls", self.active_calls),
            ("active_channels", self.active_channels),
            ("calls_processed", self.calls_processed),
        ]
    }
}

fn set_leading_count(field: &mut u64, line: &str) {
    match line.split_whitespace().next().map(str::parse::<u64>) {
        Some(Ok(count)) => *field = count,
        _ => warn!("Could not read counter from line: {:?}", line),
    }
}
