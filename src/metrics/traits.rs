//! Traits at the boundary with the host metrics framework.

use crate::error::Result;
use crate::metrics::data::AsteriskSnapshot;

/// Trait for collecting Asterisk metrics.
pub trait MetricsProvider {
    /// Run one collection cycle and return its snapshot.
    fn collect_snapshot(
        &mut self,
    ) -> impl std::future::Future<Output = Result<AsteriskSnapshot>> + Send;
}

/// Receiver of named numeric metrics.
///
/// Implemented by the host framework; this crate only emits values.
pub trait MetricSink {
    fn publish(&mut self, name: &str, value: u64);
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn publish(&mut self, name: &str, value: u64) {
        (**self).publish(name, value);
    }
}

/// Sink that prepends a dotted path to every metric name.
#[derive(Debug)]
pub struct PrefixedSink<S> {
    prefix: String,
    inner: S,
}

impl<S: MetricSink> PrefixedSink<S> {
    pub fn new(prefix: impl Into<String>, inner: S) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MetricSink> MetricSink for PrefixedSink<S> {
    fn publish(&mut self, name: &str, value: u64) {
        if self.prefix.is_empty() {
            self.inner.publish(name, value);
        } else {
            let full_name = format!("{}.{}", self.prefix, name);
            self.inner.publish(&full_name, value);
        }
    }
}

/// Sink that keeps published values in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub values: Vec<(String, u64)>,
}

impl MemorySink {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl MetricSink for MemorySink {
    fn publish(&mut self, name: &str, value: u64) {
        self.values.push((name.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_sink() {
        let mut sink = PrefixedSink::new("asterisk", MemorySink::default());
        sink.publish("active_calls", 4);

        let inner = sink.into_inner();
        assert_eq!(inner.get("asterisk.active_calls"), Some(4));
        assert_eq!(inner.get("active_calls"), None);
    }

    #[test]
    fn test_empty_prefix() {
        let mut memory = MemorySink::default();
        PrefixedSink::new("", &mut memory).publish("sip_channels", 2);
        assert_eq!(memory.get("sip_channels"), Some(2));
    }
}
