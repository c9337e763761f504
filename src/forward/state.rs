//! Forwarder state tracking
//!
//! Shared counters for deliveries and their outcomes, read by the
//! health endpoints and by tests. All counters are monotonic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared state for the forwarding pipeline
#[derive(Debug, Clone)]
pub struct ForwarderState {
    inner: Arc<ForwarderStateInner>,
}

#[derive(Debug, Default)]
struct ForwarderStateInner {
    subject: String,
    messages_received: AtomicU64,
    messages_rejected: AtomicU64,
    decode_failures: AtomicU64,
    logs_forwarded: AtomicU64,
    forward_failures: AtomicU64,
    republishes: AtomicU64,
    publish_failures: AtomicU64,
}

impl ForwarderState {
    /// Create state bound to the configured log subject.
    pub fn new(subject: String) -> Self {
        Self {
            inner: Arc::new(ForwarderStateInner {
                subject,
                ..Default::default()
            }),
        }
    }

    /// The one subject this process subscribes and republishes to.
    pub fn subject(&self) -> &str {
        &self.inner.subject
    }

    pub fn record_received(&self) {
        self.inner.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.inner.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.inner.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forwarded(&self) {
        self.inner.logs_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forward_failure(&self) {
        self.inner.forward_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_republish(&self) {
        self.inner.republishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.inner.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_received(&self) -> u64 {
        self.inner.messages_received.load(Ordering::Relaxed)
    }

    pub fn messages_rejected(&self) -> u64 {
        self.inner.messages_rejected.load(Ordering::Relaxed)
    }

    pub fn decode_failures(&self) -> u64 {
        self.inner.decode_failures.load(Ordering::Relaxed)
    }

    pub fn logs_forwarded(&self) -> u64 {
        self.inner.logs_forwarded.load(Ordering::Relaxed)
    }

    pub fn forward_failures(&self) -> u64 {
        self.inner.forward_failures.load(Ordering::Relaxed)
    }

    pub fn republishes(&self) -> u64 {
        self.inner.republishes.load(Ordering::Relaxed)
    }

    pub fn publish_failures(&self) -> u64 {
        self.inner.publish_failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let state = ForwarderState::new("logs.app".to_string());
        assert_eq!(state.messages_received(), 0);
        assert_eq!(state.messages_rejected(), 0);
        assert_eq!(state.logs_forwarded(), 0);
        assert_eq!(state.republishes(), 0);
    }

    #[test]
    fn counters_accumulate_across_clones() {
        let state = ForwarderState::new("logs.app".to_string());
        let clone = state.clone();

        state.record_received();
        clone.record_received();
        clone.record_forwarded();

        assert_eq!(state.messages_received(), 2);
        assert_eq!(state.logs_forwarded(), 1);
    }

    #[test]
    fn subject_is_exposed() {
        let state = ForwarderState::new("logs.app".to_string());
        assert_eq!(state.subject(), "logs.app");
    }
}
