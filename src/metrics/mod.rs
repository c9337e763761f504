//! Prometheus metrics module

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

/// Forwarder metrics collector
#[derive(Clone)]
pub struct ForwarderMetrics {
    handle: Arc<PrometheusHandle>,
}

impl ForwarderMetrics {
    /// Initialize metrics and return handle
    pub fn new() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        Self::register_metrics();

        Self {
            handle: Arc::new(handle),
        }
    }

    /// Register metric descriptions
    fn register_metrics() {
        describe_counter!(
            "forwarder_messages_received_total",
            Unit::Count,
            "Total messages delivered by the subscription"
        );
        describe_counter!(
            "forwarder_messages_rejected_total",
            Unit::Count,
            "Messages dropped for a mismatched subject"
        );
        describe_counter!(
            "forwarder_decode_failures_total",
            Unit::Count,
            "Messages dropped for an undecodable payload"
        );
        describe_counter!(
            "forwarder_logs_forwarded_total",
            Unit::Count,
            "Logs accepted by the ingestion endpoint"
        );
        describe_counter!(
            "forwarder_forward_failures_total",
            Unit::Count,
            "Failed ingestion pushes"
        );
        describe_counter!(
            "forwarder_republishes_total",
            Unit::Count,
            "Payloads queued back onto the bus after a failed push"
        );
        describe_counter!(
            "forwarder_publish_failures_total",
            Unit::Count,
            "Asynchronous publishes the bus could not confirm"
        );

        describe_histogram!(
            "forwarder_ingest_push_duration_seconds",
            Unit::Seconds,
            "Time to push one log to the ingestion endpoint"
        );

        describe_gauge!(
            "forwarder_nats_connected",
            Unit::Count,
            "NATS connection status (1=connected, 0=disconnected)"
        );
    }

    /// Record a delivery from the subscription
    pub fn record_received(&self) {
        counter!("forwarder_messages_received_total").increment(1);
    }

    /// Record a rejected (foreign-subject) message
    pub fn record_rejected(&self, subject: &str) {
        counter!(
            "forwarder_messages_rejected_total",
            "subject" => subject.to_string()
        )
        .increment(1);
    }

    /// Record a dropped undecodable payload
    pub fn record_decode_failure(&self) {
        counter!("forwarder_decode_failures_total").increment(1);
    }

    /// Record a successful ingestion push
    pub fn record_forward_success(&self, duration: Duration) {
        counter!("forwarder_logs_forwarded_total").increment(1);

        histogram!("forwarder_ingest_push_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed ingestion push
    pub fn record_forward_failure(&self, error_type: &'static str) {
        counter!(
            "forwarder_forward_failures_total",
            "error_type" => error_type
        )
        .increment(1);
    }

    /// Record a payload queued back onto the bus
    pub fn record_republish(&self) {
        counter!("forwarder_republishes_total").increment(1);
    }

    /// Record an unconfirmed asynchronous publish
    pub fn record_publish_failure(&self) {
        counter!("forwarder_publish_failures_total").increment(1);
    }

    /// Set NATS connection status
    pub fn set_nats_connected(&self, connected: bool) {
        gauge!("forwarder_nats_connected").set(if connected { 1.0 } else { 0.0 });
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for ForwarderMetrics {
    fn default() -> Self {
        Self::new()
    }
}
