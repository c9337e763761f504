//! Forwarding core implementation
//!
//! One handler call per bus delivery. Accepted messages are decoded and
//! forwarded on their own task so a slow ingestion call never blocks
//! delivery of subsequent messages.

use crate::error::ForwarderError;
use crate::forward::state::ForwarderState;
use crate::forward::{IngestClient, StreamClient};
use crate::metrics::ForwarderMetrics;

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// A single delivery handed over by the stream client.
///
/// Owned copy of the bus message; nothing is retained past deserialization.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub subject: String,
    pub payload: Vec<u8>,
}

/// An asynchronous publish the bus could not confirm.
#[derive(Debug, Clone)]
pub struct PublishFailure {
    pub subject: String,
    pub message_id: String,
    pub payload: Value,
}

/// The forwarding core: handler, forward operation, publish-failure handler.
///
/// Cheap to clone; every field is a shared handle.
#[derive(Clone)]
pub struct ForwarderCore {
    state: ForwarderState,
    stream: Arc<dyn StreamClient>,
    ingest: Arc<dyn IngestClient>,
    metrics: Arc<ForwarderMetrics>,
}

impl ForwarderCore {
    pub fn new(
        state: ForwarderState,
        stream: Arc<dyn StreamClient>,
        ingest: Arc<dyn IngestClient>,
        metrics: Arc<ForwarderMetrics>,
    ) -> Self {
        Self {
            state,
            stream,
            ingest,
            metrics,
        }
    }

    pub fn state(&self) -> &ForwarderState {
        &self.state
    }

    /// Handle one delivery from the subscription.
    ///
    /// Messages on a foreign subject are rejected here; accepted messages
    /// are dispatched onto their own task and this call returns at once.
    /// No ordering holds between two dispatched messages.
    pub fn handle(&self, message: InboundMessage) {
        self.state.record_received();
        self.metrics.record_received();

        if message.subject != self.state.subject() {
            self.state.record_rejected();
            self.metrics.record_rejected(&message.subject);
            error!(subject = %message.subject, "unprocessable message subject");
            return;
        }

        let core = self.clone();
        tokio::spawn(async move {
            core.process(message).await;
        });
    }

    /// Decode a delivery and forward it.
    ///
    /// An undecodable payload is dropped: not forwarded, not republished.
    pub async fn process(&self, message: InboundMessage) {
        match serde_json::from_slice::<Value>(&message.payload) {
            Ok(decoded) => self.forward(&message.subject, decoded).await,
            Err(source) => {
                let err = ForwarderError::DecodeFailed {
                    subject: message.subject,
                    source,
                };
                self.state.record_decode_failure();
                self.metrics.record_decode_failure();
                error!(error = %err, "dropping undecodable log payload");
            }
        }
    }

    /// Push one decoded log object to the ingestion endpoint.
    ///
    /// On failure the same (subject, payload) pair is republished onto the
    /// bus unchanged. There is no retry counter and no backoff: redelivery
    /// through the subscription is the retry mechanism, so an ingestion
    /// outage produces republish traffic until it ends.
    pub async fn forward(&self, subject: &str, decoded: Value) {
        let start = Instant::now();

        match self.ingest.push(&decoded).await {
            Ok(()) => {
                self.state.record_forwarded();
                self.metrics.record_forward_success(start.elapsed());
                debug!(subject, "log forwarded");
            }
            Err(err) => {
                self.state.record_forward_failure();
                self.metrics.record_forward_failure(err.error_type_label());
                error!(subject, error = %err, "failed to push log to ingestion endpoint");

                // queue it back so the subscription delivers it again
                self.stream.publish_async(subject, decoded);
                self.state.record_republish();
                self.metrics.record_republish();
            }
        }
    }

    /// Called for every asynchronous publish the bus could not confirm.
    pub fn on_publish_failure(&self, failure: PublishFailure) {
        self.state.record_publish_failure();
        self.metrics.record_publish_failure();
        error!(
            message_id = %failure.message_id,
            subject = %failure.subject,
            payload = %failure.payload,
            "failed to publish data"
        );

        // deliberately no resubmission
        // self.stream.publish_async(&failure.subject, failure.payload);
    }
}
