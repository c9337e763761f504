//! NATS stream client
//!
//! Owns the durable subscription on the log subject and the asynchronous
//! publish path used to queue failed payloads back onto the bus.

use crate::config::ForwarderConfig;
use crate::error::ForwarderError;
use crate::forward::{ForwarderCore, InboundMessage, PublishFailure, StreamClient};

use async_nats::jetstream::consumer::pull::Config as PullConsumerConfig;
use async_nats::jetstream::consumer::{AckPolicy, DeliverPolicy, PullConsumer};
use async_nats::jetstream::{self, stream::StorageType};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Queue-group token shared by every forwarder instance.
pub const QUEUE_GROUP: &str = "unique";

/// Durable-name token; the bus resumes the subscription from its last
/// acknowledged position across restarts.
pub const DURABLE_NAME: &str = "durable";

/// NATS stream client for the forwarder
///
/// Instances sharing the durable consumer load-balance deliveries
/// without message loss across restarts.
pub struct NatsStreamClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    consumer: PullConsumer,
    connected: AtomicBool,
    failure_tx: mpsc::UnboundedSender<PublishFailure>,
}

impl NatsStreamClient {
    /// Connect to the NATS servers and set up the single durable
    /// subscription on the configured log subject.
    ///
    /// Unconfirmed asynchronous publishes are reported on `failure_tx`.
    pub async fn connect(
        config: &ForwarderConfig,
        failure_tx: mpsc::UnboundedSender<PublishFailure>,
    ) -> Result<Arc<Self>, ForwarderError> {
        let servers = config.servers.join(",");
        info!(servers = %servers, "Connecting to NATS");

        let mut options = async_nats::ConnectOptions::new().name(&config.client_id);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options = options.user_and_password(username.clone(), password.clone());
        }
        if let (Some(cert), Some(key)) = (&config.client_cert_path, &config.client_key_path) {
            options = options
                .require_tls(true)
                .add_client_certificate(PathBuf::from(cert), PathBuf::from(key));
        }
        if let Some(ca) = &config.root_ca_path {
            options = options.add_root_certificates(PathBuf::from(ca));
        }

        let client = options
            .connect(servers.as_str())
            .await
            .map_err(|e| ForwarderError::NatsConnectionFailed(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let stream = jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: config.cluster_id.clone(),
                subjects: vec![config.log_subject.clone()],
                storage: StorageType::File,
                num_replicas: 1,
                ..Default::default()
            })
            .await
            .map_err(|e| ForwarderError::SubscribeFailed {
                subject: config.log_subject.clone(),
                source: Box::new(e),
            })?;

        // One durable pull consumer shared by the whole queue group;
        // deliver-all replays anything missed since the last ack.
        let durable = format!("{QUEUE_GROUP}-{DURABLE_NAME}");
        let consumer = stream
            .get_or_create_consumer(
                &durable,
                PullConsumerConfig {
                    durable_name: Some(durable.clone()),
                    deliver_policy: DeliverPolicy::All,
                    ack_policy: AckPolicy::Explicit,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| ForwarderError::SubscribeFailed {
                subject: config.log_subject.clone(),
                source: Box::new(e),
            })?;

        info!(
            subject = %config.log_subject,
            durable = %durable,
            "Subscribed to log stream"
        );

        Ok(Arc::new(Self {
            client,
            jetstream,
            consumer,
            connected: AtomicBool::new(true),
            failure_tx,
        }))
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
            && self.client.connection_state() == async_nats::connection::State::Connected
    }

    /// Poll the subscription and hand each delivery to the core.
    ///
    /// Every delivery is acked once dispatched, rejects included: a
    /// redelivered reject would only be rejected again.
    pub async fn run(&self, core: ForwarderCore) -> Result<(), ForwarderError> {
        let mut messages =
            self.consumer
                .messages()
                .await
                .map_err(|e| ForwarderError::SubscribeFailed {
                    subject: core.state().subject().to_string(),
                    source: Box::new(e),
                })?;

        while let Some(delivery) = messages.next().await {
            match delivery {
                Ok(message) => {
                    core.handle(InboundMessage {
                        subject: message.subject.to_string(),
                        payload: message.payload.to_vec(),
                    });

                    if let Err(e) = message.ack().await {
                        warn!(error = %e, "Failed to ack delivery");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Error receiving delivery");
                }
            }
        }

        info!("Message stream ended");
        Ok(())
    }
}

#[async_trait]
impl StreamClient for NatsStreamClient {
    /// Publish a JSON payload and return immediately.
    ///
    /// The publish is confirmed on a spawned task; failures are sent to
    /// the failure channel with a fresh message id.
    fn publish_async(&self, subject: &str, payload: Value) {
        let message_id = Uuid::new_v4().to_string();

        let bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(subject, error = %e, "Failed to serialize publish payload");
                return;
            }
        };

        let jetstream = self.jetstream.clone();
        let failure_tx = self.failure_tx.clone();
        let subject = subject.to_string();

        tokio::spawn(async move {
            let outcome = match jetstream.publish(subject.clone(), bytes.into()).await {
                Ok(ack) => ack.await.map(|_| ()).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            if let Err(reason) = outcome {
                let err = ForwarderError::NatsPublishFailed {
                    subject: subject.clone(),
                    reason,
                };
                warn!(message_id = %message_id, error = %err, "Publish not confirmed");

                let _ = failure_tx.send(PublishFailure {
                    subject,
                    message_id,
                    payload,
                });
            }
        });
    }

    /// Graceful shutdown: stops deliveries and flushes buffered publishes.
    async fn close(&self) {
        info!("Closing NATS connection");
        self.connected.store(false, Ordering::SeqCst);

        if let Err(e) = self.client.drain().await {
            warn!(error = %e, "Error draining NATS connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durable_name_combines_both_tokens() {
        assert_eq!(QUEUE_GROUP, "unique");
        assert_eq!(DURABLE_NAME, "durable");
        assert_eq!(format!("{QUEUE_GROUP}-{DURABLE_NAME}"), "unique-durable");
    }
}
