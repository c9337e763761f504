//! Domain error types for the forwarding bridge
//!
//! main.rs is the ONLY module allowed to use anyhow::Result (process boundary).
//! All application code returns Result<T, ForwarderError>.

use thiserror::Error;

/// Forwarder domain errors
///
/// Every variant carries structured context fields for diagnostics.
/// On-call engineers can pattern-match on the variant to understand
/// the failure mode without parsing error message strings.
#[derive(Error, Debug)]
pub enum ForwarderError {
    /// Configuration error (file missing, unreadable, or unparsable)
    #[error("configuration error: {0}")]
    Config(String),

    /// NATS connection failed
    #[error("NATS connection failed")]
    NatsConnectionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stream or consumer setup failed for the configured subject
    #[error("subscription setup failed for subject '{subject}'")]
    SubscribeFailed {
        subject: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Asynchronous NATS publish could not be confirmed
    #[error("NATS publish failed for subject '{subject}': {reason}")]
    NatsPublishFailed { subject: String, reason: String },

    /// Inbound payload was not valid JSON
    #[error("failed to decode log payload from subject '{subject}'")]
    DecodeFailed {
        subject: String,
        #[source]
        source: serde_json::Error,
    },

    /// Ingestion push failed before a response was received
    #[error("ingestion push failed")]
    IngestTransport(#[source] reqwest::Error),

    /// Ingestion endpoint answered with a non-success status
    #[error("ingestion endpoint returned status {status}")]
    IngestRejected { status: u16 },
}

impl ForwarderError {
    /// Returns a static label string suitable for Prometheus metrics.
    ///
    /// Used as the `error_type` label on `forwarder_forward_failures_total`,
    /// enabling per-error-type monitoring.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NatsConnectionFailed(_) => "nats_connection",
            Self::SubscribeFailed { .. } => "subscribe",
            Self::NatsPublishFailed { .. } => "nats_publish",
            Self::DecodeFailed { .. } => "decode",
            Self::IngestTransport(_) => "ingest_transport",
            Self::IngestRejected { .. } => "ingest_rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_error() -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, "test"))
    }

    #[test]
    fn error_type_labels_are_distinct() {
        let labels = [
            ForwarderError::Config("test".to_string()).error_type_label(),
            ForwarderError::NatsConnectionFailed(test_error()).error_type_label(),
            ForwarderError::SubscribeFailed {
                subject: "logs.app".to_string(),
                source: test_error(),
            }
            .error_type_label(),
            ForwarderError::NatsPublishFailed {
                subject: "logs.app".to_string(),
                reason: "timed out".to_string(),
            }
            .error_type_label(),
            ForwarderError::DecodeFailed {
                subject: "logs.app".to_string(),
                source: serde_json::from_str::<()>("invalid").unwrap_err(),
            }
            .error_type_label(),
            ForwarderError::IngestRejected { status: 500 }.error_type_label(),
        ];

        // All labels are unique
        let mut unique = labels.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(labels.len(), unique.len(), "Duplicate error_type_label found");
    }

    #[test]
    fn error_messages_contain_context() {
        let err = ForwarderError::SubscribeFailed {
            subject: "logs.app".to_string(),
            source: test_error(),
        };
        assert!(err.to_string().contains("logs.app"));

        let err = ForwarderError::NatsPublishFailed {
            subject: "logs.app".to_string(),
            reason: "ack timed out".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("logs.app"), "message should contain subject");
        assert!(msg.contains("ack timed out"), "message should contain reason");

        let err = ForwarderError::IngestRejected { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn config_error_preserves_message() {
        let err = ForwarderError::Config("config.json not found".to_string());
        assert_eq!(err.to_string(), "configuration error: config.json not found");
    }

    #[test]
    fn decode_failure_names_the_subject() {
        let err = ForwarderError::DecodeFailed {
            subject: "other.subject".to_string(),
            source: serde_json::from_str::<()>("{").unwrap_err(),
        };
        assert!(err.to_string().contains("other.subject"));
    }
}
