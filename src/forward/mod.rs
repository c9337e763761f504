//! Forwarding core
//!
//! Bridges bus deliveries to the ingestion API and queues failed pushes
//! back onto the bus. The two collaborators are modeled as narrow
//! capability traits so the core can be exercised against fakes.

pub mod core;
pub mod record;
pub mod state;

pub use self::core::{ForwarderCore, InboundMessage, PublishFailure};
pub use self::record::LogRecord;
pub use self::state::ForwarderState;

use crate::error::ForwarderError;
use async_trait::async_trait;
use serde_json::Value;

/// Publish-side capability of the bus client.
#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Fire-and-forget publish of a JSON payload to a subject.
    ///
    /// Returns immediately; a publish the bus could not confirm surfaces
    /// later as a [`PublishFailure`] on the client's failure channel.
    fn publish_async(&self, subject: &str, payload: Value);

    /// Stop deliveries and flush client-side buffers.
    async fn close(&self);
}

/// Ingestion-side capability: one synchronous push per call.
#[async_trait]
pub trait IngestClient: Send + Sync {
    async fn push(&self, payload: &Value) -> Result<(), ForwarderError>;
}
