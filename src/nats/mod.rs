//! NATS JetStream integration
//!
//! One durable, queue-grouped subscription in, fire-and-forget
//! republishes out.

mod client;

pub use client::{NatsStreamClient, DURABLE_NAME, QUEUE_GROUP};
