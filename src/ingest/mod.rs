//! Ingestion API integration
//!
//! Pushes decoded log objects to the centralized-logging endpoint.

mod client;

pub use client::{HttpIngestClient, DEFAULT_ENDPOINT};
