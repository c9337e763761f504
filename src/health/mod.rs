//! Health check endpoints

use crate::forward::ForwarderState;
use crate::metrics::ForwarderMetrics;
use crate::nats::NatsStreamClient;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub subject: String,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub subject: String,
    pub nats_connected: bool,
    pub messages_received: u64,
    pub logs_forwarded: u64,
    pub forward_failures: u64,
    pub republishes: u64,
}

/// Application state for health endpoints
#[derive(Clone)]
pub struct AppState {
    pub state: ForwarderState,
    pub stream: Arc<NatsStreamClient>,
    pub metrics: Arc<ForwarderMetrics>,
}

/// Create the health check router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health endpoint - always returns 200 if process is running
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        subject: state.state.subject().to_string(),
    })
}

/// Readiness endpoint - returns 200 while the bus connection is up
async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let nats_connected = state.stream.is_connected();

    let response = ReadyResponse {
        ready: nats_connected,
        subject: state.state.subject().to_string(),
        nats_connected,
        messages_received: state.state.messages_received(),
        logs_forwarded: state.state.logs_forwarded(),
        forward_failures: state.state.forward_failures(),
        republishes: state.state.republishes(),
    };

    if nats_connected {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Metrics endpoint - returns Prometheus format metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.set_nats_connected(state.stream.is_connected());

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.2.0",
            subject: "logs.app".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("logs.app"));
    }

    #[test]
    fn test_ready_response_serialization() {
        let response = ReadyResponse {
            ready: true,
            subject: "logs.app".to_string(),
            nats_connected: true,
            messages_received: 100,
            logs_forwarded: 97,
            forward_failures: 3,
            republishes: 3,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"ready\":true"));
        assert!(json.contains("\"republishes\":3"));
    }
}
