//! Logbridge - NATS JetStream to log-ingestion forwarding bridge
//!
//! This is a thin log transporter that:
//! - Consumes log messages from one subject via a shared durable consumer
//! - Pushes each decoded payload to a centralized-logging ingestion API
//! - Republishes payloads the ingestion endpoint refused, for redelivery
//! - Exposes health/ready endpoints and Prometheus metrics

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};

use logbridge::config::ForwarderConfig;
use logbridge::forward::{ForwarderCore, ForwarderState, StreamClient};
use logbridge::health::{self, AppState};
use logbridge::ingest::{self, HttpIngestClient};
use logbridge::metrics::ForwarderMetrics;
use logbridge::nats::NatsStreamClient;

/// Grace period for in-flight forwards after the bus connection closes.
const TERMINATION_WAIT_SECONDS: u64 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration first to get log level
    let config = ForwarderConfig::load()?;

    // Initialize tracing with configured log level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("logbridge={}", config.log_level).parse()?)
                .add_directive("async_nats=warn".parse()?),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        subject = %config.log_subject,
        "Starting transporter"
    );

    // Initialize metrics
    let metrics = Arc::new(ForwarderMetrics::new());
    info!("Prometheus metrics initialized");

    // Publish failures arrive on this channel from the stream client
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();

    let stream = NatsStreamClient::connect(&config, failure_tx).await?;
    info!(servers = ?config.servers, "Connected to NATS");
    metrics.set_nats_connected(true);

    let endpoint = config
        .ingest_endpoint
        .as_deref()
        .unwrap_or(ingest::DEFAULT_ENDPOINT);
    let ingest_client = Arc::new(HttpIngestClient::new(endpoint, &config.ingest_token)?);

    let state = ForwarderState::new(config.log_subject.clone());
    let core = ForwarderCore::new(
        state.clone(),
        Arc::clone(&stream) as Arc<dyn StreamClient>,
        ingest_client,
        Arc::clone(&metrics),
    );

    // Drain publish failures into the core's failure handler
    {
        let core = core.clone();
        tokio::spawn(async move {
            while let Some(failure) = failure_rx.recv().await {
                core.on_publish_failure(failure);
            }
        });
    }

    // Start health server
    let app_state = AppState {
        state: state.clone(),
        stream: Arc::clone(&stream),
        metrics: Arc::clone(&metrics),
    };

    let health_router = health::router(app_state);
    let addr: SocketAddr = ([0, 0, 0, 0], config.http_port).into();

    info!(port = config.http_port, "Starting HTTP server");

    let http_server = axum::serve(tokio::net::TcpListener::bind(addr).await?, health_router);

    // Run everything concurrently
    tokio::select! {
        result = stream.run(core.clone()) => {
            if let Err(e) = result {
                error!(error = %e, "Delivery loop error");
            }
        }
        result = http_server => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Graceful shutdown
    info!("Terminating transporter...");

    stream.close().await;
    metrics.set_nats_connected(false);

    // Best-effort drain: in-flight forwards either finish inside the grace
    // period or are abandoned when the process exits.
    tokio::time::sleep(Duration::from_secs(TERMINATION_WAIT_SECONDS)).await;

    info!("Transporter terminated");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
