//! Sample log publisher
//!
//! Publishes a timestamped test record to the configured log subject on a
//! fixed interval until interrupted. Shares the transporter's config file;
//! useful for smoke-testing a deployment end to end.

use anyhow::Result;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use logbridge::config::ForwarderConfig;
use logbridge::forward::{LogRecord, StreamClient};
use logbridge::nats::NatsStreamClient;

const APPLICATION_NAME: &str = "loggen";
const MESSAGE_INTERVAL_SECONDS: u64 = 5;
const TERMINATION_WAIT_SECONDS: u64 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ForwarderConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("logbridge={}", config.log_level).parse()?)
                .add_directive("async_nats=warn".parse()?),
        )
        .init();

    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();

    let stream = NatsStreamClient::connect(&config, failure_tx).await?;
    info!(subject = %config.log_subject, "Connected; publishing test records");

    tokio::spawn(async move {
        while let Some(failure) = failure_rx.recv().await {
            warn!(
                message_id = %failure.message_id,
                subject = %failure.subject,
                "Publish could not be confirmed"
            );
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(MESSAGE_INTERVAL_SECONDS));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut record = LogRecord::new()
                    .with("app", APPLICATION_NAME)
                    .with("severity", "Log")
                    .with("message", "log message for test");
                record.mark_timestamp();

                stream.publish_async(&config.log_subject, serde_json::to_value(&record)?);
                info!("Sent a log message");
            }
            _ = signal::ctrl_c() => {
                info!("Interrupted: signal received");
                break;
            }
        }
    }

    stream.close().await;
    tokio::time::sleep(Duration::from_secs(TERMINATION_WAIT_SECONDS)).await;

    Ok(())
}
