//! NATS JetStream implementation of the click log.

use super::log::{ClickLog, LogError};
use crate::domain::entities::CLICK_STREAM_SUBJECT;
use async_nats::jetstream;
use async_trait::async_trait;
use tracing::info;

/// Connects to NATS and returns a JetStream context.
pub async fn connect(nats_url: &str) -> anyhow::Result<jetstream::Context> {
    info!("Connecting to NATS at {}", nats_url);

    let client = async_nats::ConnectOptions::new()
        .name("linkrelay")
        .connect(nats_url)
        .await?;

    info!("✓ Connected to NATS");
    Ok(jetstream::new(client))
}

/// JetStream-backed click log.
///
/// Publishes are synchronous with respect to the stream: the returned future
/// resolves only once JetStream acknowledges the append. Callers that must
/// not block on this (the redirect path) publish from a detached task.
pub struct NatsClickLog {
    jetstream: jetstream::Context,
}

impl NatsClickLog {
    pub fn new(jetstream: jetstream::Context) -> Self {
        Self { jetstream }
    }
}

#[async_trait]
impl ClickLog for NatsClickLog {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), LogError> {
        let ack = self
            .jetstream
            .publish(CLICK_STREAM_SUBJECT, payload.into())
            .await
            .map_err(|e| LogError::Publish(e.to_string()))?;

        ack.await.map_err(|e| LogError::Publish(e.to_string()))?;
        Ok(())
    }
}
