//! Pull-based ingestion of click events from the durable stream.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{
    CLICK_CONSUMER_NAME, CLICK_STREAM_MAX_BYTES, CLICK_STREAM_NAME, CLICK_STREAM_SUBJECT,
    ClickEvent,
};
use crate::domain::repositories::ClickEventStore;
use crate::error::AppError;
use async_nats::jetstream::{
    self, AckKind,
    consumer::{AckPolicy, PullConsumer, pull},
    stream,
};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Messages fetched per cycle.
const FETCH_BATCH: usize = 10;
/// Upper bound on one fetch wait.
const FETCH_WAIT: Duration = Duration::from_secs(5);
/// Backoff after a failed fetch so a down stream does not spin the loop.
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Why one message could not be ingested. Either way the message is NAKed
/// and redelivered; nothing is silently dropped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to decode click event: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to persist click event: {0}")]
    Persist(#[from] AppError),
}

/// Decodes one stream message and persists it keyed by event id.
///
/// Insertion is duplicate-tolerant, so redelivery after a missed ack is a
/// harmless no-op.
pub async fn ingest(payload: &[u8], store: &dyn ClickEventStore) -> Result<(), IngestError> {
    let event: ClickEvent = serde_json::from_slice(payload)?;
    store.insert(&event).await?;

    debug!(
        id = %event.id,
        link_code = %event.link_code,
        status = %event.status,
        "click event stored"
    );
    Ok(())
}

/// Long-lived pull consumer persisting click events to the durable store.
///
/// Stream and durable-consumer setup is idempotent: pre-existing ones are
/// left untouched. The loop runs until the shutdown signal flips, checked
/// between fetch cycles.
pub struct ClickConsumer {
    jetstream: jetstream::Context,
    store: Arc<dyn ClickEventStore>,
    shutdown: watch::Receiver<bool>,
}

impl ClickConsumer {
    pub fn new(
        jetstream: jetstream::Context,
        store: Arc<dyn ClickEventStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            jetstream,
            store,
            shutdown,
        }
    }

    /// Ensures the stream and durable consumer exist, then spawns the
    /// consume loop.
    pub async fn start(self) -> anyhow::Result<JoinHandle<()>> {
        let stream = self
            .jetstream
            .get_or_create_stream(stream::Config {
                name: CLICK_STREAM_NAME.to_string(),
                subjects: vec![CLICK_STREAM_SUBJECT.to_string()],
                max_bytes: CLICK_STREAM_MAX_BYTES,
                ..Default::default()
            })
            .await?;

        let consumer: PullConsumer = stream
            .get_or_create_consumer(
                CLICK_CONSUMER_NAME,
                pull::Config {
                    durable_name: Some(CLICK_CONSUMER_NAME.to_string()),
                    ack_policy: AckPolicy::Explicit,
                    ..Default::default()
                },
            )
            .await?;

        info!("Click consumer started");
        Ok(tokio::spawn(self.run(consumer)))
    }

    async fn run(mut self, consumer: PullConsumer) {
        loop {
            if *self.shutdown.borrow() {
                info!("Click consumer stopped");
                return;
            }

            let batch = consumer
                .fetch()
                .max_messages(FETCH_BATCH)
                .expires(FETCH_WAIT)
                .messages()
                .await;

            let mut messages = match batch {
                Ok(messages) => messages,
                Err(e) => {
                    error!("failed to fetch click events: {}", e);
                    tokio::select! {
                        changed = self.shutdown.changed() => {
                            // A closed channel means the server is gone; stop too.
                            if changed.is_err() {
                                info!("Click consumer stopped");
                                return;
                            }
                        }
                        _ = tokio::time::sleep(FETCH_RETRY_DELAY) => {}
                    }
                    continue;
                }
            };

            while let Some(message) = messages.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("error reading click event batch: {}", e);
                        break;
                    }
                };

                match ingest(&message.payload, self.store.as_ref()).await {
                    Ok(()) => {
                        if let Err(e) = message.ack().await {
                            warn!("failed to ack click event: {}", e);
                        }
                    }
                    Err(e) => {
                        warn!("click event not ingested, requesting redelivery: {}", e);
                        if let Err(e) = message.ack_with(AckKind::Nak(None)).await {
                            warn!("failed to nak click event: {}", e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClickStatus;
    use crate::domain::repositories::MockClickEventStore;
    use chrono::Utc;
    use serde_json::json;

    fn sample_event() -> ClickEvent {
        ClickEvent {
            id: "click-1".to_string(),
            link_code: "abc123".to_string(),
            ip: "203.0.113.7".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            status: ClickStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ingest_persists_decoded_event() {
        let mut store = MockClickEventStore::new();
        store
            .expect_insert()
            .withf(|event: &ClickEvent| event.id == "click-1")
            .times(1)
            .returning(|_| Ok(()));

        let payload = serde_json::to_vec(&sample_event()).unwrap();
        ingest(&payload, &store).await.unwrap();
    }

    #[tokio::test]
    async fn test_ingest_rejects_undecodable_payload() {
        let mut store = MockClickEventStore::new();
        store.expect_insert().times(0);

        let result = ingest(b"not json", &store).await;
        assert!(matches!(result, Err(IngestError::Decode(_))));
    }

    #[tokio::test]
    async fn test_ingest_surfaces_persistence_failure() {
        let mut store = MockClickEventStore::new();
        store.expect_insert().returning(|_| {
            Err(AppError::internal("Database error", json!({})))
        });

        let payload = serde_json::to_vec(&sample_event()).unwrap();
        let result = ingest(&payload, &store).await;
        assert!(matches!(result, Err(IngestError::Persist(_))));
    }
}
