//! Append seam for the durable click-event log.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the click log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to encode click event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to publish click event: {0}")]
    Publish(String),
}

/// Append-only handle for the click-event stream.
///
/// Only publishing goes through this trait; consumption is pull-based and
/// owned by [`crate::application::services::ClickConsumer`], which talks to
/// JetStream directly for fetch/ack semantics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickLog: Send + Sync {
    /// Appends a serialized click event and waits for the stream ack.
    async fn publish(&self, payload: Vec<u8>) -> Result<(), LogError>;
}
