//! Fire-and-forget click event emission onto the durable stream.

use std::sync::Arc;

use crate::domain::entities::{ClickEvent, ClickStatus};
use crate::infrastructure::stream::{ClickLog, LogError};
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

/// Publishes click events to the durable click stream.
///
/// Best-effort delivery only: the redirect path publishes from a detached
/// task so stream latency or failure can never delay or fail the
/// user-visible response. A dropped event is logged, not retried.
pub struct ClickPublisher {
    log: Arc<dyn ClickLog>,
}

impl ClickPublisher {
    pub fn new(log: Arc<dyn ClickLog>) -> Self {
        Self { log }
    }

    /// Serializes and appends one click event.
    ///
    /// An empty `click_id` gets a freshly minted uuid; deferred redirects
    /// pass the id they embedded in the token so the confirmation path can
    /// find the row later.
    pub async fn publish(
        &self,
        link_code: &str,
        ip: &str,
        user_agent: &str,
        status: ClickStatus,
        click_id: &str,
    ) -> Result<(), LogError> {
        let id = if click_id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            click_id.to_string()
        };

        let event = ClickEvent {
            id,
            link_code: link_code.to_string(),
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
            status,
            timestamp: Utc::now(),
        };

        let payload = serde_json::to_vec(&event)?;
        self.log.publish(payload).await
    }

    /// Publishes from a detached task, off the request-serving path.
    pub fn publish_detached(
        self: &Arc<Self>,
        link_code: String,
        ip: String,
        user_agent: String,
        status: ClickStatus,
        click_id: String,
    ) {
        let publisher = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = publisher
                .publish(&link_code, &ip, &user_agent, status, &click_id)
                .await
            {
                error!(code = %link_code, "failed to publish click event: {}", e);
            }
        });
    }
}
