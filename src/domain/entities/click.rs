//! Click event model and stream constants for the async click pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the JetStream stream holding click events.
pub const CLICK_STREAM_NAME: &str = "CLICKS";
/// Subject click events are published under.
pub const CLICK_STREAM_SUBJECT: &str = "clicks.events";
/// Durable pull-consumer name used by the ingestion loop.
pub const CLICK_CONSUMER_NAME: &str = "click-logger";
/// Upper bound on retained stream size.
pub const CLICK_STREAM_MAX_BYTES: i64 = 100 * 1024 * 1024;

/// Lifecycle state of a click event.
///
/// `Pending` is the only non-terminal state: a pending event is flipped to
/// `Success` by a confirmed redirect or to `Failed` by the reconciliation
/// sweep, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClickStatus {
    Pending,
    Success,
    Failed,
}

impl ClickStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ClickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record of one resolution attempt for a short link.
///
/// Serialized with serde_json as the wire format on the click stream, and
/// persisted by the consumer keyed by `id`. The hot path only ever writes
/// these; nothing in request handling reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Globally unique, stable once minted. Doubles as the idempotency key
    /// for at-least-once delivery.
    pub id: String,
    pub link_code: String,
    pub ip: String,
    pub user_agent: String,
    pub status: ClickStatus,
    pub timestamp: DateTime<Utc>,
}
