//! Durable ordered log for click events, backed by NATS JetStream.

mod log;
mod nats_log;

pub use log::{ClickLog, LogError};
pub use nats_log::{NatsClickLog, connect};

#[cfg(test)]
pub use log::MockClickLog;
