//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{ClickPublisher, LinkService, RedirectTokenSigner};
use crate::domain::repositories::ClickEventStore;
use crate::infrastructure::cache::LinkCache;

/// Concurrency-safe handles shared by every request handler and background
/// task. All fields are cheap clones of `Arc`s; no component assumes
/// exclusive access.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<LinkService>,
    pub clicks: Arc<dyn ClickEventStore>,
    pub publisher: Arc<ClickPublisher>,
    pub tokens: Arc<RedirectTokenSigner>,
    pub cache: Arc<dyn LinkCache>,
}
