//! Application services orchestrating the core subsystems.

mod click_consumer;
mod click_publisher;
mod click_sweeper;
mod link_service;
mod redirect_token;

pub use click_consumer::{ClickConsumer, IngestError, ingest};
pub use click_publisher::ClickPublisher;
pub use click_sweeper::ClickSweeper;
pub use link_service::{DEFAULT_LIST_LIMIT, LinkService};
pub use redirect_token::{RedirectTokenSigner, TokenError};
