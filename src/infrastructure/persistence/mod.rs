//! PostgreSQL-backed repository implementations.

mod pg_click_store;
mod pg_link_store;

pub use pg_click_store::PgClickStore;
pub use pg_link_store::PgLinkStore;
