//! Infrastructure layer: database, cache, and stream integrations.

pub mod cache;
pub mod persistence;
pub mod stream;
