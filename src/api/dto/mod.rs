//! Request/response DTOs for the HTTP API.

mod health;
mod links;

pub use health::HealthResponse;
pub use links::{
    CreateLinkRequest, LinkResponse, ListLinksQuery, ListLinksResponse, UpdateLinkRequest,
};
