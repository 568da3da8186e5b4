//! Core business entities.

mod click;
mod link;

pub use click::{
    CLICK_CONSUMER_NAME, CLICK_STREAM_MAX_BYTES, CLICK_STREAM_NAME, CLICK_STREAM_SUBJECT,
    ClickEvent, ClickStatus,
};
pub use link::{Link, LinkPatch, NewLink, RedirectMode};
