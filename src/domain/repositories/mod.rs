//! Repository traits for pluggable storage backends.

mod click_store;
mod link_store;

pub use click_store::ClickEventStore;
pub use link_store::LinkStore;

#[cfg(test)]
pub use click_store::MockClickEventStore;
#[cfg(test)]
pub use link_store::MockLinkStore;
