//! HTTP client for the Eventownik backend API.
//!
//! The backend is the source of truth for events, attributes, blocks and
//! participants; this crate is the panel's only write path. One typed
//! API struct per resource, all sharing a [`client::BackendClient`].

pub mod attributes;
pub mod blocks;
pub mod client;
pub mod error;
pub mod metrics;
pub mod participants;

pub use attributes::AttributesApi;
pub use blocks::BlocksApi;
pub use client::BackendClient;
pub use error::BackendError;
pub use participants::ParticipantsApi;
