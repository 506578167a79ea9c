//! Core type definitions for the subscriber data repository.
//!
//! This crate defines the small, storage-agnostic types shared by every
//! other crate in the workspace:
//! - Subscriber scopes and subscription kinds (registry partition keys)
//! - Subscription identifiers (decimal, path-safe strings)
//! - Network-slice identifiers compared by their structural fields
//! - Reversible escaping for identifiers used as nested document keys
//!
//! Nothing in here touches a document store or holds shared state.

mod escape;
mod ids;
mod snssai;

pub use escape::{escape_key, unescape_key, KeyEscaper};
pub use ids::{SubscriberScope, SubscriptionId, SubscriptionKind};
pub use snssai::Snssai;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing identifier types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid network slice identifier: {0}")]
    InvalidSnssai(String),

    #[error("invalid subscriber scope: {0}")]
    InvalidScope(String),

    #[error("invalid subscription kind: {0}")]
    InvalidKind(String),

    #[error("invalid subscription id: {0}")]
    InvalidSubscriptionId(String),
}
