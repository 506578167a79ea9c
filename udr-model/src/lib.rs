//! Core document and subscription model for the repository.
//!
//! Defines the types every other layer exchanges:
//! - [`DocumentSnapshot`]: an immutable stored document (JSON object)
//! - [`CollectionSchema`]: a collection's key fields and which nested maps
//!   use escaped identifiers as keys
//! - [`Subscription`]: tagged payload per subscription kind, decoded once at
//!   the boundary instead of inspected dynamically at every call site
//! - [`filter`]: list-valued criteria applied to bulk results
//!
//! Nothing here talks to a store or owns shared state.

pub mod filter;
mod schema;
mod snapshot;
mod subscription;

pub use filter::{FilterCriterion, Filterable};
pub use schema::{decode_pointer_token, encode_pointer_token, CollectionSchema};
pub use snapshot::DocumentSnapshot;
pub use subscription::{
    AmfSubscriptionInfo, DataChangeSubscription, EeSubscription, PolicyDataSubscription,
    SdmSubscription, Subscription,
};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("payload kind {actual} does not match expected {expected}")]
    KindMismatch {
        expected: udr_types::SubscriptionKind,
        actual: udr_types::SubscriptionKind,
    },
}
