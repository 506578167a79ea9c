//! Error types for the repository layer.

use std::fmt;
use thiserror::Error;
use udr_store::StoreError;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// What a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No subscription container exists for the subscriber.
    User,
    /// No subscription with the requested id.
    Subscription,
    /// The subscription carries no AMF subscription infos.
    AmfSubscription,
    /// No stored document matched.
    Data,
}

impl Missing {
    /// Problem cause reported to clients.
    pub fn cause(self) -> &'static str {
        match self {
            Self::User => "USER_NOT_FOUND",
            Self::Subscription => "SUBSCRIPTION_NOT_FOUND",
            Self::AmfSubscription => "AMFSUBSCRIPTION_NOT_FOUND",
            Self::Data => "DATA_NOT_FOUND",
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cause())
    }
}

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Scope, subscription, nested object or document absent.
    #[error("not found: {0}")]
    NotFound(Missing),

    /// Patch document could not be parsed.
    #[error("malformed patch: {0}")]
    MalformedPatch(String),

    /// Patch parsed but an operation failed against the current document.
    #[error("patch not applicable: {0}")]
    PatchNotApplicable(String),

    /// The store rejected the call or is unreachable.
    #[error("store failure: {0}")]
    StoreFailure(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepoError {
    /// True for failures caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::MalformedPatch(_) | Self::PatchNotApplicable(_)
        )
    }

    /// The missing object, if this is a not-found error.
    pub fn missing(&self) -> Option<Missing> {
        match self {
            Self::NotFound(missing) => Some(*missing),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(Missing::Data),
            StoreError::PatchFailed(msg) => Self::PatchNotApplicable(msg),
            StoreError::Serialization(e) => Self::Serialization(e),
            StoreError::Backend(msg) => Self::StoreFailure(msg),
        }
    }
}
