//! Identifier types used to partition the subscription registry.
//!
//! A registry partition is `(SubscriberScope, SubscriptionKind)`; ids are
//! unique within a partition and are never valid in two partitions at once.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who a subscription or document partition belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SubscriberScope {
    /// A single subscriber (UE) identifier.
    Ue(String),
    /// A subscriber-group identifier.
    Group(String),
    /// Repository-wide subscriptions with no scope key.
    Global,
}

impl SubscriberScope {
    /// Scope for a single subscriber.
    pub fn ue(ue_id: impl Into<String>) -> Self {
        Self::Ue(ue_id.into())
    }

    /// Scope for a subscriber group.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Group(group_id.into())
    }

    /// Returns the scope key, or `None` for the global scope.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Ue(id) | Self::Group(id) => Some(id),
            Self::Global => None,
        }
    }

    /// Returns true for the repository-wide scope.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for SubscriberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ue(id) => write!(f, "ue:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
            Self::Global => f.write_str("global"),
        }
    }
}

impl FromStr for SubscriberScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Self::Global);
        }
        match s.split_once(':') {
            Some(("ue", id)) if !id.is_empty() => Ok(Self::Ue(id.to_string())),
            Some(("group", id)) if !id.is_empty() => Ok(Self::Group(id.to_string())),
            _ => Err(Error::InvalidScope(s.to_string())),
        }
    }
}

/// The kind of a subscription; each kind has its own id counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionKind {
    /// Subscription to changes of subscription data (`subs-to-notify`).
    DataChange,
    /// Per-UE event exposure subscription.
    EventExposure,
    /// Subscription to policy data changes.
    PolicyData,
    /// Event exposure subscription for a UE group.
    GroupEventExposure,
    /// Per-UE subscriber data management subscription.
    Sdm,
}

impl SubscriptionKind {
    /// All kinds, in counter order.
    pub const ALL: [SubscriptionKind; 5] = [
        Self::DataChange,
        Self::EventExposure,
        Self::PolicyData,
        Self::GroupEventExposure,
        Self::Sdm,
    ];

    /// Short, stable name used in logs and config.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataChange => "data-change",
            Self::EventExposure => "ee",
            Self::PolicyData => "policy-data",
            Self::GroupEventExposure => "group-ee",
            Self::Sdm => "sdm",
        }
    }

    /// Position of this kind in [`Self::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Self::DataChange => 0,
            Self::EventExposure => 1,
            Self::PolicyData => 2,
            Self::GroupEventExposure => 3,
            Self::Sdm => 4,
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidKind(s.to_string()))
    }
}

/// Identifier of a stored subscription.
///
/// Generated ids are decimal strings so they can be embedded verbatim in a
/// URI path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Builds the id for a counter value.
    #[must_use]
    pub fn from_counter(value: u64) -> Self {
        Self(value.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = Error;

    /// Accepts any non-empty string free of URI path delimiters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.contains(['/', '?', '#']) {
            return Err(Error::InvalidSubscriptionId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for SubscriptionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
