//! Typed subscription payloads.
//!
//! Each subscription kind has its own payload struct. Fields the core acts
//! on are typed; everything else a client sent is kept in `extra` and
//! written back unchanged.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use udr_types::{Snssai, SubscriptionId, SubscriptionKind};

/// Subscription to changes of subscription data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataChangeSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Restricts the subscription to one subscriber; `None` means any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ue_id: Option<String>,
    pub callback_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_callback_reference: Option<String>,
    pub monitored_resource_uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event exposure subscription, for a single UE or a UE group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EeSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub callback_reference: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub monitoring_configurations: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<String>,
    /// `None` = never set, `Some(vec![])` = explicitly cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amf_subscription_infos: Option<Vec<AmfSubscriptionInfo>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// AMF-side subscription created on behalf of an event exposure subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmfSubscriptionInfo {
    pub amf_instance_id: String,
    pub subscription_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subs_change_notify_correlation_id: Option<String>,
}

/// Subscription to policy data changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyDataSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub notification_uri: String,
    pub monitored_resource_uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subscriber data management subscription, stored per UE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdmSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub nf_instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit_unsubscribe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    pub callback_reference: String,
    pub monitored_resource_uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_nssai: Option<Snssai>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnn: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored subscription, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum Subscription {
    DataChange(DataChangeSubscription),
    EventExposure(EeSubscription),
    PolicyData(PolicyDataSubscription),
    GroupEventExposure(EeSubscription),
    Sdm(SdmSubscription),
}

impl Subscription {
    /// Decodes a client payload for the given kind.
    pub fn from_value(kind: SubscriptionKind, value: Value) -> ModelResult<Self> {
        Ok(match kind {
            SubscriptionKind::DataChange => Self::DataChange(serde_json::from_value(value)?),
            SubscriptionKind::EventExposure => Self::EventExposure(serde_json::from_value(value)?),
            SubscriptionKind::PolicyData => Self::PolicyData(serde_json::from_value(value)?),
            SubscriptionKind::GroupEventExposure => {
                Self::GroupEventExposure(serde_json::from_value(value)?)
            }
            SubscriptionKind::Sdm => Self::Sdm(serde_json::from_value(value)?),
        })
    }

    /// Encodes the payload (without the kind tag) as the client sees it.
    pub fn to_value(&self) -> ModelResult<Value> {
        Ok(match self {
            Self::DataChange(s) => serde_json::to_value(s)?,
            Self::EventExposure(s) | Self::GroupEventExposure(s) => serde_json::to_value(s)?,
            Self::PolicyData(s) => serde_json::to_value(s)?,
            Self::Sdm(s) => serde_json::to_value(s)?,
        })
    }

    pub fn kind(&self) -> SubscriptionKind {
        match self {
            Self::DataChange(_) => SubscriptionKind::DataChange,
            Self::EventExposure(_) => SubscriptionKind::EventExposure,
            Self::PolicyData(_) => SubscriptionKind::PolicyData,
            Self::GroupEventExposure(_) => SubscriptionKind::GroupEventExposure,
            Self::Sdm(_) => SubscriptionKind::Sdm,
        }
    }

    /// Fails with `KindMismatch` unless this payload is of `expected` kind.
    pub fn expect_kind(&self, expected: SubscriptionKind) -> ModelResult<()> {
        let actual = self.kind();
        if actual == expected {
            Ok(())
        } else {
            Err(ModelError::KindMismatch { expected, actual })
        }
    }

    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            Self::DataChange(s) => s.subscription_id.as_deref(),
            Self::EventExposure(s) | Self::GroupEventExposure(s) => s.subscription_id.as_deref(),
            Self::PolicyData(s) => s.subscription_id.as_deref(),
            Self::Sdm(s) => s.subscription_id.as_deref(),
        }
    }

    /// Returns the payload with its id field forced to `id`.
    #[must_use]
    pub fn with_subscription_id(mut self, id: &SubscriptionId) -> Self {
        let slot = match &mut self {
            Self::DataChange(s) => &mut s.subscription_id,
            Self::EventExposure(s) | Self::GroupEventExposure(s) => &mut s.subscription_id,
            Self::PolicyData(s) => &mut s.subscription_id,
            Self::Sdm(s) => &mut s.subscription_id,
        };
        *slot = Some(id.to_string());
        self
    }

    /// The URI notifications for this subscription are delivered to.
    pub fn notify_uri(&self) -> &str {
        match self {
            Self::DataChange(s) => &s.callback_reference,
            Self::EventExposure(s) | Self::GroupEventExposure(s) => &s.callback_reference,
            Self::PolicyData(s) => &s.notification_uri,
            Self::Sdm(s) => &s.callback_reference,
        }
    }

    /// Resource URIs this subscription watches; empty for event exposure.
    pub fn monitored_resource_uris(&self) -> &[String] {
        match self {
            Self::DataChange(s) => &s.monitored_resource_uris,
            Self::PolicyData(s) => &s.monitored_resource_uris,
            Self::Sdm(s) => &s.monitored_resource_uris,
            Self::EventExposure(_) | Self::GroupEventExposure(_) => &[],
        }
    }

    /// Returns the event exposure payload for either event exposure kind.
    pub fn as_event_exposure(&self) -> Option<&EeSubscription> {
        match self {
            Self::EventExposure(s) | Self::GroupEventExposure(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable access to the event exposure payload.
    pub fn as_event_exposure_mut(&mut self) -> Option<&mut EeSubscription> {
        match self {
            Self::EventExposure(s) | Self::GroupEventExposure(s) => Some(s),
            _ => None,
        }
    }
}
