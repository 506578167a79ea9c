//! Repository configuration.
//!
//! Holds the API root used in `Location` URIs and the schema of every
//! collection the repository patches. The defaults describe the well-known
//! subscriber data collections; deployments may override them from TOML.

use serde::{Deserialize, Serialize};
use udr_model::CollectionSchema;
use udr_types::{SubscriberScope, SubscriptionId, SubscriptionKind};

/// Collections keyed by subscriber only.
const UE_COLLECTIONS: &[&str] = &[
    "subscriptionData.authenticationData.authenticationSubscription",
    "subscriptionData.authenticationData.authenticationStatus",
    "subscriptionData.identityData",
    "subscriptionData.operatorDeterminedBarringData",
    "subscriptionData.operatorSpecificData",
    "subscriptionData.ppData",
    "subscriptionData.eeProfileData",
    "subscriptionData.contextData.amf3gppAccess",
    "subscriptionData.contextData.amfNon3gppAccess",
    "subscriptionData.contextData.smsf3gppAccess",
    "subscriptionData.contextData.smsfNon3gppAccess",
    "subscriptionData.ueUpdateConfirmationData.sorData",
    "policyData.ues.amData",
    "policyData.ues.uePolicySet",
    "policyData.ues.operatorSpecificData",
];

/// Collections keyed by subscriber and serving PLMN.
const UE_PLMN_COLLECTIONS: &[&str] = &[
    "subscriptionData.provisionedData.amData",
    "subscriptionData.provisionedData.smfSelectionSubscriptionData",
    "subscriptionData.provisionedData.smsData",
    "subscriptionData.provisionedData.smsMngData",
    "subscriptionData.provisionedData.traceData",
];

/// Configuration for the repository core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Base URI of the data repository API, including its version prefix.
    pub api_root: String,
    /// Schemas of the collections handled by the patch engine.
    pub collections: Vec<CollectionSchema>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        let mut collections: Vec<CollectionSchema> = UE_COLLECTIONS
            .iter()
            .map(|name| CollectionSchema::new(*name, &["ueId"]))
            .chain(
                UE_PLMN_COLLECTIONS
                    .iter()
                    .map(|name| CollectionSchema::new(*name, &["ueId", "servingPlmnId"])),
            )
            .collect();
        collections.extend([
            CollectionSchema::new("subscriptionData.provisionedData.smData", &["ueId", "servingPlmnId"])
                .with_escaped_map("/dnnConfigurations"),
            CollectionSchema::new("policyData.ues.smData", &["ueId"])
                .with_escaped_map("/smPolicySnssaiData/*/smPolicyDnnData"),
            CollectionSchema::new("policyData.ues.smData.usageMonData", &["ueId", "usageMonId"]),
            CollectionSchema::new("subscriptionData.contextData.smfRegistrations", &["ueId", "pduSessionId"]),
            CollectionSchema::new("subscriptionData.sharedData", &["sharedDataId"]),
            CollectionSchema::new("policyData.plmns.uePolicySet", &["plmnId"]),
            CollectionSchema::new("policyData.sponsorConnectivityData", &["sponsorId"]),
            CollectionSchema::new("policyData.bdtData", &["bdtRefId"]),
            CollectionSchema::new("applicationData.influenceData", &["influenceId"]),
            CollectionSchema::new("applicationData.pfds", &["applicationId"]),
        ]);
        Self {
            api_root: "http://127.0.0.4:8000/nudr-dr/v1".to_string(),
            collections,
        }
    }
}

impl RepositoryConfig {
    /// Parses a TOML configuration. Missing sections fall back to defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Looks up the schema of `collection`.
    pub fn schema_for(&self, collection: &str) -> Option<&CollectionSchema> {
        self.collections.iter().find(|s| s.collection == collection)
    }

    /// Builds the `Location` URI of a newly created subscription.
    ///
    /// Returns `None` when `kind` cannot live in `scope`, e.g. a group
    /// event-exposure subscription outside a group scope.
    pub fn location_uri(
        &self,
        kind: SubscriptionKind,
        scope: &SubscriberScope,
        id: &SubscriptionId,
    ) -> Option<String> {
        let root = self.api_root.trim_end_matches('/');
        let uri = match (kind, scope) {
            (SubscriptionKind::EventExposure, SubscriberScope::Ue(ue_id)) => {
                format!("{root}/subscription-data/{ue_id}/context-data/ee-subscriptions/{id}")
            }
            (SubscriptionKind::Sdm, SubscriberScope::Ue(ue_id)) => {
                format!("{root}/subscription-data/{ue_id}/context-data/sdm-subscriptions/{id}")
            }
            (SubscriptionKind::GroupEventExposure, SubscriberScope::Group(group_id)) => {
                format!("{root}/subscription-data/group-data/{group_id}/ee-subscriptions/{id}")
            }
            (SubscriptionKind::PolicyData, SubscriberScope::Global) => {
                format!("{root}/policy-data/subs-to-notify/{id}")
            }
            (SubscriptionKind::DataChange, SubscriberScope::Global) => {
                format!("{root}/subscription-data/subs-to-notify/{id}")
            }
            _ => return None,
        };
        Some(uri)
    }
}
