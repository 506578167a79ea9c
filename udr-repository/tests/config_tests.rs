use pretty_assertions::assert_eq;
use udr_repository::RepositoryConfig;
use udr_types::{SubscriberScope, SubscriptionId, SubscriptionKind};

fn make_config() -> RepositoryConfig {
    RepositoryConfig {
        api_root: "https://udr.example:8000/nudr-dr/v1/".into(),
        ..Default::default()
    }
}

// ── Collections ──────────────────────────────────────────────────

#[test]
fn default_schemas() {
    let config = RepositoryConfig::default();
    let sm_data = config
        .schema_for("subscriptionData.provisionedData.smData")
        .unwrap();
    assert_eq!(sm_data.key_fields, ["ueId", "servingPlmnId"]);
    assert_eq!(sm_data.escaped_maps, ["/dnnConfigurations"]);

    let sm_policy = config.schema_for("policyData.ues.smData").unwrap();
    assert_eq!(sm_policy.escaped_maps, ["/smPolicySnssaiData/*/smPolicyDnnData"]);

    assert!(config.schema_for("policyData.ues.amData").unwrap().escaped_maps.is_empty());
    assert!(config.schema_for("no.such.collection").is_none());
}

#[test]
fn from_toml() {
    let config = RepositoryConfig::from_toml_str(
        r#"
        api_root = "http://10.0.0.1/nudr-dr/v1"

        [[collections]]
        collection = "custom.data"
        key_fields = ["ueId", "dnn"]
        escaped_maps = ["/perDnn"]
        "#,
    )
    .unwrap();
    assert_eq!(config.api_root, "http://10.0.0.1/nudr-dr/v1");
    assert_eq!(config.collections.len(), 1);
    let schema = config.schema_for("custom.data").unwrap();
    assert!(schema.is_key_field("dnn"));
}

#[test]
fn toml_without_collections_keeps_defaults() {
    let config = RepositoryConfig::from_toml_str(r#"api_root = "http://x""#).unwrap();
    assert_eq!(config.collections, RepositoryConfig::default().collections);
}

#[test]
fn invalid_toml_is_rejected() {
    assert!(RepositoryConfig::from_toml_str("api_root = [").is_err());
}

// ── Location URIs ────────────────────────────────────────────────

#[test]
fn location_uris() {
    let config = make_config();
    let id = SubscriptionId::from_counter(3);
    let root = "https://udr.example:8000/nudr-dr/v1";

    assert_eq!(
        config.location_uri(SubscriptionKind::EventExposure, &SubscriberScope::ue("imsi-1"), &id),
        Some(format!("{root}/subscription-data/imsi-1/context-data/ee-subscriptions/3"))
    );
    assert_eq!(
        config.location_uri(SubscriptionKind::Sdm, &SubscriberScope::ue("imsi-1"), &id),
        Some(format!("{root}/subscription-data/imsi-1/context-data/sdm-subscriptions/3"))
    );
    assert_eq!(
        config.location_uri(SubscriptionKind::GroupEventExposure, &SubscriberScope::group("g1"), &id),
        Some(format!("{root}/subscription-data/group-data/g1/ee-subscriptions/3"))
    );
    assert_eq!(
        config.location_uri(SubscriptionKind::PolicyData, &SubscriberScope::Global, &id),
        Some(format!("{root}/policy-data/subs-to-notify/3"))
    );
    assert_eq!(
        config.location_uri(SubscriptionKind::DataChange, &SubscriberScope::Global, &id),
        Some(format!("{root}/subscription-data/subs-to-notify/3"))
    );
}

#[test]
fn location_uri_for_mismatched_scope() {
    let config = make_config();
    let id = SubscriptionId::from_counter(0);
    assert_eq!(
        config.location_uri(SubscriptionKind::EventExposure, &SubscriberScope::Global, &id),
        None
    );
    assert_eq!(
        config.location_uri(SubscriptionKind::GroupEventExposure, &SubscriberScope::ue("u"), &id),
        None
    );
}
