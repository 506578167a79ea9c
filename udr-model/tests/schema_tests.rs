use pretty_assertions::assert_eq;
use serde_json::json;
use udr_model::{decode_pointer_token, encode_pointer_token, CollectionSchema, DocumentSnapshot};

fn sm_data_schema() -> CollectionSchema {
    CollectionSchema::new("subscriptionData.provisionedData.smData", &["ueId", "servingPlmnId"])
        .with_escaped_map("/dnnConfigurations")
}

fn sm_policy_schema() -> CollectionSchema {
    CollectionSchema::new("policyData.ues.smData", &["ueId"])
        .with_escaped_map("/smPolicySnssaiData/*/smPolicyDnnData")
}

// ── Key fields ───────────────────────────────────────────────────

#[test]
fn key_fields() {
    let schema = sm_data_schema();
    assert!(schema.is_key_field("ueId"));
    assert!(schema.is_key_field("servingPlmnId"));
    assert!(!schema.is_key_field("dnnConfigurations"));
}

// ── Document escaping ────────────────────────────────────────────

#[test]
fn escapes_top_level_map_keys() {
    let doc = DocumentSnapshot::from_value(json!({
        "ueId": "imsi-1",
        "dnnConfigurations": {"internet.mnc01": {"sscModes": 1}, "ims": {}}
    }))
    .unwrap();
    let escaped = sm_data_schema().escape_document(&doc);
    assert_eq!(
        escaped.to_value(),
        json!({
            "ueId": "imsi-1",
            "dnnConfigurations": {"internet%2Emnc01": {"sscModes": 1}, "ims": {}}
        })
    );
}

#[test]
fn escapes_wildcard_nested_map_keys() {
    let doc = DocumentSnapshot::from_value(json!({
        "smPolicySnssaiData": {
            "01010203": {"smPolicyDnnData": {"a.b": {"x": 1}}},
            "02": {"smPolicyDnnData": {"c.d": {}}}
        }
    }))
    .unwrap();
    let escaped = sm_policy_schema().escape_document(&doc);
    assert_eq!(
        escaped.get("smPolicySnssaiData").unwrap(),
        &json!({
            "01010203": {"smPolicyDnnData": {"a%2Eb": {"x": 1}}},
            "02": {"smPolicyDnnData": {"c%2Ed": {}}}
        })
    );
}

#[test]
fn unescape_reverses_escape() {
    let doc = DocumentSnapshot::from_value(json!({
        "dnnConfigurations": {"internet.mnc01.mcc208": {"a": 1}, "50%": {}}
    }))
    .unwrap();
    let schema = sm_data_schema();
    let back = schema.unescape_document(&schema.escape_document(&doc));
    assert_eq!(back, doc);
}

#[test]
fn values_inside_escaped_maps_are_not_touched() {
    let doc = DocumentSnapshot::from_value(json!({
        "dnnConfigurations": {"internet": {"nested.key": "v.1"}}
    }))
    .unwrap();
    let escaped = sm_data_schema().escape_document(&doc);
    assert_eq!(escaped, doc);
}

#[test]
fn missing_or_non_object_maps_are_ignored() {
    let doc = DocumentSnapshot::from_value(json!({"dnnConfigurations": [1, 2]})).unwrap();
    assert_eq!(sm_data_schema().escape_document(&doc), doc);

    let doc = DocumentSnapshot::from_value(json!({"other": {"a.b": 1}})).unwrap();
    assert_eq!(sm_data_schema().escape_document(&doc), doc);
}

#[test]
fn escape_value_on_merge_documents() {
    let patch = json!({"dnnConfigurations": {"a.b": null}});
    assert_eq!(
        sm_data_schema().escape_value(&patch),
        json!({"dnnConfigurations": {"a%2Eb": null}})
    );
}

// ── Pointer escaping ─────────────────────────────────────────────

#[test]
fn escape_pointer_into_map() {
    let schema = sm_data_schema();
    assert_eq!(
        schema.escape_pointer("/dnnConfigurations/internet.mnc01/sscModes"),
        "/dnnConfigurations/internet%2Emnc01/sscModes"
    );
}

#[test]
fn escape_pointer_with_wildcard() {
    let schema = sm_policy_schema();
    assert_eq!(
        schema.escape_pointer("/smPolicySnssaiData/01010203/smPolicyDnnData/a.b"),
        "/smPolicySnssaiData/01010203/smPolicyDnnData/a%2Eb"
    );
}

#[test]
fn escape_pointer_leaves_other_paths() {
    let schema = sm_data_schema();
    assert_eq!(schema.escape_pointer("/dnnConfigurations"), "/dnnConfigurations");
    assert_eq!(schema.escape_pointer("/ueId"), "/ueId");
    assert_eq!(schema.escape_pointer("relative.path"), "relative.path");
}

#[test]
fn escape_pointer_preserves_tilde_encoding() {
    let schema = sm_data_schema();
    assert_eq!(
        schema.escape_pointer("/dnnConfigurations/a~1b.c"),
        "/dnnConfigurations/a~1b%2Ec"
    );
}

#[test]
fn pointer_tokens() {
    assert_eq!(encode_pointer_token("a/b~c"), "a~1b~0c");
    assert_eq!(decode_pointer_token("a~1b~0c"), "a/b~c");
    assert_eq!(decode_pointer_token("~01"), "~1");
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn schema_roundtrip() {
    let schema = sm_policy_schema();
    let json = serde_json::to_string(&schema).unwrap();
    let parsed: CollectionSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, schema);
}

#[test]
fn escaped_maps_default_to_empty() {
    let parsed: CollectionSchema =
        serde_json::from_value(json!({"collection": "c", "key_fields": ["ueId"]})).unwrap();
    assert!(parsed.escaped_maps.is_empty());
}

#[test]
fn escape_value_at_map_or_ancestor() {
    let schema = sm_data_schema();
    let configs = json!({"a.b": {"x.y": 1}});
    assert_eq!(
        schema.escape_value_at("/dnnConfigurations", &configs),
        json!({"a%2Eb": {"x.y": 1}})
    );
    assert_eq!(
        schema.escape_value_at("", &json!({"dnnConfigurations": {"a.b": {}}})),
        json!({"dnnConfigurations": {"a%2Eb": {}}})
    );
    assert_eq!(schema.escape_value_at("/dnnConfigurations/a.b", &configs), configs);
    assert_eq!(schema.escape_value_at("/ueId", &configs), configs);
}
