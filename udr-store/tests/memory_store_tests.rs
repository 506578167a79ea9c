use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use udr_model::DocumentSnapshot;
use udr_store::{DocumentStore, MemoryDocumentStore, StoreError, StoreFilter};

const AM_DATA: &str = "subscriptionData.provisionedData.amData";

fn doc(value: Value) -> DocumentSnapshot {
    DocumentSnapshot::from_value(value).unwrap()
}

fn seeded() -> MemoryDocumentStore {
    let store = MemoryDocumentStore::new();
    store.insert(AM_DATA, doc(json!({"ueId": "imsi-1", "servingPlmnId": "20893", "gpsis": ["a"]})));
    store.insert(AM_DATA, doc(json!({"ueId": "imsi-2", "servingPlmnId": "20893", "gpsis": []})));
    store
}

// ── Filters ──────────────────────────────────────────────────────

#[test]
fn empty_filter_matches_everything() {
    let filter = StoreFilter::new();
    assert!(filter.is_empty());
    assert!(filter.matches(&doc(json!({"x": 1}))));
}

#[test]
fn nested_key_exists() {
    let filter = StoreFilter::ue("imsi-1").nested_key_exists("smPolicySnssaiData.01010203");
    let hit = doc(json!({"ueId": "imsi-1", "smPolicySnssaiData": {"01010203": {}}}));
    let miss = doc(json!({"ueId": "imsi-1", "smPolicySnssaiData": {"02": {}}}));
    assert!(filter.matches(&hit));
    assert!(!filter.matches(&miss));
}

#[test]
fn identity_fields_and_display() {
    let filter = StoreFilter::ue("imsi-1").eq("servingPlmnId", "20893");
    assert_eq!(
        Value::Object(filter.identity_fields()),
        json!({"ueId": "imsi-1", "servingPlmnId": "20893"})
    );
    assert_eq!(filter.to_string(), r#"ueId="imsi-1", servingPlmnId="20893""#);
    assert_eq!(StoreFilter::new().to_string(), "*");
}

// ── Reads and writes ─────────────────────────────────────────────

#[tokio::test]
async fn get_one_and_many() {
    let store = seeded();
    let one = store.get_one(AM_DATA, &StoreFilter::ue("imsi-2")).await.unwrap().unwrap();
    assert_eq!(one.get_str("/ueId"), Some("imsi-2"));

    let many = store
        .get_many(AM_DATA, &StoreFilter::new().eq("servingPlmnId", "20893"))
        .await
        .unwrap();
    assert_eq!(many.len(), 2);

    assert!(store.get_one(AM_DATA, &StoreFilter::ue("imsi-9")).await.unwrap().is_none());
    assert!(store.get_many("unknown", &StoreFilter::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn put_one_reports_prior_existence() {
    let store = seeded();
    let filter = StoreFilter::ue("imsi-3");
    let existed = store.put_one(AM_DATA, &filter, doc(json!({"ueId": "imsi-3"}))).await.unwrap();
    assert!(!existed);
    let existed = store
        .put_one(AM_DATA, &filter, doc(json!({"ueId": "imsi-3", "v": 2})))
        .await
        .unwrap();
    assert!(existed);
    assert_eq!(store.len(AM_DATA), 3);
}

#[tokio::test]
async fn delete_one_is_idempotent() {
    let store = seeded();
    let filter = StoreFilter::ue("imsi-1");
    store.delete_one(AM_DATA, &filter).await.unwrap();
    store.delete_one(AM_DATA, &filter).await.unwrap();
    assert_eq!(store.len(AM_DATA), 1);
}

// ── Merge patches ────────────────────────────────────────────────

#[tokio::test]
async fn merge_null_deletes_nested_member() {
    let store = MemoryDocumentStore::new();
    store.insert("c", doc(json!({"ueId": "u", "a": {"b": 1, "c": 2}})));
    store
        .merge_patch("c", &StoreFilter::ue("u"), &json!({"a": {"b": null}}))
        .await
        .unwrap();
    let after = store.get_one("c", &StoreFilter::ue("u")).await.unwrap().unwrap();
    assert_eq!(after.to_value(), json!({"ueId": "u", "a": {"c": 2}}));
}

#[tokio::test]
async fn merge_upserts_with_identity() {
    let store = MemoryDocumentStore::new();
    store
        .merge_patch("c", &StoreFilter::ue("u"), &json!({"x": 1}))
        .await
        .unwrap();
    let created = store.get_one("c", &StoreFilter::ue("u")).await.unwrap().unwrap();
    assert_eq!(created.to_value(), json!({"ueId": "u", "x": 1}));
}

#[tokio::test]
async fn merge_rejects_non_object_result() {
    let store = seeded();
    let err = store
        .merge_patch(AM_DATA, &StoreFilter::ue("imsi-1"), &json!([1]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PatchFailed(_)));
}

// ── Structural patches ───────────────────────────────────────────

#[tokio::test]
async fn structural_patch_applies_all_ops() {
    let store = seeded();
    let filter = StoreFilter::ue("imsi-1");
    let ops = vec![
        json!({"op": "add", "path": "/gpsis/-", "value": "b"}),
        json!({"op": "replace", "path": "/servingPlmnId", "value": "20801"}),
    ];
    store.structural_patch(AM_DATA, &filter, &ops, None).await.unwrap();
    let after = store.get_one(AM_DATA, &filter).await.unwrap().unwrap();
    assert_eq!(after.get("gpsis"), Some(&json!(["a", "b"])));
    assert_eq!(after.get_str("/servingPlmnId"), Some("20801"));
}

#[tokio::test]
async fn failing_op_leaves_document_untouched() {
    let store = seeded();
    let filter = StoreFilter::ue("imsi-1");
    let before = store.get_one(AM_DATA, &filter).await.unwrap().unwrap();
    let ops = vec![
        json!({"op": "add", "path": "/extra", "value": 1}),
        json!({"op": "test", "path": "/servingPlmnId", "value": "00000"}),
    ];
    let err = store.structural_patch(AM_DATA, &filter, &ops, None).await.unwrap_err();
    assert!(matches!(err, StoreError::PatchFailed(_)));
    let after = store.get_one(AM_DATA, &filter).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn structural_patch_on_nested_field() {
    let store = MemoryDocumentStore::new();
    store.insert("c", doc(json!({"ueId": "u", "ee": {"amfSubscriptionInfos": [{"amfInstanceId": "a"}]}})));
    let ops = vec![json!({"op": "replace", "path": "/0/amfInstanceId", "value": "b"})];
    store
        .structural_patch("c", &StoreFilter::ue("u"), &ops, Some("ee.amfSubscriptionInfos"))
        .await
        .unwrap();
    let after = store.get_one("c", &StoreFilter::ue("u")).await.unwrap().unwrap();
    assert_eq!(after.get_str("/ee/amfSubscriptionInfos/0/amfInstanceId"), Some("b"));

    let err = store
        .structural_patch("c", &StoreFilter::ue("u"), &ops, Some("ee.missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn structural_patch_without_match_is_not_found() {
    let store = seeded();
    let ops = vec![json!({"op": "remove", "path": "/gpsis"})];
    let err = store
        .structural_patch(AM_DATA, &StoreFilter::ue("nobody"), &ops, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn malformed_ops_are_serialization_errors() {
    let store = seeded();
    let ops = vec![json!({"op": "frobnicate", "path": "/x"})];
    let err = store
        .structural_patch(AM_DATA, &StoreFilter::ue("imsi-1"), &ops, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

// ── Availability ─────────────────────────────────────────────────

#[tokio::test]
async fn unavailable_store_fails_every_call() {
    let store = seeded();
    store.set_unavailable(true);
    let err = store.get_one(AM_DATA, &StoreFilter::ue("imsi-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    store.set_unavailable(false);
    assert!(store.get_one(AM_DATA, &StoreFilter::ue("imsi-1")).await.unwrap().is_some());
}
