use pretty_assertions::assert_eq;
use serde_json::json;
use udr_types::Snssai;

#[test]
fn from_json_with_differentiator() {
    let s = Snssai::from_json(r#"{"sst":1,"sd":"010203"}"#).unwrap();
    assert_eq!(s, Snssai::new(1, "010203"));
}

#[test]
fn from_json_without_differentiator() {
    let s = Snssai::from_json(r#"{"sst":2}"#).unwrap();
    assert_eq!(s, Snssai::with_sst(2));
    assert!(s.sd.is_empty());
}

#[test]
fn equality_ignores_field_order_and_whitespace() {
    let a = Snssai::from_json(r#"{"sd":"112233","sst":1}"#).unwrap();
    let b = Snssai::from_json(r#"{ "sst": 1, "sd": "112233" }"#).unwrap();
    assert_eq!(a, b);
}

#[test]
fn from_json_rejects_malformed() {
    assert!(Snssai::from_json("not json").is_err());
    assert!(Snssai::from_json(r#"{"sst":"one"}"#).is_err());
    assert!(Snssai::from_json(r#"{"sst":300}"#).is_err());
}

#[test]
fn from_value_reads_document_field() {
    let v = json!({"sst": 1, "sd": "abcdef"});
    assert_eq!(Snssai::from_value(&v).unwrap(), Snssai::new(1, "abcdef"));
    assert!(Snssai::from_value(&json!("01abcdef")).is_err());
}

#[test]
fn serialization_omits_empty_differentiator() {
    let json = serde_json::to_string(&Snssai::with_sst(1)).unwrap();
    assert_eq!(json, r#"{"sst":1}"#);
}

#[test]
fn hex_key_layout() {
    assert_eq!(Snssai::new(1, "010203").to_hex_key(), "01010203");
    assert_eq!(Snssai::with_sst(255).to_hex_key(), "ff");
}

#[test]
fn hex_key_parses_back() {
    let s = Snssai::new(1, "112233");
    assert_eq!(Snssai::from_hex_key(&s.to_hex_key()).unwrap(), s);
    assert_eq!(Snssai::from_hex_key("02").unwrap(), Snssai::with_sst(2));
}

#[test]
fn hex_key_rejects_garbage() {
    assert!(Snssai::from_hex_key("").is_err());
    assert!(Snssai::from_hex_key("z1").is_err());
    assert!(Snssai::from_hex_key("01xyz").is_err());
}

#[test]
fn display() {
    assert_eq!(Snssai::new(1, "010203").to_string(), "1-010203");
    assert_eq!(Snssai::with_sst(3).to_string(), "3");
}
