//! Collection schemas and key translation between logical and stored form.

use crate::DocumentSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use udr_types::{escape_key, unescape_key};

/// Describes how documents of one collection are keyed and which nested
/// maps are keyed by untrusted identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name, e.g. "subscriptionData.provisionedData.smData".
    pub collection: String,
    /// Top-level fields that identify a document (e.g. "ueId", "servingPlmnId").
    pub key_fields: Vec<String>,
    /// JSON-pointer patterns of maps whose keys are escaped identifiers.
    /// `*` matches any single key, e.g. "/smPolicySnssaiData/*/smPolicyDnnData".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub escaped_maps: Vec<String>,
}

impl CollectionSchema {
    /// Schema with key fields and no escaped maps.
    pub fn new(collection: impl Into<String>, key_fields: &[&str]) -> Self {
        Self {
            collection: collection.into(),
            key_fields: key_fields.iter().map(|f| f.to_string()).collect(),
            escaped_maps: Vec::new(),
        }
    }

    /// Adds an escaped-map pattern.
    #[must_use]
    pub fn with_escaped_map(mut self, pattern: &str) -> Self {
        self.escaped_maps.push(pattern.to_string());
        self
    }

    /// Returns true if `field` is part of the document key.
    pub fn is_key_field(&self, field: &str) -> bool {
        self.key_fields.iter().any(|f| f == field)
    }

    /// Escapes the keys of every escaped map in `doc`.
    pub fn escape_document(&self, doc: &DocumentSnapshot) -> DocumentSnapshot {
        self.rewrite_document(doc, escape_key)
    }

    /// Reverses [`CollectionSchema::escape_document`] for read paths.
    pub fn unescape_document(&self, doc: &DocumentSnapshot) -> DocumentSnapshot {
        self.rewrite_document(doc, unescape_key)
    }

    /// Escapes the keys of every escaped map in an arbitrary JSON value.
    /// Non-object values are returned unchanged.
    pub fn escape_value(&self, value: &Value) -> Value {
        let mut value = value.clone();
        for pattern in &self.escaped_maps {
            rewrite_keys(&mut value, &pattern_tokens(pattern), &escape_key);
        }
        value
    }

    /// Escapes the pointer token that addresses a key inside an escaped map.
    ///
    /// "/dnnConfigurations/internet.mnc01/sscModes" becomes
    /// "/dnnConfigurations/internet%2Emnc01/sscModes". Pointers that do not
    /// reach into an escaped map are returned unchanged.
    pub fn escape_pointer(&self, pointer: &str) -> String {
        if !pointer.starts_with('/') || self.escaped_maps.is_empty() {
            return pointer.to_string();
        }
        let mut tokens: Vec<String> = pointer[1..].split('/').map(decode_pointer_token).collect();
        for pattern in &self.escaped_maps {
            let pattern = pattern_tokens(pattern);
            if tokens.len() > pattern.len() && prefix_matches(&pattern, &tokens) {
                let idx = pattern.len();
                tokens[idx] = escape_key(&tokens[idx]);
            }
        }
        tokens.iter().fold(String::new(), |mut acc, token| {
            acc.push('/');
            acc.push_str(&encode_pointer_token(token));
            acc
        })
    }

    /// Escapes the escaped-map keys of `value` as if it were stored at
    /// `pointer`. Used for the `value` member of patch operations.
    ///
    /// Writing `{"internet.mnc01": {}}` at "/dnnConfigurations" escapes
    /// that key; writing it at "/ueId" leaves it as is.
    pub fn escape_value_at(&self, pointer: &str, value: &Value) -> Value {
        let mut value = value.clone();
        let tokens: Vec<String> = match pointer.strip_prefix('/') {
            Some(rest) => rest.split('/').map(decode_pointer_token).collect(),
            None if pointer.is_empty() => Vec::new(),
            None => return value,
        };
        for pattern in &self.escaped_maps {
            let pattern = pattern_tokens(pattern);
            if tokens.len() <= pattern.len() && prefix_matches(&pattern, &tokens) {
                rewrite_keys(&mut value, &pattern[tokens.len()..], &escape_key);
            }
        }
        value
    }

    fn rewrite_document(
        &self,
        doc: &DocumentSnapshot,
        rewrite: fn(&str) -> String,
    ) -> DocumentSnapshot {
        if self.escaped_maps.is_empty() {
            return doc.clone();
        }
        let mut value = doc.to_value();
        for pattern in &self.escaped_maps {
            rewrite_keys(&mut value, &pattern_tokens(pattern), &rewrite);
        }
        match value {
            Value::Object(fields) => DocumentSnapshot::new(fields),
            _ => doc.clone(),
        }
    }
}

fn pattern_tokens(pattern: &str) -> Vec<String> {
    pattern
        .trim_start_matches('/')
        .split('/')
        .filter(|t| !t.is_empty())
        .map(decode_pointer_token)
        .collect()
}

fn prefix_matches(pattern: &[String], tokens: &[String]) -> bool {
    pattern
        .iter()
        .zip(tokens)
        .all(|(p, t)| p == "*" || p == t)
}

fn rewrite_keys(value: &mut Value, pattern: &[String], rewrite: &dyn Fn(&str) -> String) {
    let Value::Object(fields) = value else {
        return;
    };
    match pattern.split_first() {
        None => {
            let renamed: Map<String, Value> = std::mem::take(fields)
                .into_iter()
                .map(|(k, v)| (rewrite(&k), v))
                .collect();
            *fields = renamed;
        }
        Some((head, rest)) if head == "*" => {
            for child in fields.values_mut() {
                rewrite_keys(child, rest, rewrite);
            }
        }
        Some((head, rest)) => {
            if let Some(child) = fields.get_mut(head) {
                rewrite_keys(child, rest, rewrite);
            }
        }
    }
}

/// Decodes one RFC 6901 reference token (`~1` to `/`, `~0` to `~`).
pub fn decode_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Encodes a raw key as one RFC 6901 reference token.
pub fn encode_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
