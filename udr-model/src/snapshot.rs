//! Immutable JSON documents as read from or written to the store.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document as it was before or after a write.
///
/// Snapshots are immutable: every transforming method consumes or borrows
/// `self` and returns a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSnapshot(Map<String, Value>);

impl DocumentSnapshot {
    /// Wraps an object map.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds a snapshot from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ModelError::NotAnObject(other.to_string())),
        }
    }

    /// Builds a snapshot from any serializable value that encodes as an object.
    pub fn from_serializable<T: Serialize>(value: &T) -> ModelResult<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Decodes the snapshot into a typed document.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> ModelResult<T> {
        Ok(T::deserialize(&Value::Object(self.0.clone()))?)
    }

    /// Borrows the underlying fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns a JSON value copy of the document.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consumes the snapshot into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Consumes the snapshot into its field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Returns a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true if the top-level field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a JSON pointer (e.g. "/amData/gpsis/0").
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return None;
        }
        let (head, rest) = split_first_token(pointer)?;
        let value = self.0.get(&head)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    /// Extract a string value using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Returns a copy with `field` set to `value`.
    #[must_use]
    pub fn with_field(&self, field: impl Into<String>, value: Value) -> Self {
        let mut fields = self.0.clone();
        fields.insert(field.into(), value);
        Self(fields)
    }

    /// Returns a copy without the named top-level fields.
    #[must_use]
    pub fn without_fields(&self, names: &[&str]) -> Self {
        let mut fields = self.0.clone();
        for name in names {
            fields.remove(*name);
        }
        Self(fields)
    }
}

impl From<DocumentSnapshot> for Value {
    fn from(snapshot: DocumentSnapshot) -> Self {
        snapshot.into_value()
    }
}

impl TryFrom<Value> for DocumentSnapshot {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Splits "/a~1b/c" into ("a/b", "/c").
fn split_first_token(pointer: &str) -> Option<(String, &str)> {
    let body = pointer.strip_prefix('/')?;
    let (token, rest) = match body.find('/') {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, ""),
    };
    Some((token.replace("~1", "/").replace("~0", "~"), rest))
}
