//! Document selection for store calls.

use serde_json::{Map, Value};
use std::fmt;
use udr_model::DocumentSnapshot;

/// Selects documents within a collection.
///
/// A document matches when every top-level equality holds and every nested
/// key path exists. Nested paths are dotted (`smPolicySnssaiData.01010203`)
/// and address keys in their stored, escaped form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreFilter {
    equalities: Vec<(String, Value)>,
    nested_exists: Vec<String>,
}

impl StoreFilter {
    /// An empty filter matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single `ueId` equality, the most common repository key.
    pub fn ue(ue_id: &str) -> Self {
        Self::new().eq("ueId", ue_id)
    }

    /// Adds a `field == value` condition.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equalities.push((field.into(), value.into()));
        self
    }

    /// Adds a condition that the dotted `path` resolves to a value.
    #[must_use]
    pub fn nested_key_exists(mut self, path: impl Into<String>) -> Self {
        self.nested_exists.push(path.into());
        self
    }

    pub fn equalities(&self) -> &[(String, Value)] {
        &self.equalities
    }

    pub fn nested_paths(&self) -> &[String] {
        &self.nested_exists
    }

    pub fn is_empty(&self) -> bool {
        self.equalities.is_empty() && self.nested_exists.is_empty()
    }

    /// The equality conditions as document fields.
    ///
    /// Used to seed a document created by an upserting write.
    pub fn identity_fields(&self) -> Map<String, Value> {
        self.equalities.iter().cloned().collect()
    }

    /// Returns true if `doc` satisfies every condition.
    pub fn matches(&self, doc: &DocumentSnapshot) -> bool {
        self.equalities
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
            && self
                .nested_exists
                .iter()
                .all(|path| resolve_dotted(doc.fields(), path).is_some())
    }
}

impl fmt::Display for StoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, value) in &self.equalities {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}={value}")?;
            first = false;
        }
        for path in &self.nested_exists {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "exists({path})")?;
            first = false;
        }
        if first {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Walks a dotted path through nested objects.
pub(crate) fn resolve_dotted<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
