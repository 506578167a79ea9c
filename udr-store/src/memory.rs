//! In-memory [`DocumentStore`] used by tests and local tooling.

use crate::error::{StoreError, StoreResult};
use crate::filter::StoreFilter;
use crate::store::DocumentStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use udr_model::DocumentSnapshot;

/// Collections of documents held behind one lock.
///
/// Each call takes the lock once, so single-document writes are atomic and
/// a failed patch leaves the stored document untouched.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<DocumentSnapshot>>>,
    unavailable: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document without matching, for seeding fixtures.
    pub fn insert(&self, collection: &str, doc: DocumentSnapshot) {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Makes every following call fail with [`StoreError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            warn!("memory store marked unavailable");
            return Err(StoreError::Backend("store unavailable".into()));
        }
        Ok(())
    }

    fn with_match<T>(
        &self,
        collection: &str,
        filter: &StoreFilter,
        f: impl FnOnce(&mut DocumentSnapshot) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collections = self.collections.lock();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
            .ok_or_else(|| StoreError::NotFound(format!("{collection} [{filter}]")))?;
        f(doc)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_one(
        &self,
        collection: &str,
        filter: &StoreFilter,
    ) -> StoreResult<Option<DocumentSnapshot>> {
        self.check_available()?;
        let collections = self.collections.lock();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn get_many(
        &self,
        collection: &str,
        filter: &StoreFilter,
    ) -> StoreResult<Vec<DocumentSnapshot>> {
        self.check_available()?;
        let collections = self.collections.lock();
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn put_one(
        &self,
        collection: &str,
        filter: &StoreFilter,
        doc: DocumentSnapshot,
    ) -> StoreResult<bool> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| filter.matches(d)) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => {
                docs.push(doc);
                Ok(false)
            }
        }
    }

    async fn delete_one(&self, collection: &str, filter: &StoreFilter) -> StoreResult<()> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        if let Some(docs) = collections.get_mut(collection)
            && let Some(pos) = docs.iter().position(|d| filter.matches(d))
        {
            docs.remove(pos);
        }
        Ok(())
    }

    async fn merge_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        patch: &Value,
    ) -> StoreResult<()> {
        self.check_available()?;
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        let (mut target, slot) = match docs.iter().position(|d| filter.matches(d)) {
            Some(pos) => (docs[pos].to_value(), Some(pos)),
            None => {
                debug!("merge patch creates document in {collection} [{filter}]");
                (Value::Object(filter.identity_fields()), None)
            }
        };
        json_patch::merge(&mut target, patch);
        let merged = match target {
            Value::Object(fields) => DocumentSnapshot::new(fields),
            other => {
                return Err(StoreError::PatchFailed(format!(
                    "merge produced a non-object document: {other}"
                )));
            }
        };
        match slot {
            Some(pos) => docs[pos] = merged,
            None => docs.push(merged),
        }
        Ok(())
    }

    async fn structural_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        ops: &[Value],
        nested_field: Option<&str>,
    ) -> StoreResult<()> {
        self.check_available()?;
        let patch: json_patch::Patch = serde_json::from_value(Value::Array(ops.to_vec()))?;
        self.with_match(collection, filter, |doc| {
            let mut fields = doc.fields().clone();
            match nested_field {
                None => {
                    let mut value = Value::Object(fields);
                    json_patch::patch(&mut value, &patch)
                        .map_err(|e| StoreError::PatchFailed(e.to_string()))?;
                    fields = match value {
                        Value::Object(fields) => fields,
                        _ => {
                            return Err(StoreError::PatchFailed(
                                "patch replaced the document root".into(),
                            ));
                        }
                    };
                }
                Some(path) => {
                    let target = resolve_dotted_mut(&mut fields, path).ok_or_else(|| {
                        StoreError::NotFound(format!("{collection} [{filter}] field {path}"))
                    })?;
                    let mut value = target.clone();
                    json_patch::patch(&mut value, &patch)
                        .map_err(|e| StoreError::PatchFailed(e.to_string()))?;
                    *target = value;
                }
            }
            *doc = DocumentSnapshot::new(fields);
            Ok(())
        })
    }
}

fn resolve_dotted_mut<'a>(fields: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let mut current = fields.get_mut(segments.next()?)?;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}
