//! Patch engine: applies client patches to stored subscriber documents.
//!
//! Clients address documents in their logical form, where map keys are raw
//! identifiers such as `internet.mnc01.mcc208`. The store holds the escaped
//! form. The engine translates in both directions, validates patches against
//! the current document before writing, and reports the old and new
//! snapshots so a change notification can be emitted.

use crate::config::RepositoryConfig;
use crate::error::{Missing, RepoError, RepoResult};
use crate::notify::{ChangeNotifier, DataChangeNotification, SubmittedChange};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use udr_model::filter::{apply_all, strip_fields};
use udr_model::{encode_pointer_token, CollectionSchema, DocumentSnapshot, FilterCriterion};
use udr_store::{DocumentStore, StoreFilter};
use udr_types::{escape_key, Snssai, SubscriberScope};

/// Fields the store adds to documents that clients never see.
const INTERNAL_FIELDS: &[&str] = &["_id"];

/// Snapshots around a successful structural patch, in logical form.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    pub old: DocumentSnapshot,
    pub new: DocumentSnapshot,
}

/// Whether a put created a document or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Replaced,
}

impl WriteOutcome {
    /// True if the document did not exist before.
    pub fn is_created(self) -> bool {
        self == Self::Created
    }
}

/// Applies merge and structural patches through a [`DocumentStore`].
pub struct PatchEngine {
    store: Arc<dyn DocumentStore>,
    config: Arc<RepositoryConfig>,
}

impl PatchEngine {
    /// Creates an engine over `store` with the default collection schemas.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, Arc::new(RepositoryConfig::default()))
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: Arc<RepositoryConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    // ── Key translation ──────────────────────────────────────────

    /// Converts a logical document to its stored form.
    pub fn escape_document_keys(&self, collection: &str, doc: &DocumentSnapshot) -> DocumentSnapshot {
        match self.config.schema_for(collection) {
            Some(schema) => schema.escape_document(doc),
            None => doc.clone(),
        }
    }

    /// Converts a stored document to its logical form.
    pub fn unescape_document_keys(
        &self,
        collection: &str,
        doc: &DocumentSnapshot,
    ) -> DocumentSnapshot {
        match self.config.schema_for(collection) {
            Some(schema) => schema.unescape_document(doc),
            None => doc.clone(),
        }
    }

    // ── Reads and whole-document writes ──────────────────────────

    /// Reads one document in logical form.
    pub async fn get_document(
        &self,
        collection: &str,
        filter: &StoreFilter,
    ) -> RepoResult<DocumentSnapshot> {
        let stored = self
            .store
            .get_one(collection, filter)
            .await?
            .ok_or(RepoError::NotFound(Missing::Data))?;
        Ok(self
            .unescape_document_keys(collection, &stored)
            .without_fields(INTERNAL_FIELDS))
    }

    /// Reads every matching document in logical form, narrowed by
    /// `criteria` in order.
    pub async fn query(
        &self,
        collection: &str,
        filter: &StoreFilter,
        criteria: &[FilterCriterion],
    ) -> RepoResult<Vec<DocumentSnapshot>> {
        let stored = self.store.get_many(collection, filter).await?;
        debug!("query {collection} [{filter}] matched {} documents", stored.len());
        let logical = stored
            .iter()
            .map(|doc| self.unescape_document_keys(collection, doc))
            .collect();
        Ok(strip_fields(apply_all(criteria, logical), INTERNAL_FIELDS))
    }

    /// Stores `doc`, replacing any matching document.
    pub async fn put_document(
        &self,
        collection: &str,
        filter: &StoreFilter,
        doc: &DocumentSnapshot,
    ) -> RepoResult<WriteOutcome> {
        let stored = self.escape_document_keys(collection, doc);
        let existed = self.store.put_one(collection, filter, stored).await?;
        Ok(if existed {
            WriteOutcome::Replaced
        } else {
            WriteOutcome::Created
        })
    }

    pub async fn delete_document(&self, collection: &str, filter: &StoreFilter) -> RepoResult<()> {
        self.store.delete_one(collection, filter).await?;
        Ok(())
    }

    // ── Merge patches ────────────────────────────────────────────

    /// Applies an RFC 7396 merge document.
    ///
    /// Keys under escaped maps are escaped and the collection's key fields
    /// are taken from `filter`, so a document created by the merge carries
    /// its identity and a merge can never change it.
    pub async fn apply_merge_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        merge_document: &Value,
    ) -> RepoResult<()> {
        info!("merge patch on {collection} [{filter}]");
        let Value::Object(_) = merge_document else {
            return Err(RepoError::MalformedPatch(
                "merge document must be a JSON object".into(),
            ));
        };
        let schema = self.config.schema_for(collection);
        let mut shaped = match schema {
            Some(schema) => schema.escape_value(merge_document),
            None => merge_document.clone(),
        };
        if let Value::Object(fields) = &mut shaped {
            for (field, value) in filter.equalities() {
                if schema.is_none_or(|s| s.is_key_field(field)) {
                    fields.insert(field.clone(), value.clone());
                }
            }
        }
        self.store.merge_patch(collection, filter, &shaped).await?;
        Ok(())
    }

    /// Applies a merge document and notifies `notifier` of the result.
    ///
    /// A document that did not exist before is reported with an empty old
    /// snapshot.
    pub async fn merge_and_notify(
        &self,
        scope: &SubscriberScope,
        resource_uri: &str,
        collection: &str,
        filter: &StoreFilter,
        merge_document: &Value,
        notifier: &dyn ChangeNotifier,
    ) -> RepoResult<PatchOutcome> {
        let old = match self.get_document(collection, filter).await {
            Ok(doc) => doc,
            Err(RepoError::NotFound(_)) => DocumentSnapshot::default(),
            Err(e) => return Err(e),
        };
        self.apply_merge_patch(collection, filter, merge_document).await?;
        let new = self.get_document(collection, filter).await?;
        let outcome = PatchOutcome { old, new };
        self.emit(
            scope,
            resource_uri,
            SubmittedChange::MergeDocument(merge_document.clone()),
            &outcome,
            notifier,
        )
        .await;
        Ok(outcome)
    }

    // ── Structural patches ───────────────────────────────────────

    /// Applies RFC 6902 operations to the matching document.
    ///
    /// The operations are validated against the current document first;
    /// on any failure nothing is written.
    pub async fn apply_structural_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        ops: &[Value],
    ) -> RepoResult<PatchOutcome> {
        self.structural(collection, filter, None, ops).await
    }

    /// Applies RFC 6902 operations to the value at the dotted `field`
    /// inside the matching document. Operation paths are relative to it.
    pub async fn apply_structural_patch_nested(
        &self,
        collection: &str,
        filter: &StoreFilter,
        field: &str,
        ops: &[Value],
    ) -> RepoResult<PatchOutcome> {
        self.structural(collection, filter, Some(field), ops).await
    }

    /// Applies RFC 6902 operations and, only if they were persisted,
    /// notifies `notifier`. A notifier failure is logged, not returned.
    pub async fn patch_and_notify(
        &self,
        scope: &SubscriberScope,
        resource_uri: &str,
        collection: &str,
        filter: &StoreFilter,
        ops: &[Value],
        notifier: &dyn ChangeNotifier,
    ) -> RepoResult<PatchOutcome> {
        let outcome = self.apply_structural_patch(collection, filter, ops).await?;
        self.emit(
            scope,
            resource_uri,
            SubmittedChange::Operations(ops.to_vec()),
            &outcome,
            notifier,
        )
        .await;
        Ok(outcome)
    }

    async fn structural(
        &self,
        collection: &str,
        filter: &StoreFilter,
        field: Option<&str>,
        ops: &[Value],
    ) -> RepoResult<PatchOutcome> {
        info!("structural patch on {collection} [{filter}] ({} ops)", ops.len());
        let old = self
            .store
            .get_one(collection, filter)
            .await?
            .ok_or(RepoError::NotFound(Missing::Data))?;

        parse_operations(ops)?;
        let prefix: Vec<&str> = field.map(|f| f.split('.').collect()).unwrap_or_default();
        let escaped_ops = match self.config.schema_for(collection) {
            Some(schema) => escape_operations(schema, &prefix, ops)?,
            None => ops.to_vec(),
        };

        let mut target = old.to_value();
        for segment in &prefix {
            target = target
                .get(*segment)
                .cloned()
                .ok_or(RepoError::NotFound(Missing::Data))?;
        }
        let patched = apply_ops_to_value(&target, &escaped_ops)?;
        if prefix.is_empty() && !patched.is_object() {
            return Err(RepoError::PatchNotApplicable(
                "patch replaced the document root".into(),
            ));
        }

        self.store
            .structural_patch(collection, filter, &escaped_ops, field)
            .await?;
        let new = self
            .store
            .get_one(collection, filter)
            .await?
            .ok_or(RepoError::NotFound(Missing::Data))?;
        debug!("patched {collection} [{filter}]");

        Ok(PatchOutcome {
            old: self.unescape_document_keys(collection, &old),
            new: self.unescape_document_keys(collection, &new),
        })
    }

    async fn emit(
        &self,
        scope: &SubscriberScope,
        resource_uri: &str,
        submitted: SubmittedChange,
        outcome: &PatchOutcome,
        notifier: &dyn ChangeNotifier,
    ) {
        let notification = DataChangeNotification {
            subscriber_id: scope.clone(),
            resource_uri: resource_uri.to_string(),
            submitted,
            old: outcome.old.clone(),
            new: outcome.new.clone(),
        };
        if let Err(e) = notifier.notify(notification).await {
            warn!("change notification for {resource_uri} failed: {e}");
        }
    }
}

// ── Pure patch application ───────────────────────────────────────

/// Applies RFC 6902 operations to a copy of `current`.
///
/// Fails with [`RepoError::MalformedPatch`] if `ops` is not an operation
/// list and with [`RepoError::PatchNotApplicable`] if any operation,
/// including `test`, fails. `current` is never modified.
pub fn apply_ops_to_value(current: &Value, ops: &[Value]) -> RepoResult<Value> {
    let patch = parse_operations(ops)?;
    let mut patched = current.clone();
    json_patch::patch(&mut patched, &patch)
        .map_err(|e| RepoError::PatchNotApplicable(e.to_string()))?;
    Ok(patched)
}

fn parse_operations(ops: &[Value]) -> RepoResult<json_patch::Patch> {
    serde_json::from_value(Value::Array(ops.to_vec()))
        .map_err(|e| RepoError::MalformedPatch(e.to_string()))
}

/// Rewrites `path`, `from` and `value` of every operation into stored form.
/// `prefix` holds the dotted segments of a nested patch target.
fn escape_operations(
    schema: &CollectionSchema,
    prefix: &[&str],
    ops: &[Value],
) -> RepoResult<Vec<Value>> {
    if schema.escaped_maps.is_empty() {
        return Ok(ops.to_vec());
    }
    let base: String = prefix.iter().fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(&encode_pointer_token(segment));
        acc
    });
    ops.iter()
        .map(|op| {
            let Value::Object(fields) = op else {
                return Err(RepoError::MalformedPatch(format!(
                    "patch operation is not an object: {op}"
                )));
            };
            let mut fields: Map<String, Value> = fields.clone();
            let full_path = fields
                .get("path")
                .and_then(Value::as_str)
                .map(|path| format!("{base}{path}"));
            for member in ["path", "from"] {
                if let Some(Value::String(pointer)) = fields.get_mut(member) {
                    if !pointer.is_empty() && !pointer.starts_with('/') {
                        return Err(RepoError::MalformedPatch(format!(
                            "{member} is not a JSON pointer: {pointer:?}"
                        )));
                    }
                    let full = format!("{base}{pointer}");
                    *pointer = strip_tokens(&schema.escape_pointer(&full), prefix.len());
                }
            }
            if let (Some(full), Some(value)) = (full_path, fields.get_mut("value")) {
                *value = schema.escape_value_at(&full, value);
            }
            Ok(Value::Object(fields))
        })
        .collect()
}

/// Drops the first `count` tokens of a JSON pointer.
fn strip_tokens(pointer: &str, count: usize) -> String {
    if count == 0 {
        return pointer.to_string();
    }
    let tokens: Vec<&str> = pointer.split('/').skip(1).collect();
    tokens.iter().skip(count).fold(String::new(), |mut acc, token| {
        acc.push('/');
        acc.push_str(token);
        acc
    })
}

// ── Filters ──────────────────────────────────────────────────────

/// Selects a subscriber's session management policy data, optionally
/// requiring an entry for `snssai` and, within it, for `dnn`.
pub fn sm_policy_filter(ue_id: &str, snssai: Option<&Snssai>, dnn: Option<&str>) -> StoreFilter {
    let mut filter = StoreFilter::ue(ue_id);
    if let Some(snssai) = snssai.filter(|s| !s.is_empty()) {
        let slice_key = format!("smPolicySnssaiData.{}", snssai.to_hex_key());
        filter = filter.nested_key_exists(&slice_key);
        if let Some(dnn) = dnn.filter(|d| !d.is_empty()) {
            filter = filter.nested_key_exists(format!(
                "{slice_key}.smPolicyDnnData.{}",
                escape_key(dnn)
            ));
        }
    }
    filter
}

/// Selects a subscriber's session management subscription data in one
/// serving PLMN, optionally requiring a configuration for `dnn`.
pub fn sm_data_filter(ue_id: &str, serving_plmn_id: &str, dnn: Option<&str>) -> StoreFilter {
    let filter = StoreFilter::ue(ue_id).eq("servingPlmnId", serving_plmn_id);
    match dnn.filter(|d| !d.is_empty()) {
        Some(dnn) => filter.nested_key_exists(format!("dnnConfigurations.{}", escape_key(dnn))),
        None => filter,
    }
}
