//! The document store collaborator.

use crate::error::StoreResult;
use crate::filter::StoreFilter;
use async_trait::async_trait;
use serde_json::Value;
use udr_model::DocumentSnapshot;

/// A document database addressed by collection name and filter.
///
/// Every call is a suspension point. Implementations guarantee atomicity
/// per document only; nothing spans documents or collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the first document matching `filter`, if any.
    async fn get_one(
        &self,
        collection: &str,
        filter: &StoreFilter,
    ) -> StoreResult<Option<DocumentSnapshot>>;

    /// Returns every document matching `filter`.
    async fn get_many(
        &self,
        collection: &str,
        filter: &StoreFilter,
    ) -> StoreResult<Vec<DocumentSnapshot>>;

    /// Replaces the matching document or inserts `doc`.
    /// Returns true if a document existed before the write.
    async fn put_one(
        &self,
        collection: &str,
        filter: &StoreFilter,
        doc: DocumentSnapshot,
    ) -> StoreResult<bool>;

    /// Deletes the first matching document. Deleting nothing is not an error.
    async fn delete_one(&self, collection: &str, filter: &StoreFilter) -> StoreResult<()>;

    /// Applies an RFC 7396 merge document to the matching document,
    /// creating it from the filter's equalities when none matches.
    async fn merge_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        patch: &Value,
    ) -> StoreResult<()>;

    /// Applies RFC 6902 operations to the matching document, or to the
    /// value at the dotted `nested_field` inside it.
    ///
    /// Either every operation is applied or none is.
    async fn structural_patch(
        &self,
        collection: &str,
        filter: &StoreFilter,
        ops: &[Value],
        nested_field: Option<&str>,
    ) -> StoreResult<()>;
}
