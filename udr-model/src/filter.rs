//! Narrowing bulk results with list-valued criteria.
//!
//! Within one criterion the accepted values are OR-ed; distinct criteria are
//! AND-ed by applying them one after another to the previous output. A
//! single malformed value never aborts a pass: it is skipped with a warning.

use crate::DocumentSnapshot;
use serde_json::Value;
use tracing::{debug, warn};
use udr_types::Snssai;

/// Anything with top-level named fields that can be filtered.
pub trait Filterable {
    fn field(&self, name: &str) -> Option<&Value>;
}

impl Filterable for DocumentSnapshot {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Filterable for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|fields| fields.get(name))
    }
}

/// Keeps items whose string field `field` equals any of `accepted`.
///
/// An empty `accepted` list means the criterion is not applied. Items
/// missing the field, or holding a non-string value, are excluded.
pub fn filter_by_values<T, S>(field: &str, accepted: &[S], items: Vec<T>) -> Vec<T>
where
    T: Filterable,
    S: AsRef<str>,
{
    if accepted.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            item.field(field)
                .and_then(Value::as_str)
                .is_some_and(|value| accepted.iter().any(|a| a.as_ref() == value))
        })
        .collect()
}

/// Keeps items whose `snssai` object equals any of the JSON-encoded
/// `accepted` slice identifiers, compared by `(sst, sd)`.
pub fn filter_by_snssai<T, S>(accepted: &[S], items: Vec<T>) -> Vec<T>
where
    T: Filterable,
    S: AsRef<str>,
{
    if accepted.is_empty() {
        return items;
    }
    let wanted = decode_criteria(accepted);
    items
        .into_iter()
        .filter(|item| match item.field("snssai").map(Snssai::from_value) {
            Some(Ok(slice)) => {
                debug!("item snssai={slice}");
                wanted.contains(&slice)
            }
            Some(Err(e)) => {
                warn!("skipping item with malformed snssai: {e}");
                false
            }
            None => false,
        })
        .collect()
}

/// Keeps items whose `snssais` array contains the single JSON-encoded
/// identifier `accepted`.
///
/// A malformed criterion matches nothing.
pub fn filter_by_snssai_list<T: Filterable>(accepted: &str, items: Vec<T>) -> Vec<T> {
    let wanted = match Snssai::from_json(accepted) {
        Ok(slice) => slice,
        Err(e) => {
            warn!("ignoring malformed snssai criterion: {e}");
            return Vec::new();
        }
    };
    debug!("filter snssai={wanted}");
    items
        .into_iter()
        .filter(|item| {
            let Some(list) = item.field("snssais") else {
                return false;
            };
            match serde_json::from_value::<Vec<Snssai>>(list.clone()) {
                Ok(slices) => slices.contains(&wanted),
                Err(e) => {
                    warn!("skipping item with malformed snssais: {e}");
                    false
                }
            }
        })
        .collect()
}

/// Removes internal identity fields before documents are handed back.
pub fn strip_fields(items: Vec<DocumentSnapshot>, names: &[&str]) -> Vec<DocumentSnapshot> {
    items
        .into_iter()
        .map(|doc| doc.without_fields(names))
        .collect()
}

fn decode_criteria<S: AsRef<str>>(accepted: &[S]) -> Vec<Snssai> {
    accepted
        .iter()
        .filter_map(|encoded| match Snssai::from_json(encoded.as_ref()) {
            Ok(slice) => Some(slice),
            Err(e) => {
                warn!("ignoring malformed snssai criterion: {e}");
                None
            }
        })
        .collect()
}

/// One named criterion of a multi-criteria query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    /// String equality on a top-level field.
    Values { field: String, accepted: Vec<String> },
    /// Structural equality on the `snssai` object.
    Snssai { accepted: Vec<String> },
    /// Membership of one identifier in the `snssais` array.
    SnssaiList { accepted: String },
}

impl FilterCriterion {
    pub fn values(field: impl Into<String>, accepted: Vec<String>) -> Self {
        Self::Values {
            field: field.into(),
            accepted,
        }
    }

    /// Applies this criterion.
    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        match self {
            Self::Values { field, accepted } => filter_by_values(field, accepted, items),
            Self::Snssai { accepted } => filter_by_snssai(accepted, items),
            Self::SnssaiList { accepted } => filter_by_snssai_list(accepted, items),
        }
    }
}

/// Applies every criterion in order (logical AND).
pub fn apply_all<T: Filterable>(criteria: &[FilterCriterion], items: Vec<T>) -> Vec<T> {
    criteria
        .iter()
        .fold(items, |remaining, criterion| criterion.apply(remaining))
}
