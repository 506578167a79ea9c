//! Subscription registry.
//!
//! Subscriptions live in memory, partitioned by subscriber scope and then by
//! kind. Each scope owns one [`ScopeContainer`] created on first use and
//! never replaced, so every task touching a scope sees the same container.
//! All check-then-act sequences on a container run under its single lock.

use crate::error::{Missing, RepoError, RepoResult};
use crate::ids::{CounterIdGenerator, IdGenerator};
use crate::patch::apply_ops_to_value;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use udr_model::{AmfSubscriptionInfo, EeSubscription, Subscription};
use udr_types::{SubscriberScope, SubscriptionId, SubscriptionKind};

type KindMap = HashMap<SubscriptionKind, HashMap<SubscriptionId, Subscription>>;

/// The subscriptions of one subscriber scope.
#[derive(Debug, Default)]
pub struct ScopeContainer {
    entries: Mutex<KindMap>,
}

impl ScopeContainer {
    /// Number of subscriptions of `kind` in this scope.
    pub fn len(&self, kind: SubscriptionKind) -> usize {
        self.entries.lock().get(&kind).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().values().all(HashMap::is_empty)
    }
}

/// Concurrent store of subscriptions keyed by scope, kind and id.
pub struct SubscriptionRegistry {
    scopes: DashMap<SubscriberScope, Arc<ScopeContainer>>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry with process-local id counters.
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(CounterIdGenerator::new()))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            scopes: DashMap::new(),
            ids,
        }
    }

    /// Returns the container of `scope`, creating it if absent.
    ///
    /// Concurrent callers for the same scope all receive the same container.
    pub fn ensure_scope(&self, scope: &SubscriberScope) -> Arc<ScopeContainer> {
        let entry = self.scopes.entry(scope.clone()).or_insert_with(|| {
            debug!("creating subscription container for {scope}");
            Arc::new(ScopeContainer::default())
        });
        Arc::clone(entry.value())
    }

    /// Returns the container of `scope` without creating it.
    pub fn scope(&self, scope: &SubscriberScope) -> RepoResult<Arc<ScopeContainer>> {
        self.scopes
            .get(scope)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(RepoError::NotFound(Missing::User))
    }

    /// Number of scopes established so far.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    // ── Subscriptions ────────────────────────────────────────────

    /// Stores `payload` under a fresh id and returns that id.
    ///
    /// The kind is the payload's variant; the payload's own id field is
    /// overwritten with the allocated id.
    pub fn add(&self, scope: &SubscriberScope, payload: Subscription) -> SubscriptionId {
        let kind = payload.kind();
        let id = self.ids.next_id(kind);
        let payload = payload.with_subscription_id(&id);
        let container = self.ensure_scope(scope);
        container
            .entries
            .lock()
            .entry(kind)
            .or_default()
            .insert(id.clone(), payload);
        info!("created {kind} subscription {id} for {scope}");
        id
    }

    pub fn get(
        &self,
        scope: &SubscriberScope,
        kind: SubscriptionKind,
        id: &SubscriptionId,
    ) -> RepoResult<Subscription> {
        let container = self.scope(scope)?;
        let entries = container.entries.lock();
        entries
            .get(&kind)
            .and_then(|subs| subs.get(id))
            .cloned()
            .ok_or(RepoError::NotFound(Missing::Subscription))
    }

    /// Replaces an existing subscription wholesale. Never creates one.
    pub fn replace(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
        payload: Subscription,
    ) -> RepoResult<()> {
        let kind = payload.kind();
        let container = self.scope(scope)?;
        let mut entries = container.entries.lock();
        let slot = entries
            .get_mut(&kind)
            .and_then(|subs| subs.get_mut(id))
            .ok_or(RepoError::NotFound(Missing::Subscription))?;
        *slot = payload.with_subscription_id(id);
        info!("replaced {kind} subscription {id} for {scope}");
        Ok(())
    }

    /// Removes and returns a subscription.
    pub fn remove(
        &self,
        scope: &SubscriberScope,
        kind: SubscriptionKind,
        id: &SubscriptionId,
    ) -> RepoResult<Subscription> {
        let container = self.scope(scope)?;
        let removed = container
            .entries
            .lock()
            .get_mut(&kind)
            .and_then(|subs| subs.remove(id))
            .ok_or(RepoError::NotFound(Missing::Subscription))?;
        info!("removed {kind} subscription {id} for {scope}");
        Ok(removed)
    }

    /// All subscriptions of `kind` in `scope`, in no particular order.
    ///
    /// Fails if the scope was never established; an established scope with
    /// no subscriptions of `kind` yields an empty list.
    pub fn list(
        &self,
        scope: &SubscriberScope,
        kind: SubscriptionKind,
    ) -> RepoResult<Vec<Subscription>> {
        let container = self.scope(scope)?;
        let entries = container.entries.lock();
        Ok(entries
            .get(&kind)
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default())
    }

    // ── AMF subscription infos ───────────────────────────────────

    /// Sets the AMF subscription infos of an event-exposure subscription.
    pub fn set_amf_subscription_infos(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
        infos: Vec<AmfSubscriptionInfo>,
    ) -> RepoResult<()> {
        self.with_event_exposure(scope, id, |ee| {
            ee.amf_subscription_infos = Some(infos);
            Ok(())
        })
    }

    pub fn amf_subscription_infos(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
    ) -> RepoResult<Vec<AmfSubscriptionInfo>> {
        self.with_event_exposure(scope, id, |ee| {
            ee.amf_subscription_infos
                .clone()
                .ok_or(RepoError::NotFound(Missing::AmfSubscription))
        })
    }

    /// Resets the AMF subscription infos to absent.
    pub fn clear_amf_subscription_infos(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
    ) -> RepoResult<()> {
        self.with_event_exposure(scope, id, |ee| {
            ee.amf_subscription_infos
                .take()
                .map(|_| ())
                .ok_or(RepoError::NotFound(Missing::AmfSubscription))
        })
    }

    /// Applies RFC 6902 operations to the AMF subscription info list and
    /// returns the result. On failure the stored list is unchanged.
    pub fn patch_amf_subscription_infos(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
        ops: &[Value],
    ) -> RepoResult<Vec<AmfSubscriptionInfo>> {
        self.with_event_exposure(scope, id, |ee| {
            let current = ee
                .amf_subscription_infos
                .as_ref()
                .ok_or(RepoError::NotFound(Missing::AmfSubscription))?;
            let patched = apply_ops_to_value(&serde_json::to_value(current)?, ops)?;
            let infos: Vec<AmfSubscriptionInfo> = serde_json::from_value(patched)
                .map_err(|e| RepoError::PatchNotApplicable(e.to_string()))?;
            ee.amf_subscription_infos = Some(infos.clone());
            Ok(infos)
        })
    }

    fn with_event_exposure<T>(
        &self,
        scope: &SubscriberScope,
        id: &SubscriptionId,
        f: impl FnOnce(&mut EeSubscription) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let container = self.scope(scope)?;
        let mut entries = container.entries.lock();
        let ee = entries
            .get_mut(&SubscriptionKind::EventExposure)
            .and_then(|subs| subs.get_mut(id))
            .and_then(Subscription::as_event_exposure_mut)
            .ok_or(RepoError::NotFound(Missing::Subscription))?;
        f(ee)
    }

    // ── Change targets ───────────────────────────────────────────

    /// Data-change subscriptions interested in a change to `resource_uri`
    /// of subscriber `ue_id`.
    ///
    /// A subscription matches when its `ueId` is absent or equal to
    /// `ue_id` and one of its monitored URIs is a prefix of `resource_uri`.
    pub fn data_change_targets(&self, ue_id: &str, resource_uri: &str) -> Vec<Subscription> {
        self.global_targets(SubscriptionKind::DataChange, resource_uri, |sub| match sub {
            Subscription::DataChange(s) => s.ue_id.as_deref().is_none_or(|u| u == ue_id),
            _ => false,
        })
    }

    /// Policy-data subscriptions monitoring a prefix of `resource_uri`.
    pub fn policy_data_targets(&self, resource_uri: &str) -> Vec<Subscription> {
        self.global_targets(SubscriptionKind::PolicyData, resource_uri, |_| true)
    }

    fn global_targets(
        &self,
        kind: SubscriptionKind,
        resource_uri: &str,
        accept: impl Fn(&Subscription) -> bool,
    ) -> Vec<Subscription> {
        let Ok(container) = self.scope(&SubscriberScope::Global) else {
            return Vec::new();
        };
        let entries = container.entries.lock();
        entries
            .get(&kind)
            .map(|subs| {
                subs.values()
                    .filter(|sub| accept(sub))
                    .filter(|sub| {
                        sub.monitored_resource_uris()
                            .iter()
                            .any(|uri| resource_uri.starts_with(uri.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
